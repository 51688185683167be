// src/video_processor.rs
//
// OpenCV camera capture and annotated video output. Only built with the
// `camera` feature; the tracking pipeline itself never touches OpenCV.

use crate::controller::{DeviceOpener, FrameSource};
use crate::error::SessionError;
use crate::overlay::{draw_hud, HudState};
use crate::pipeline::FrameReport;
use crate::types::{CameraConfig, Frame};
use anyhow::Result;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTraitConst, VideoWriter},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub struct CameraOpener {
    config: CameraConfig,
}

impl CameraOpener {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }
}

impl DeviceOpener for CameraOpener {
    type Source = CameraSource;

    fn open(&self) -> Result<CameraSource, SessionError> {
        let index = self.config.device_index;
        info!("Opening camera {}", index);

        let unavailable = |e: opencv::Error| SessionError::DeviceUnavailable(e.to_string());
        let cap = VideoCapture::new(index, videoio::CAP_ANY).map_err(unavailable)?;
        if !cap.is_opened().map_err(unavailable)? {
            return Err(SessionError::DeviceUnavailable(format!(
                "camera {} could not be opened",
                index
            )));
        }

        let width = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0);
        let height = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0);
        info!("Camera properties: {}x{}, mirror={}", width, height, self.config.mirror);

        Ok(CameraSource {
            cap,
            mirror: self.config.mirror,
            started: Instant::now(),
        })
    }
}

pub struct CameraSource {
    cap: VideoCapture,
    mirror: bool,
    started: Instant,
}

impl CameraSource {
    fn grab(&mut self) -> opencv::Result<Option<Frame>> {
        use opencv::videoio::VideoCaptureTrait;

        let mut mat = Mat::default();
        if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
            return Ok(None);
        }
        let timestamp_ms = self.started.elapsed().as_secs_f64() * 1000.0;

        if self.mirror {
            let mut flipped = Mat::default();
            core::flip(&mat, &mut flipped, 1)?;
            mat = flipped;
        }

        let mut rgb_mat = Mat::default();
        imgproc::cvt_color(&mat, &mut rgb_mat, imgproc::COLOR_BGR2RGB, 0)?;

        let data = rgb_mat.data_bytes()?.to_vec();
        Ok(Some(Frame::new(
            data,
            rgb_mat.cols() as usize,
            rgb_mat.rows() as usize,
            timestamp_ms,
        )))
    }
}

impl FrameSource for CameraSource {
    fn read_frame(&mut self) -> Result<Frame, SessionError> {
        match self.grab() {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => Err(SessionError::FrameReadFailure("camera returned no frame".into())),
            Err(e) => Err(SessionError::FrameReadFailure(e.to_string())),
        }
    }
}

/// RGB frame → BGR Mat with the HUD painted on.
pub fn render_annotated(frame: &Frame, report: &FrameReport) -> Result<Mat> {
    let mat = Mat::from_slice(&frame.data)?;
    let mat = mat.reshape(3, frame.height as i32)?;

    let mut output = Mat::default();
    imgproc::cvt_color(&mat, &mut output, imgproc::COLOR_RGB2BGR, 0)?;

    draw_hud(&mut output, &HudState::from_report(report))?;
    Ok(output)
}

/// Annotated MP4 writer. Opened on the first frame, once the size is known.
pub struct AnnotatedWriter {
    path: PathBuf,
    fps: f64,
    writer: Option<VideoWriter>,
}

impl AnnotatedWriter {
    pub fn new(output_dir: &Path, fps: f64) -> Self {
        Self {
            path: output_dir.join("annotated.mp4"),
            fps,
            writer: None,
        }
    }

    pub fn write(&mut self, frame: &Frame, report: &FrameReport) -> Result<()> {
        let annotated = render_annotated(frame, report)?;

        if self.writer.is_none() {
            info!("Output video: {}", self.path.display());
            let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
            let writer = VideoWriter::new(
                &self.path.to_string_lossy(),
                fourcc,
                self.fps,
                core::Size::new(frame.width as i32, frame.height as i32),
                true,
            )?;
            self.writer = Some(writer);
        }

        if let Some(writer) = self.writer.as_mut() {
            writer.write(&annotated)?;
        }
        Ok(())
    }
}
