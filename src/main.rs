// src/main.rs

use anyhow::{Context, Result};
use orion_eye::controller::{FrameController, StartOutcome};
use orion_eye::pipeline::FrameReport;
use orion_eye::recorder::{create_run_dir, DecisionLog, WriteFailures};
use orion_eye::types::{Config, Frame};
use orion_eye::video_processor::{AnnotatedWriter, CameraOpener};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("ORION_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orion_eye={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Orion Eye starting");
    info!("✓ Configuration loaded from {}", config_path);

    let run_dir = create_run_dir(&config.video.output_dir)?;
    info!("Run directory: {}", run_dir.display());

    let mut writer = config
        .video
        .save_annotated
        .then(|| AnnotatedWriter::new(&run_dir, config.video.fps));
    let mut log = if config.video.save_decisions {
        Some(DecisionLog::create(&run_dir)?)
    } else {
        None
    };

    let controller = Arc::new(FrameController::new(CameraOpener::new(config.camera.clone())));
    match controller.start() {
        Ok(StartOutcome::Started) => info!("✓ Camera {} active", config.camera.device_index),
        Ok(StartOutcome::AlreadyActive) => {}
        Err(e) => {
            error!("Cannot start tracking: {}", e);
            return Err(e).context("Camera session failed to start");
        }
    }

    // Ctrl-C ends the session; the frame loop sees it on its next read
    let stopper = {
        let controller = controller.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping camera");
                controller.stop();
            }
        })
    };

    let worker = {
        let controller = controller.clone();
        tokio::task::spawn_blocking(move || {
            let mut video_failures = WriteFailures::new("Annotated video");
            let mut log_failures = WriteFailures::new("Decision log");
            let mut sink = |frame: &Frame, report: &FrameReport| {
                if let Some(w) = writer.as_mut() {
                    if let Err(e) = w.write(frame, report) {
                        video_failures.record(&e);
                    }
                }
                if let Some(l) = log.as_mut() {
                    if let Err(e) = l.record(report) {
                        log_failures.record(&e);
                    }
                }
            };
            let result = controller.run(&mut sink);
            video_failures.report();
            log_failures.report();
            (result, log)
        })
    };

    let (result, log) = worker.await.context("Frame loop panicked")?;
    stopper.abort();
    let summary = result?;

    if let Some(log) = log {
        log.finish(&summary.metrics)?;
    }

    info!("\n✓ Session complete");
    info!("  End: {:?}", summary.end);
    info!("  Total frames: {}", summary.frames_processed);
    info!(
        "  Frames with target: {} ({:.1}%)",
        summary.metrics.frames_with_target,
        100.0 * summary.metrics.frames_with_target as f64 / summary.frames_processed.max(1) as f64
    );
    info!("  ⚠️  Collision-course frames: {}", summary.metrics.collision_course_frames);
    info!("  Receding intersects: {}", summary.metrics.receding_intersect_frames);
    info!("  Average FPS: {:.1}", summary.metrics.fps);

    Ok(())
}
