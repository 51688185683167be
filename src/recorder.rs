// src/recorder.rs
//
// Session output on disk: one timestamped run directory per session, with
// a JSONL line per processed frame.

use crate::pipeline::{FrameReport, MetricsSummary};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `<base>/<YYYYmmdd_HHMMSS>`, created if missing.
pub fn create_run_dir(base: impl AsRef<Path>) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let dir = base.as_ref().join(stamp);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create run directory {}", dir.display()))?;
    Ok(dir)
}

pub struct DecisionLog {
    path: PathBuf,
    file: BufWriter<File>,
    lines: u64,
}

impl DecisionLog {
    pub fn create(run_dir: &Path) -> Result<Self> {
        let path = run_dir.join("decisions.jsonl");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        info!("Decision log: {}", path.display());
        Ok(Self {
            path,
            file: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn record(&mut self, report: &FrameReport) -> Result<()> {
        let json_value = serde_json::json!({
            "frame_id": report.frame_id,
            "timestamp_ms": report.timestamp_ms,
            "status": report.status(),
            "evasion": report.decision.evasion.map(|e| e.to_string()),
            "target": report.sample,
            "dynamics": report.dynamics,
            "prediction": report.prediction,
            "vector": report.vector_text(),
        });
        let json_line = serde_json::to_string(&json_value)?;
        writeln!(self.file, "{}", json_line)?;
        self.lines += 1;
        Ok(())
    }

    /// Final line carrying the session counters; flushes the file.
    pub fn finish(mut self, metrics: &MetricsSummary) -> Result<PathBuf> {
        let json_value = serde_json::json!({ "session_summary": metrics });
        writeln!(self.file, "{}", serde_json::to_string(&json_value)?)?;
        self.file.flush()?;
        info!("Wrote {} frame records to {}", self.lines, self.path.display());
        Ok(self.path)
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }
}

/// Failure tally for one output stream. Warns on the first failure only,
/// so a broken writer does not flood the log at frame rate.
#[derive(Debug)]
pub struct WriteFailures {
    output: &'static str,
    count: u64,
}

impl WriteFailures {
    pub fn new(output: &'static str) -> Self {
        Self { output, count: 0 }
    }

    pub fn record(&mut self, err: &anyhow::Error) {
        if self.count == 0 {
            warn!("{} write failed: {:#}", self.output, err);
        }
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// End-of-session line, if anything failed.
    pub fn report(&self) {
        if self.count > 0 {
            warn!("{}: {} writes failed", self.output, self.count);
        }
    }
}
