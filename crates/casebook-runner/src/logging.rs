//! Log destinations for the runner.
//!
//! Console output always goes to stderr. With logging enabled, every line is
//! also appended to `<log_dir>/<YYYY-MM-DD>log.log`. The same writer backs the
//! global subscriber and the aggregator's echo, so case output shows up live
//! while it is being captured for the report.

use crate::config::RunnerConfig;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Dated log file name, e.g. `2024-05-01log.log`
pub fn log_file_name() -> String {
    format!("{}log.log", Local::now().format("%Y-%m-%d"))
}

/// Open (append) today's log file under `log_dir`, creating the directory
pub fn open_log_file(log_dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let path = log_dir.join(log_file_name());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok((path, file))
}

/// Where runner log lines are written
#[derive(Debug, Clone, Default)]
pub struct LogTargets {
    file: Option<(PathBuf, Arc<File>)>,
}

impl LogTargets {
    /// Console only
    pub fn console() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        if !config.enable_logging {
            return Ok(Self::console());
        }
        let (path, file) = open_log_file(&config.log_dir)?;
        Ok(Self {
            file: Some((path, Arc::new(file))),
        })
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// A fresh writer targeting stderr plus the log file when enabled
    pub fn make_writer(&self) -> BoxMakeWriter {
        match &self.file {
            Some((_, file)) => BoxMakeWriter::new(std::io::stderr.and(Arc::clone(file))),
            None => BoxMakeWriter::new(std::io::stderr),
        }
    }

    /// Install the global subscriber; `RUST_LOG` overrides the default `info` filter
    pub fn init_global(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(self.make_writer())
                    .with_ansi(false)
                    .with_target(false),
            )
            .try_init()
            .context("Failed to set global default tracing subscriber")?;

        if let Some(path) = self.log_file() {
            info!(path = %path.display(), "Logging to file");
        }
        Ok(())
    }
}
