use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;

pub fn log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lecturebank")
        .join("lecturebank.log")
}

/// Route tracing output to the log file; the terminal belongs to the UI.
/// `LECTUREBANK_LOG` overrides the level chosen by `verbose`.
pub fn init_tracing(verbose: bool) -> Result<PathBuf> {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("LECTUREBANK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(path)
}
