//! Failure log for the facade boundary.
//!
//! Every failure the facade swallows is recorded here, either appended to a
//! log file as `[YYYY-MM-DD HH:MM:SS] <message>` or emitted on the `tracing`
//! error channel.
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrorLog {
    /// Append timestamped lines to this file
    File(PathBuf),
    /// Emit `tracing` error events
    #[default]
    Stderr,
}

impl ErrorLog {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(ErrorLog::File).unwrap_or_default()
    }

    /// Records one failure. Never fails; if the log file cannot be written
    /// the message goes to the `tracing` channel instead.
    pub fn record(&self, message: &str) {
        match self {
            ErrorLog::File(path) => {
                if let Err(e) = append_line(path, message) {
                    error!("Failed to write error log {}: {}", path.display(), e);
                    error!("{}", message);
                }
            }
            ErrorLog::Stderr => error!("{}", message),
        }
    }
}

fn append_line(path: &Path, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", format_line(message))
}

fn format_line(message: &str) -> String {
    format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message)
}
