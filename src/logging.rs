//! Per-component log file setup
//!
//! Each binary appends timestamped, leveled lines to `<log_dir>/<component>.log`:
//!
//! ```text
//! 2025-01-31 09:14:02,118 - INFO - Creating vendor summary table.......
//! ```

use crate::config::PipelineConfig;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger already initialized: {0}")]
    Init(#[from] log::SetLoggerError),
}

/// Level names as existing log readers expect them
fn level_name(level: log::Level) -> &'static str {
    match level {
        log::Level::Warn => "WARNING",
        other => other.as_str(),
    }
}

/// Format one record the way the component log files are read by analysts
fn format_line(level: log::Level, message: &std::fmt::Arguments<'_>) -> String {
    format!(
        "{} - {} - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
        level_name(level),
        message
    )
}

/// Install the global logger for `component`, appending to its log file
///
/// Returns the path of the opened log file.
pub fn init(config: &PipelineConfig, component: &str) -> Result<PathBuf, LoggingError> {
    let path = config.log_file(component);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| LoggingError::Io {
                path: path.clone(),
                source,
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;

    env_logger::Builder::new()
        .parse_filters(&config.rust_log)
        .format(|buf, record| writeln!(buf, "{}", format_line(record.level(), record.args())))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let line = format_line(log::Level::Warn, &format_args!("Error reading {}", "sales.csv"));

        // "YYYY-MM-DD HH:MM:SS,mmm" is 23 characters
        let (timestamp, rest) = line.split_at(23);
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S,%3f").is_ok());
        assert_eq!(rest, " - WARNING - Error reading sales.csv");
    }

    #[test]
    fn test_level_names() {
        assert_eq!(level_name(log::Level::Info), "INFO");
        assert_eq!(level_name(log::Level::Warn), "WARNING");
        assert_eq!(level_name(log::Level::Error), "ERROR");
    }
}
