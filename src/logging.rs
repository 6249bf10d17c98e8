use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("logger already installed: {0}")]
    Install(#[from] log::SetLoggerError),
}

const LOG_FILE_NAME: &str = "exam-timer.log";

/// Log file under the user state directory (`~/.local/state/exam-timer` on
/// Linux), or the local data directory where there is no state directory.
pub fn default_log_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "exam-timer")?;
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Some(dir.join(LOG_FILE_NAME))
}

/// Unknown level names fall back to `Info`
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Routes `log` records to `path`. The terminal belongs to the TUI, so
/// nothing is written to stdout/stderr.
pub fn init_file_logger(path: &Path, level: LevelFilter) -> Result<(), LoggingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, config, file)?;
    log::info!(
        "logging for exam-timer {} initialized",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
