use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_ENV: &str = "CMVP_LOG";
const LOG_FILE_ENV: &str = "CMVP_LOG_FILE";
const DEFAULT_FILTER: &str = "info";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogTarget {
    Disabled,
    File { path: PathBuf, filter: String },
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("state directory not found (set CMVP_LOG_FILE)")]
    StateDirNotFound,

    #[error("invalid log filter {filter:?}: {message}")]
    Filter { filter: String, message: String },

    #[error("failed to open log file {path}: {source}")]
    OpenFile { path: String, source: io::Error },
}

/// The terminal belongs to the UI, so logs only ever go to a file.
pub fn resolve_log_target_with(
    env: impl Fn(&str) -> Option<String>,
) -> Result<LogTarget, LoggingError> {
    let filter = env(LOG_FILTER_ENV).filter(|value| !value.trim().is_empty());
    let file = env(LOG_FILE_ENV).filter(|value| !value.trim().is_empty());

    match (filter, file) {
        (None, None) => Ok(LogTarget::Disabled),
        (filter, Some(path)) => Ok(LogTarget::File {
            path: PathBuf::from(path),
            filter: filter.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        }),
        (Some(filter), None) => Ok(LogTarget::File {
            path: default_log_path()?,
            filter,
        }),
    }
}

pub fn init_logging() -> Result<LogTarget, LoggingError> {
    let target = resolve_log_target_with(|name| std::env::var(name).ok())?;
    let (path, filter) = match &target {
        LogTarget::Disabled => return Ok(LogTarget::Disabled),
        LogTarget::File { path, filter } => (path.clone(), filter.clone()),
    };

    let env_filter = parse_filter(&filter)?;
    let file = open_log_file(&path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(target)
}

fn parse_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|error| LoggingError::Filter {
        filter: filter.to_string(),
        message: error.to_string(),
    })
}

fn default_log_path() -> Result<PathBuf, LoggingError> {
    let base = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .ok_or(LoggingError::StateDirNotFound)?;
    Ok(base.join("cmvp").join("cmvp.log"))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open_error = |source: io::Error| LoggingError::OpenFile {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)
}
