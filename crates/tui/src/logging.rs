use crate::config::LoggingConfig;
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "KEYGATE_LOG";

pub fn default_log_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "keygate", "keygate") {
        proj_dirs.data_dir().join("keygate.log")
    } else {
        PathBuf::from("keygate.log")
    }
}

/// Logs go to a file; the terminal belongs to the dialog.
pub fn init(config: &LoggingConfig) -> std::io::Result<PathBuf> {
    let path = config.file.clone().unwrap_or_else(default_log_path);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    Ok(path)
}
