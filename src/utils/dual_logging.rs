use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::app_paths::{AppPaths, APP_DIR_NAME};
use crate::utils::logging::LogEntry;

/// Echo every entry to stderr when set
pub const DEBUG_ENV_VAR: &str = "CRUD_GRID_DEBUG";

static DUAL_LOGGER: OnceLock<Option<DualLogger>> = OnceLock::new();

/// Timestamped log file plus a `latest.log` pointer next to it
pub struct DualLogger {
    log_file: Mutex<File>,
    log_path: PathBuf,
    echo_stderr: bool,
}

impl DualLogger {
    pub fn create_in(log_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("{}_{}.log", APP_DIR_NAME, timestamp));
        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            let _ = std::fs::write(
                &latest_path,
                format!("Current log file: {}\n", log_path.display()),
            );
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            log_file: Mutex::new(log_file),
            log_path,
            echo_stderr: std::env::var(DEBUG_ENV_VAR).is_ok(),
        })
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        let line = entry.format_for_display();
        if let Ok(mut file) = self.log_file.lock() {
            let _ = writeln!(file, "{}", line);
            let _ = file.flush();
        }
        if self.echo_stderr {
            eprintln!("{}", line);
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

fn default_log_dir() -> PathBuf {
    AppPaths::log_dir().unwrap_or_else(|_| std::env::temp_dir().join(APP_DIR_NAME).join("logs"))
}

/// Initialize the global file logger. None when no log file could be opened.
pub fn init_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER
        .get_or_init(|| DualLogger::create_in(&default_log_dir()).ok())
        .as_ref()
}

pub fn get_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER.get().and_then(|l| l.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_writes_entries_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = DualLogger::create_in(dir.path()).unwrap();
        logger.write_entry(&LogEntry::new(Level::INFO, "grid", "hello".to_string()));
        logger.flush();

        let contents = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(contents.contains("INFO [grid] hello"));
        assert!(logger
            .log_path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("crud-grid_"));
    }
}
