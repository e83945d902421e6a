use anyhow::Result;
use chrono::{DateTime, Local};
use log::{LevelFilter, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

// The terminal is in raw mode while the UI runs, so log records go to a file.

pub struct FileLogger {
    log_file: Mutex<File>,
}

impl FileLogger {
    pub fn new(log_file_path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_file_path)?;
        Ok(FileLogger {
            log_file: Mutex::new(file),
        })
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now: DateTime<Local> = Local::now();
            let log_message = format!(
                "[{}] {} [{}:{}] {}\n",
                now.format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            );

            if let Ok(mut file) = self.log_file.lock() {
                let _ = file.write_all(log_message.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn setup_logging(log_file: &Path, level: LevelFilter) -> Result<()> {
    let logger = FileLogger::new(log_file)?;
    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(level))?;

    log::info!("Logging initialized at level: {}", level);
    log::info!("{} version {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Ok(())
}
