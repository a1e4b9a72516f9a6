//! Rolling Logger
//!
//! Size-rotated log files plus an in-memory ring of the most recent lines.
//!
//! `init_logger` installs a `tracing` subscriber that also captures records
//! emitted through the `log` facade, so library code can keep using
//! `log::info!` and friends.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Default size of a single log file before it is rotated (1 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Default number of log files kept on disk, including the active one
pub const DEFAULT_MAX_FILES: usize = 5;
/// Default number of lines kept in memory
pub const DEFAULT_RECENT_LINES: usize = 500;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("logger already initialized")]
    AlreadyInitialized,

    #[error("logger not initialized")]
    NotInitialized,
}

type RecentLines = Arc<Mutex<VecDeque<String>>>;

static RECENT: OnceLock<RecentLines> = OnceLock::new();

/// Options for `init_logger_with`
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub max_bytes: u64,
    pub max_files: usize,
    pub recent_lines: usize,
    pub level: tracing::Level,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            recent_lines: DEFAULT_RECENT_LINES,
            level: tracing::Level::INFO,
        }
    }
}

/// Initialize the global logger with default options.
///
/// Logs go to `<log_dir>/<app_name>.log`, rotated by size.
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

pub fn init_logger_with(
    log_dir: impl Into<PathBuf>,
    app_name: &str,
    options: LoggerOptions,
) -> Result<(), LoggerError> {
    let log_dir = log_dir.into();
    fs::create_dir_all(&log_dir)?;

    let recent: RecentLines = Arc::new(Mutex::new(VecDeque::with_capacity(options.recent_lines)));
    let file = RollingFile::open(&log_dir, app_name, options.max_bytes, options.max_files)?
        .with_recent(recent.clone(), options.recent_lines);

    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_tag(app_name)
                .with_max_level(log::LevelFilter::Info),
        );
        drop(file);
    }

    #[cfg(not(target_os = "android"))]
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_max_level(options.level)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    RECENT.set(recent).map_err(|_| LoggerError::AlreadyInitialized)?;
    Ok(())
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before `init_logger`.
pub fn recent_lines() -> Vec<String> {
    RECENT
        .get()
        .and_then(|recent| recent.lock().ok().map(|lines| lines.iter().cloned().collect()))
        .unwrap_or_default()
}

fn ensure_initialized() -> Result<(), LoggerError> {
    if RECENT.get().is_some() {
        Ok(())
    } else {
        Err(LoggerError::NotInitialized)
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Log file writer that rotates once the active file exceeds `max_bytes`.
///
/// Rotation shifts `name.log -> name.1.log -> name.2.log ...` and drops the
/// oldest file so that at most `max_files` files exist.
pub struct RollingFile {
    dir: PathBuf,
    name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
    recent: Option<(RecentLines, usize)>,
}

impl RollingFile {
    pub fn open(dir: &Path, name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = dir.join(format!("{}.log", name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            name: name.to_string(),
            max_bytes,
            max_files: max_files.max(1),
            file,
            written,
            recent: None,
        })
    }

    fn with_recent(mut self, recent: RecentLines, capacity: usize) -> Self {
        self.recent = Some((recent, capacity));
        self
    }

    /// Path of the n-th file, 0 being the active one.
    pub fn path_for(&self, index: usize) -> PathBuf {
        if index == 0 {
            self.dir.join(format!("{}.log", self.name))
        } else {
            self.dir.join(format!("{}.{}.log", self.name, index))
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.path_for(self.max_files - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.max_files - 1).rev() {
            let from = self.path_for(index);
            if from.exists() {
                fs::rename(&from, self.path_for(index + 1))?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(0))?;
        self.written = 0;
        Ok(())
    }

    fn remember(&self, buf: &[u8]) {
        let Some((recent, capacity)) = &self.recent else {
            return;
        };
        if *capacity == 0 {
            return;
        }
        let Ok(mut lines) = recent.lock() else {
            return;
        };
        for line in String::from_utf8_lossy(buf).lines() {
            if line.trim().is_empty() {
                continue;
            }
            if lines.len() == *capacity {
                lines.pop_front();
            }
            lines.push_back(line.to_string());
        }
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_files > 1 && self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        self.remember(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
