//! Rolling file logger
//!
//! Installs a `tracing` subscriber that writes to stdout and to one log file
//! per day (`{app}-{YYYY-MM-DD}.log`), keeping only the newest files. The
//! most recent lines are also held in a circular buffer so they can be shown
//! without touching the disk.

use chrono::{Local, NaiveDate};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_MAX_FILES: usize = 7;
pub const DEFAULT_RECENT_LINES: usize = 500;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install subscriber: {0}")]
    Init(String),

    #[error("logger not initialized")]
    NotInitialized,
}

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub log_dir: PathBuf,
    pub app_name: String,
    /// Daily files kept on disk, including today's
    pub max_files: usize,
    /// Lines kept in the in-memory buffer
    pub recent_lines: usize,
}

impl LoggerOptions {
    pub fn new(log_dir: impl Into<PathBuf>, app_name: &str) -> Self {
        Self {
            log_dir: log_dir.into(),
            app_name: app_name.to_string(),
            max_files: DEFAULT_MAX_FILES,
            recent_lines: DEFAULT_RECENT_LINES,
        }
    }
}

/// Initialize logging with default retention
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_with(LoggerOptions::new(log_dir, app_name))
}

pub fn init_with(options: LoggerOptions) -> Result<(), LoggerError> {
    let writer = RollingWriter::new(&options)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer.clone()))
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    let _ = LOGGER.set(writer);
    Ok(())
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::error!("{}", message);
    Ok(())
}

/// Most recent log lines, oldest first
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingWriter::recent).unwrap_or_default()
}

struct ActiveFile {
    date: NaiveDate,
    file: File,
}

struct Inner {
    dir: PathBuf,
    prefix: String,
    max_files: usize,
    capacity: usize,
    active: Mutex<Option<ActiveFile>>,
    recent: Mutex<VecDeque<String>>,
}

/// `MakeWriter` that rolls over to a new file each day
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Inner>,
}

impl RollingWriter {
    pub fn new(options: &LoggerOptions) -> Result<Self, LoggerError> {
        fs::create_dir_all(&options.log_dir).map_err(|source| LoggerError::Io {
            path: options.log_dir.clone(),
            source,
        })?;
        Ok(Self {
            inner: Arc::new(Inner {
                dir: options.log_dir.clone(),
                prefix: options.app_name.clone(),
                max_files: options.max_files.max(1),
                capacity: options.recent_lines,
                active: Mutex::new(None),
                recent: Mutex::new(VecDeque::with_capacity(options.recent_lines)),
            }),
        })
    }

    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.inner
            .dir
            .join(format!("{}-{}.log", self.inner.prefix, date.format("%Y-%m-%d")))
    }

    pub fn recent(&self) -> Vec<String> {
        match self.inner.recent.lock() {
            Ok(recent) => recent.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn write_dated(&self, date: NaiveDate, buf: &[u8]) -> io::Result<()> {
        {
            let mut active = self
                .inner
                .active
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

            if active.as_ref().map(|a| a.date) != Some(date) {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.file_path(date))?;
                *active = Some(ActiveFile { date, file });
                self.prune()?;
            }
            if let Some(active) = active.as_mut() {
                active.file.write_all(buf)?;
            }
        }
        self.remember(buf);
        Ok(())
    }

    fn remember(&self, buf: &[u8]) {
        if self.inner.capacity == 0 {
            return;
        }
        let Ok(mut recent) = self.inner.recent.lock() else {
            return;
        };
        for line in String::from_utf8_lossy(buf).lines() {
            if recent.len() == self.inner.capacity {
                recent.pop_front();
            }
            recent.push_back(line.to_string());
        }
    }

    /// Remove the oldest files beyond `max_files`
    fn prune(&self) -> io::Result<()> {
        let mut logs = log_files(&self.inner.dir, &self.inner.prefix)?;
        // Dated names sort chronologically
        logs.sort();
        let excess = logs.len().saturating_sub(self.inner.max_files);
        for path in logs.into_iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn log_files(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let head = format!("{}-", prefix);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&head) && n.ends_with(".log"));
        if matches {
            files.push(path);
        }
    }
    Ok(files)
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_dated(Local::now().date_naive(), buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.active.lock() {
            Ok(mut active) => match active.as_mut() {
                Some(active) => active.file.flush(),
                None => Ok(()),
            },
            Err(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn writer(dir: &TempDir, max_files: usize, recent_lines: usize) -> RollingWriter {
        let mut options = LoggerOptions::new(dir.path(), "grocery");
        options.max_files = max_files;
        options.recent_lines = recent_lines;
        RollingWriter::new(&options).unwrap()
    }

    #[test]
    fn test_writes_dated_file() {
        let dir = TempDir::new().unwrap();
        let w = writer(&dir, 3, 10);

        w.write_dated(day(1), b"first\n").unwrap();
        w.write_dated(day(1), b"second\n").unwrap();

        let text = fs::read_to_string(dir.path().join("grocery-2024-05-01.log")).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn test_keeps_newest_files() {
        let dir = TempDir::new().unwrap();
        let w = writer(&dir, 2, 10);

        for d in 1..=4 {
            w.write_dated(day(d), format!("day {d}\n").as_bytes()).unwrap();
        }

        let mut names: Vec<_> = log_files(dir.path(), "grocery")
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["grocery-2024-05-03.log", "grocery-2024-05-04.log"]);
    }

    #[test]
    fn test_recent_lines_are_bounded() {
        let dir = TempDir::new().unwrap();
        let w = writer(&dir, 2, 3);

        w.write_dated(day(1), b"a\nb\n").unwrap();
        w.write_dated(day(1), b"c\nd\n").unwrap();

        assert_eq!(w.recent(), ["b", "c", "d"]);
    }

    #[test]
    fn test_other_files_untouched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        let w = writer(&dir, 1, 0);

        w.write_dated(day(1), b"x\n").unwrap();
        w.write_dated(day(2), b"y\n").unwrap();

        assert!(dir.path().join("notes.txt").exists());
        assert!(!w.file_path(day(1)).exists());
        assert!(w.recent().is_empty());
    }
}
