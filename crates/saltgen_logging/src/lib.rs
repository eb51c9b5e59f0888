//! Shared logging utilities for saltgen.
//!
//! Console output always goes to stderr; stdout is reserved for the
//! generated resource document.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Log levels as named by Salt's `--log-level` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    All,
    Garbage,
    Trace,
    Debug,
    Profile,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
    Quiet,
}

impl LogLevel {
    pub const NAMES: [&'static str; 10] = [
        "all", "garbage", "trace", "debug", "profile", "info", "warning", "error", "critical",
        "quiet",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::All => "all",
            LogLevel::Garbage => "garbage",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Profile => "profile",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
            LogLevel::Quiet => "quiet",
        }
    }

    /// Equivalent `EnvFilter` directive.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::All | LogLevel::Garbage | LogLevel::Trace => "trace",
            LogLevel::Debug | LogLevel::Profile => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
            LogLevel::Quiet => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid log level '{0}' (expected one of: all, garbage, trace, debug, profile, info, warning, error, critical, quiet)")]
pub struct LogLevelParseError(String);

impl FromStr for LogLevel {
    type Err = LogLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(LogLevel::All),
            "garbage" => Ok(LogLevel::Garbage),
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "profile" => Ok(LogLevel::Profile),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            "quiet" => Ok(LogLevel::Quiet),
            _ => Err(LogLevelParseError(s.to_string())),
        }
    }
}

/// Log file destination and its level.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub level: LogLevel,
}

/// Logging configuration for the saltgen binary.
pub struct LogConfig {
    pub console_level: LogLevel,
    pub file: Option<LogFile>,
}

/// Initialize tracing with stderr output and an optional rolling log file.
///
/// `RUST_LOG` overrides both levels. A log file that cannot be opened is
/// reported on stderr and skipped.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let env_override = EnvFilter::try_from_default_env().ok();
    let filter_for = |level: LogLevel| {
        env_override
            .as_ref()
            .map(|f| EnvFilter::new(f.to_string()))
            .unwrap_or_else(|| EnvFilter::new(level.directive()))
    };

    let file_layer = match config.file {
        Some(log_file) => match SharedRollingWriter::new(&log_file.path) {
            Ok(writer) => Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(filter_for(log_file.level)),
            ),
            Err(err) => {
                eprintln!("Warning: failed to open log file: {:#}", err);
                None
            }
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_filter(filter_for(config.console_level)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

struct RollingFileAppender {
    path: PathBuf,
    max_files: usize,
    max_size: u64,
    file: Option<File>,
    current_size: u64,
}

impl RollingFileAppender {
    fn new(path: PathBuf, max_files: usize, max_size: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut appender = Self {
            path,
            max_files: max_files.max(1),
            max_size,
            file: None,
            current_size: 0,
        };
        let (file, size) = appender.open_current_file()?;
        appender.file = Some(file);
        appender.current_size = size;
        if appender.current_size > appender.max_size {
            appender.rotate()?;
        }
        Ok(appender)
    }

    fn open_current_file(&self) -> io::Result<(File, u64)> {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let size = file.metadata()?.len();
        Ok((file, size))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        self.rotate_files()?;

        let (file, size) = self.open_current_file()?;
        self.file = Some(file);
        self.current_size = size;
        Ok(())
    }

    fn rotate_files(&self) -> io::Result<()> {
        let max_index = self.max_files.saturating_sub(1);
        if max_index == 0 {
            return Ok(());
        }

        let oldest = self.rotated_path(max_index);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for idx in (1..max_index).rev() {
            let src = self.rotated_path(idx);
            if src.exists() {
                fs::rename(&src, self.rotated_path(idx + 1))?;
            }
        }

        if self.path.exists() {
            fs::rename(&self.path, self.rotated_path(1))?;
        }

        Ok(())
    }
}

impl Write for RollingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.current_size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let bytes = file.write(buf)?;
        self.current_size += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

#[derive(Clone)]
struct SharedRollingWriter {
    inner: Arc<Mutex<RollingFileAppender>>,
}

impl SharedRollingWriter {
    fn new(path: &Path) -> Result<Self> {
        let appender =
            RollingFileAppender::new(path.to_path_buf(), MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(appender)),
        })
    }
}

struct SharedRollingWriterGuard {
    inner: Arc<Mutex<RollingFileAppender>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRollingWriter {
    type Writer = SharedRollingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedRollingWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedRollingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}
