//! Logging init: file under XDG state dir, or graceful fallback to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter directives for a CLI verbosity level (`-v` count).
/// `RUST_LOG`, when set, takes precedence.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info,pullsum=debug,pullsum_core=debug",
        1 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)))
}

/// Log sink: the log file, or stderr if the handle cannot be cloned for a writer.
enum LogSink {
    File(fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct SharedLogFile(fs::File);

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

/// Initialize structured logging to `~/.local/state/pullsum/pullsum.log` and
/// return the log file path. Errors (unwritable state dir) are returned so the
/// caller can fall back to [`init_logging_stderr`].
pub fn init_logging(verbosity: u8) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pullsum")?;
    let log_path = xdg_dirs
        .place_state_file("pullsum.log")
        .context("create log directory")?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(BoxMakeWriter::new(SharedLogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(path = %log_path.display(), "pullsum logging initialized");
    Ok(log_path)
}

/// Log to stderr only. Used when the log file cannot be set up.
pub fn init_logging_stderr(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
