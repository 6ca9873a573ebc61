//! Diagnostics: the optional tracing log and the raw input event dump.
//!
//! Neither writes to the terminal; while the UI owns the screen, anything
//! printed to stdout or stderr would corrupt the frame.

use std::ffi::OsStr;
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEBUG_ENV: &str = "CHATBOX_DEBUG";
pub const DEFAULT_DEBUG_LOG: &str = "messages.log";
const DEFAULT_FILTER: &str = "chatbox=debug";

/// Install a file-backed tracing subscriber. The filter comes from
/// `RUST_LOG` when set.
pub fn init_tracing(log_file: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()
        .map_err(io::Error::other)
}

/// Append-only dump of every raw terminal event, one `Debug` line each.
pub struct DebugSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl DebugSink {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Enabled by `CHATBOX_DEBUG`. A value of `1`, `true` or nothing selects
    /// `messages.log` in the working directory; any other value is a path.
    pub fn from_env() -> io::Result<Option<Self>> {
        match std::env::var_os(DEBUG_ENV) {
            None => Ok(None),
            Some(value) => Self::open(debug_log_path(&value)).map(Some),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, event: &impl Debug) {
        let written = writeln!(self.writer, "{event:?}").and_then(|_| self.writer.flush());
        if let Err(err) = written {
            warn!(path = %self.path.display(), %err, "failed to write debug event");
        }
    }
}

fn debug_log_path(value: &OsStr) -> PathBuf {
    match value.to_str().map(str::trim) {
        Some("") | Some("1") | Some("true") => PathBuf::from(DEFAULT_DEBUG_LOG),
        _ => PathBuf::from(value),
    }
}
