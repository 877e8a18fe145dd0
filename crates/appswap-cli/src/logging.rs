use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Append-only log file that never reports an error to the caller.
pub(crate) struct LenientLogFile {
    file: Option<File>,
}

impl LenientLogFile {
    pub(crate) fn open(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path).ok();
        Self { file }
    }
}

impl Write for LenientLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.file.as_mut() {
            if file.write_all(buf).is_err() {
                self.file = None;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

/// `2026-01-31 13:45:00 |` prefix for log-file lines.
pub(crate) struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{} |", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Installs the log-file layer (INFO and above) and a stderr echo driven by `RUST_LOG`.
pub(crate) fn init_logging(log_path: &Path) {
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(LenientLogFile::open(log_path)))
        .with_ansi(false)
        .with_timer(LocalTimestamp)
        .with_level(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
}
