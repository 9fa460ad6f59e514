//! In-memory log capture
//!
//! [`LogCapture`] is a `tracing` writer backed by a shared byte buffer. The
//! aggregator installs it as the thread's default subscriber for the length
//! of a run and drains it after every case, so each record carries only the
//! output produced while that case ran.
//!
//! Capture and echo are filtered separately. `RUST_LOG` only narrows the
//! echo; what lands in a case's `output` follows [`CAPTURE_FILTER_ENV`],
//! which defaults to `info` when unset or invalid.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding the filter directives for captured output
pub const CAPTURE_FILTER_ENV: &str = "CASEBOOK_CAPTURE_LOG";

const DEFAULT_FILTER: &str = "info";

/// Shared capture buffer; clones write into the same buffer
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything captured so far
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Captured text, left in place
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Captured text, leaving the buffer empty
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.lock());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Install a thread-scoped subscriber writing into this buffer.
    ///
    /// `echo`, when given, receives the events `RUST_LOG` lets through
    /// (console or log file). The previous subscriber comes back when the
    /// returned guard is dropped.
    pub fn install(&self, echo: Option<BoxMakeWriter>) -> DefaultGuard {
        let capture_filter = EnvFilter::try_from_env(CAPTURE_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let capture_layer = tracing_subscriber::fmt::layer()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_filter(capture_filter);

        let echo_layer = echo.map(|writer| {
            let echo_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(echo_filter)
        });

        let subscriber = tracing_subscriber::registry()
            .with(capture_layer)
            .with(echo_layer);

        tracing::subscriber::set_default(subscriber)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writer handed out per event by [`LogCapture`]
#[derive(Debug)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}
