//! Raw failure information handed to the aggregator by the host engine.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt::Write;

/// Type identifier recorded for panics (assertion failures)
pub const PANIC_TYPE_ID: &str = "panic";

/// One failed case outcome: type identifier, raw message and formatted trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFailure {
    /// Fully-qualified failure type, used for known-exception lookup
    pub type_id: String,
    /// Raw message, shown when the type is not a known exception
    pub message: String,
    /// Formatted trace stored as the case's `excInfo`
    pub trace: String,
}

impl CaseFailure {
    pub fn new(
        type_id: impl Into<String>,
        message: impl Into<String>,
        trace: impl Into<String>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// Failure from a returned error; the type identifier is the Rust type name of `E`
    pub fn from_error<E>(err: &E, backtrace: Option<&Backtrace>) -> Self
    where
        E: Error + ?Sized + 'static,
    {
        let type_id = std::any::type_name::<E>();
        let message = err.to_string();

        let mut trace = format!("{type_id}: {message}\n");
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(trace, "Caused by: {cause}");
            source = cause.source();
        }
        append_backtrace(&mut trace, backtrace);

        Self {
            type_id: type_id.to_string(),
            message,
            trace,
        }
    }

    /// Failure from a caught panic payload
    pub fn from_panic(
        payload: &(dyn Any + Send),
        location: Option<&str>,
        backtrace: Option<&Backtrace>,
    ) -> Self {
        let message = panic_message(payload);

        let mut trace = match location {
            Some(location) => format!("panicked at {location}:\n{message}\n"),
            None => format!("panicked:\n{message}\n"),
        };
        append_backtrace(&mut trace, backtrace);

        Self {
            type_id: PANIC_TYPE_ID.to_string(),
            message,
            trace,
        }
    }
}

/// Message carried by a panic payload (`&str` or `String`), or a placeholder
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

fn append_backtrace(trace: &mut String, backtrace: Option<&Backtrace>) {
    if let Some(backtrace) = backtrace {
        if backtrace.status() == BacktraceStatus::Captured {
            let _ = write!(trace, "stack backtrace:\n{backtrace}");
        }
    }
}
