//! Diagnostics for the codec controllers.
//!
//! Every `Encoder`, `Decoder` and `CodecOpus` carries an `Arc<dyn Logger>`.
//! Rejected calls are reported at error level and instance lifecycle at
//! debug level. Unless a caller supplies its own sink, events go to `tracing`
//! under the `easyopus` target.

use std::sync::Arc;

/// Sink for controller diagnostics.
///
/// Implementations must be shareable across threads, since a controller may
/// be moved to another thread together with its native instance.
pub trait Logger: Send + Sync {
    /// A call was rejected or the native library reported a failure.
    fn error(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn info(&self, msg: &str);
    /// Instance allocation and release.
    fn debug(&self, msg: &str);
}

/// Sink used by `Encoder::new`, `Decoder::new` and `CodecOpus::new`.
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}

struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, msg: &str) {
        tracing::error!(target: "easyopus", "{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "easyopus", "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!(target: "easyopus", "{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!(target: "easyopus", "{msg}");
    }
}

/// Discards everything. Useful for benchmarks and hot loops.
pub struct NopLogger;

impl Logger for NopLogger {
    fn error(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
}

/// Formatted error logging.
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}

/// Formatted debug logging.
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

pub(crate) use log_debug;
pub(crate) use log_error;
