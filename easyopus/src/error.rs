use thiserror::Error;

use crate::guard::Direction;

/// Generic failure status used by the flat entry points.
pub const STATUS_FAILURE: i32 = -1;

/// Errors returned by encoder and decoder operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("opus: invalid channel count {0}, must be 1 or 2")]
    InvalidChannels(i32),

    #[error("opus: invalid argument: {0}")]
    InvalidArgument(String),

    #[error("opus: state size query returned {0}")]
    SizeQuery(i32),

    #[error("opus: native init failed ({code}): {message}")]
    NativeInit { code: i32, message: String },

    #[error("opus: {direction} wasn't initialized before {op}")]
    NotInitialized { direction: Direction, op: &'static str },

    #[error("opus: transform failed ({code}): {message}")]
    Transform { code: i32, message: String },

    #[error("opus: ctl request {request} failed ({code}): {message}")]
    Control {
        request: i32,
        code: i32,
        message: String,
    },

    #[error("opus: input holds {actual} samples, frame needs {expected}")]
    InputTooShort { expected: usize, actual: usize },
}

impl CodecError {
    pub(crate) fn native_init(code: i32) -> Self {
        Self::NativeInit {
            code,
            message: crate::ffi::error_string(code),
        }
    }

    pub(crate) fn transform(code: i32) -> Self {
        Self::Transform {
            code,
            message: crate::ffi::error_string(code),
        }
    }

    pub(crate) fn control(request: i32, code: i32) -> Self {
        Self::Control {
            request,
            code,
            message: crate::ffi::error_string(code),
        }
    }

    /// Collapses the error into the integer status of the flat API.
    ///
    /// A failed size query reports the queried size. A failed ctl reports
    /// the native status. Everything else is `STATUS_FAILURE`.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::SizeQuery(size) => *size,
            Self::Control { code, .. } => *code,
            _ => STATUS_FAILURE,
        }
    }
}
