//! Precondition check shared by every operation that needs a live instance.

use std::fmt;

use crate::error::CodecError;
use crate::logger::{Logger, log_error};

/// Which controller an instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encoder,
    Decoder,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Encoder => "encoder",
            Self::Decoder => "decoder",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the instance in `slot`, or logs and fails with `NotInitialized`.
pub(crate) fn require<'a, T>(
    slot: &'a mut Option<T>,
    direction: Direction,
    op: &'static str,
    logger: &dyn Logger,
) -> Result<&'a mut T, CodecError> {
    match slot {
        Some(instance) => Ok(instance),
        None => {
            log_error!(
                logger,
                "[{}] {} wasn't initialized, you must call {}.init() first",
                op,
                direction,
                direction
            );
            Err(CodecError::NotInitialized { direction, op })
        }
    }
}
