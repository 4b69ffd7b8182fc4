use thiserror::Error;

use crate::mvi::EffectPanic;
use crate::service::ImageApiError;

/// Opaque domain failure carried by result actions.
///
/// Comparable so actions stay `PartialEq`; only the rendered message is
/// kept, the source error is not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ImageApiError> for Failure {
    fn from(err: ImageApiError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<EffectPanic> for Failure {
    fn from(panic: EffectPanic) -> Self {
        Self::new(panic.to_string())
    }
}
