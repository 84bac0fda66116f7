use std::fmt;

use crate::render::BackendError;

/// Error returned by drawing and rendering operations on a [`Batcher`](crate::batch::Batcher).
///
/// All variants are non-recoverable within the current frame; callers recover by
/// discarding the frame with [`Batcher::clear`](crate::batch::Batcher::clear).
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    /// Geometry storage could not grow to `requested` elements.
    OutOfMemory { requested: usize },
    /// The rendering backend rejected a call (e.g. a disposed texture or material).
    Backend(BackendError),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::OutOfMemory { requested } => {
                write!(f, "geometry buffer could not grow to {requested} elements")
            }
            BatchError::Backend(e) => write!(f, "rendering backend error: {e}"),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Backend(e) => Some(e),
            BatchError::OutOfMemory { .. } => None,
        }
    }
}

impl From<BackendError> for BatchError {
    fn from(e: BackendError) -> Self {
        BatchError::Backend(e)
    }
}
