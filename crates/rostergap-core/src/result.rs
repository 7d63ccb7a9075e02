//! Result type alias for rostergap.

use crate::RostergapError;

/// A specialized `Result` type for rostergap operations.
pub type RostergapResult<T> = Result<T, RostergapError>;
