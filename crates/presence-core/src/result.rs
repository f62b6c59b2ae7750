//! Convenience result type alias for the presence relay.

use crate::error::AppError;

/// A specialized `Result` type for presence relay operations.
pub type AppResult<T> = Result<T, AppError>;
