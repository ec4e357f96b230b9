//! Error types for route registration.

use thiserror::Error;
use trellis_router::PatternError;

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors returned while building an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The route pattern failed validation.
    #[error("invalid route pattern: {0}")]
    InvalidPattern(#[from] PatternError),
}
