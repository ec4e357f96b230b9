//! Server error types.

use thiserror::Error;

/// Errors that stop the server from running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is malformed or could not be bound.
    #[error("Bind error: {0}")]
    BindError(String),

    /// I/O error on the listening socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`ServerError`].
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ServerError::BindError("Address in use".to_string());
        assert_eq!(err.to_string(), "Bind error: Address in use");

        let err: ServerError =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
