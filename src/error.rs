use std::io;
use thiserror::Error;

/// Errors raised while loading configuration or hosting a router.
///
/// Routing itself cannot fail: unmatched requests go to the not-found handler.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listen address could not be resolved
    #[error("invalid listen address {0}: {1}")]
    Address(String, #[source] io::Error),

    /// The listen address resolved to nothing
    #[error("listen address {0} did not resolve")]
    Unresolved(String),

    /// Binding or adopting the listener failed
    #[error("bind failed: {0}")]
    Bind(#[source] hyper::Error),

    /// The server stopped with an error
    #[error("server error: {0}")]
    Server(#[source] hyper::Error),

    /// The tokio runtime could not be built
    #[error("runtime initialization failed: {0}")]
    Runtime(#[source] io::Error),

    /// Configuration could not be loaded or deserialized
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Type alias for Results using ServeError as the error type
pub type Result<T> = std::result::Result<T, ServeError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the formatting of address resolution failures.
    #[test]
    fn test_address_error_display() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test error");
        let err = ServeError::Address("nowhere:80".into(), io_err);

        assert!(matches!(err, ServeError::Address(..)));
        assert_eq!(err.to_string(), "invalid listen address nowhere:80: test error");
    }

    /// Tests the automatic conversion from config errors.
    #[test]
    fn test_config_error_conversion() {
        let err = ServeError::from(config::ConfigError::NotFound("port".into()));

        assert!(matches!(err, ServeError::Config(_)));
        assert!(err.to_string().starts_with("configuration error: "));
    }
}
