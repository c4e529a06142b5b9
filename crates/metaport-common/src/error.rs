//! Error types for Metaport.

use thiserror::Error;

/// Result type alias for Metaport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by wrapped errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for Metaport.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Building an authenticated metastore client failed.
    ///
    /// Covers endpoint composition, the authentication handshake and raw
    /// client construction. The underlying failure is kept as the source.
    #[error("Failed to connect to metastore of cluster '{cluster}' at {endpoint}: {source}")]
    MetastoreConnection {
        cluster: String,
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap a construction failure for the given cluster and endpoint.
    pub fn metastore_connection(
        cluster: impl Into<String>,
        endpoint: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::MetastoreConnection {
            cluster: cluster.into(),
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// Whether this error came from building a metastore client.
    pub fn is_metastore_connection(&self) -> bool {
        matches!(self, Error::MetastoreConnection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_metastore_connection_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::metastore_connection("prod", "thrift://meta1:9083", cause);

        assert!(err.is_metastore_connection());
        assert_eq!(
            err.to_string(),
            "Failed to connect to metastore of cluster 'prod' at thrift://meta1:9083: refused"
        );
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "refused");
    }

    #[test]
    fn test_other_errors_are_not_connection_errors() {
        let err = Error::Configuration("bad".to_string());
        assert!(!err.is_metastore_connection());
    }
}
