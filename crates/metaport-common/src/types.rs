//! Cluster identity and metastore addressing.

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// URI scheme of the metastore RPC transport.
pub const THRIFT_SCHEME: &str = "thrift";

/// Identity and connection parameters of one remote cluster.
///
/// Built once from configuration and never mutated afterwards, so it can be
/// shared freely between threads. No validation happens here; see
/// `metaport_config::ClusterConfig` for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDescriptor {
    name: String,
    metastore_host: String,
    metastore_port: u16,
    compute_host: String,
    compute_port: String,
    storage_root: PathBuf,
    scratch_dir: PathBuf,
    auth_principal: String,
    token_signature: String,
}

impl ClusterDescriptor {
    /// Create a descriptor from already-validated values.
    ///
    /// `scratch_dir` is expected to live under `storage_root`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        metastore_host: impl Into<String>,
        metastore_port: u16,
        compute_host: impl Into<String>,
        compute_port: impl Into<String>,
        storage_root: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        auth_principal: impl Into<String>,
        token_signature: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            metastore_host: metastore_host.into(),
            metastore_port,
            compute_host: compute_host.into(),
            compute_port: compute_port.into(),
            storage_root: storage_root.into(),
            scratch_dir: scratch_dir.into(),
            auth_principal: auth_principal.into(),
            token_signature: token_signature.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metastore_host(&self) -> &str {
        &self.metastore_host
    }

    pub fn metastore_port(&self) -> u16 {
        self.metastore_port
    }

    /// Host of the compute layer (job tracker / resource manager)
    pub fn compute_host(&self) -> &str {
        &self.compute_host
    }

    /// Port of the compute layer, kept as given by configuration
    pub fn compute_port(&self) -> &str {
        &self.compute_port
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Service principal of the metastore server
    pub fn auth_principal(&self) -> &str {
        &self.auth_principal
    }

    /// Label under which the delegation token is stored
    pub fn token_signature(&self) -> &str {
        &self.token_signature
    }

    /// Compose the metastore endpoint from host and port.
    pub fn metastore_endpoint(&self) -> Result<MetastoreEndpoint> {
        MetastoreEndpoint::new(self.metastore_host.clone(), self.metastore_port)
    }
}

/// Address of a metastore Thrift server, rendered as `thrift://host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetastoreEndpoint {
    host: String,
    port: u16,
}

impl MetastoreEndpoint {
    /// Create an endpoint, rejecting hosts that cannot form a URI authority.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::InvalidInput("metastore host is empty".to_string()));
        }
        if host.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@')) {
            return Err(Error::InvalidInput(format!(
                "metastore host '{}' contains characters not allowed in a URI authority",
                host
            )));
        }
        if port == 0 {
            return Err(Error::InvalidInput("metastore port must be non-zero".to_string()));
        }
        Ok(Self { host, port })
    }

    /// Parse a `thrift://host:port` URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let prefix = format!("{}://", THRIFT_SCHEME);
        let authority = uri
            .strip_prefix(&prefix)
            .ok_or_else(|| Error::InvalidInput(format!("'{}' is not a {} URI", uri, THRIFT_SCHEME)))?
            .trim_end_matches('/');

        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidInput(format!("'{}' has no port", uri)))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::InvalidInput(format!("invalid port in '{}': {}", uri, e)))?;

        // IPv6 literals come bracketed
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        Self::new(host, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for MetastoreEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", THRIFT_SCHEME, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", THRIFT_SCHEME, self.host, self.port)
        }
    }
}
