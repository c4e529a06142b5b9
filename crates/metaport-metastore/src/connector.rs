//! Interface to the external authentication factory.

use metaport_common::MetastoreEndpoint;
use metaport_config::EnvConfig;
use thiserror::Error;

/// Connector failure
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Metastore unreachable: {0}")]
    Unreachable(String),

    #[error("SASL authentication failed for principal '{principal}': {reason}")]
    Authentication { principal: String, reason: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How the handshake authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode<'a> {
    /// Unauthenticated transport
    Plain,

    /// SASL with a service principal and a stored delegation token
    Sasl {
        principal: &'a str,
        token_signature: &'a str,
    },
}

impl AuthMode<'_> {
    pub fn is_sasl(&self) -> bool {
        matches!(self, AuthMode::Sasl { .. })
    }
}

/// Everything a connector needs for one handshake
#[derive(Debug, Clone, Copy)]
pub struct ConnectRequest<'a> {
    /// Name of the cluster being connected to
    pub cluster: &'a str,
    pub endpoint: &'a MetastoreEndpoint,
    pub auth: AuthMode<'a>,
    /// Ambient settings for the transport and handshake
    pub env: &'a EnvConfig,
}

/// Builds connected metastore clients.
///
/// Implementations perform the network connect and the authentication
/// handshake, blocking the calling thread. Timeouts are theirs to enforce.
pub trait MetastoreConnector: Send + Sync {
    /// Raw client produced by a successful handshake
    type Client: 'static;

    fn connect(&self, request: &ConnectRequest<'_>) -> Result<Self::Client, ConnectError>;
}
