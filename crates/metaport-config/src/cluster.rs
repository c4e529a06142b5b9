//! Configuration for a single remote cluster.
//!
//! A cluster is addressed either by `metastore_host` + `metastore_port` or by
//! a `metastore_url` of the form `thrift://host:port`. Authentication is
//! either absent (plain Thrift) or SASL with a service principal and the
//! signature under which the delegation token is stored.

use metaport_common::{ClusterDescriptor, MetastoreEndpoint};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use validator::Validate;

use crate::{ConfigError, Result};

/// Authentication used when talking to the metastore
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mechanism", rename_all = "lowercase")]
pub enum AuthConfig {
    /// Unauthenticated Thrift transport
    #[default]
    None,

    /// SASL handshake backed by a delegation token
    Sasl {
        /// Service principal of the metastore server (e.g. "hive/_HOST@REALM")
        principal: String,
        /// Label the delegation token is stored under
        token_signature: String,
    },
}

impl AuthConfig {
    pub fn is_sasl(&self) -> bool {
        matches!(self, AuthConfig::Sasl { .. })
    }
}

/// Settings for one cluster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClusterConfig {
    /// Logical cluster name, unique within a process
    #[validate(length(min = 1))]
    pub name: String,

    /// Metastore hostname (use together with `metastore_port`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_host: Option<String>,

    /// Metastore port (use together with `metastore_host`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_port: Option<u16>,

    /// Metastore URL, e.g. "thrift://meta1:9083"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_url: Option<String>,

    /// Compute layer (job tracker) hostname
    #[serde(default)]
    pub compute_host: String,

    /// Compute layer (job tracker) port
    #[serde(default)]
    pub compute_port: String,

    /// Root of the cluster's storage
    pub storage_root: PathBuf,

    /// Scratch directory, must be under `storage_root`
    pub scratch_dir: PathBuf,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl ClusterConfig {
    /// Parse a cluster definition from environment variables
    ///
    /// With `prefix = "METAPORT_CLUSTER"` the supported variables are:
    /// - METAPORT_CLUSTER_NAME: cluster name; when unset, returns `Ok(None)`
    /// - METAPORT_CLUSTER_METASTORE_URL: "thrift://host:port"
    /// - METAPORT_CLUSTER_METASTORE_HOST / METAPORT_CLUSTER_METASTORE_PORT
    /// - METAPORT_CLUSTER_COMPUTE_HOST / METAPORT_CLUSTER_COMPUTE_PORT
    /// - METAPORT_CLUSTER_STORAGE_ROOT / METAPORT_CLUSTER_SCRATCH_DIR
    /// - METAPORT_CLUSTER_AUTH_PRINCIPAL / METAPORT_CLUSTER_TOKEN_SIGNATURE:
    ///   enable SASL when the principal is set
    pub fn from_env(prefix: &str) -> Result<Option<Self>> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Same as [`ClusterConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix));

        let name = match var("NAME") {
            Some(name) => name,
            None => return Ok(None),
        };

        let metastore_port = var("METASTORE_PORT")
            .map(|v| {
                v.parse::<u16>().map_err(|e| {
                    ConfigError::Parse(format!("Invalid {}_METASTORE_PORT '{}': {}", prefix, v, e))
                })
            })
            .transpose()?;

        let storage_root = var("STORAGE_ROOT")
            .ok_or_else(|| ConfigError::Parse(format!("{}_STORAGE_ROOT not set", prefix)))?;
        let scratch_dir = var("SCRATCH_DIR")
            .ok_or_else(|| ConfigError::Parse(format!("{}_SCRATCH_DIR not set", prefix)))?;

        let auth = match var("AUTH_PRINCIPAL") {
            Some(principal) => AuthConfig::Sasl {
                principal,
                token_signature: var("TOKEN_SIGNATURE").unwrap_or_default(),
            },
            None => AuthConfig::None,
        };

        let config = ClusterConfig {
            name,
            metastore_host: var("METASTORE_HOST"),
            metastore_port,
            metastore_url: var("METASTORE_URL"),
            compute_host: var("COMPUTE_HOST").unwrap_or_default(),
            compute_port: var("COMPUTE_PORT").unwrap_or_default(),
            storage_root: PathBuf::from(storage_root),
            scratch_dir: PathBuf::from(scratch_dir),
            auth,
        };

        config.validate_config()?;
        debug!("Loaded cluster '{}' from environment prefix {}", config.name, prefix);
        Ok(Some(config))
    }

    /// Validate the entire cluster configuration
    pub fn validate_config(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ConfigError::Validation(format!("cluster '{}': {}", self.name, e)))?;

        self.metastore_endpoint()?;
        self.validate_scratch_dir()?;
        self.validate_auth()?;

        Ok(())
    }

    /// Resolve the metastore endpoint from either the URL or host and port
    pub fn metastore_endpoint(&self) -> Result<MetastoreEndpoint> {
        let endpoint = match (&self.metastore_url, &self.metastore_host, self.metastore_port) {
            (Some(url), None, None) => MetastoreEndpoint::parse(url),
            (None, Some(host), Some(port)) => MetastoreEndpoint::new(host.clone(), port),
            (Some(_), _, _) => {
                return Err(ConfigError::Validation(format!(
                    "cluster '{}': set either metastore_url or metastore_host/metastore_port, not both",
                    self.name
                )))
            }
            _ => {
                return Err(ConfigError::Validation(format!(
                    "cluster '{}': metastore_url or both metastore_host and metastore_port are required",
                    self.name
                )))
            }
        };

        endpoint.map_err(|e| ConfigError::Validation(format!("cluster '{}': {}", self.name, e)))
    }

    fn validate_scratch_dir(&self) -> Result<()> {
        if !self.scratch_dir.starts_with(&self.storage_root) {
            return Err(ConfigError::Validation(format!(
                "cluster '{}': scratch_dir {:?} is not under storage_root {:?}",
                self.name, self.scratch_dir, self.storage_root
            )));
        }
        Ok(())
    }

    fn validate_auth(&self) -> Result<()> {
        if let AuthConfig::Sasl { principal, token_signature } = &self.auth {
            if principal.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "cluster '{}': SASL requires a principal",
                    self.name
                )));
            }
            if token_signature.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "cluster '{}': SASL requires a token signature",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Validate and freeze into an immutable descriptor
    pub fn to_descriptor(&self) -> Result<ClusterDescriptor> {
        self.validate_config()?;
        let endpoint = self.metastore_endpoint()?;

        let (principal, token_signature) = match &self.auth {
            AuthConfig::Sasl { principal, token_signature } => {
                (principal.clone(), token_signature.clone())
            }
            AuthConfig::None => (String::new(), String::new()),
        };

        Ok(ClusterDescriptor::new(
            self.name.clone(),
            endpoint.host(),
            endpoint.port(),
            self.compute_host.clone(),
            self.compute_port.clone(),
            self.storage_root.clone(),
            self.scratch_dir.clone(),
            principal,
            token_signature,
        ))
    }
}
