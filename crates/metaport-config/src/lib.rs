//! Cluster configuration for Metaport.
//!
//! This crate provides:
//! - Per-cluster settings with validation
//! - Multi-format cluster files (YAML, TOML, JSON)
//! - Environment-based cluster definitions
//! - The ambient settings snapshot handed to metastore connectors

pub mod cluster;
pub mod env;
pub mod loader;

pub use cluster::{AuthConfig, ClusterConfig};
pub use env::EnvConfig;
pub use loader::{ClustersConfig, FileFormat};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config not found: {0}")]
    NotFound(String),

    #[error("Duplicate cluster name: {0}")]
    DuplicateCluster(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for metaport_common::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Io(io) => metaport_common::Error::Io(io),
            ConfigError::NotFound(name) => metaport_common::Error::NotFound(name),
            other => metaport_common::Error::Configuration(other.to_string()),
        }
    }
}
