//! Cluster variants exposing metastore access and storage layout.

use crate::cache::ClientCache;
use crate::connector::MetastoreConnector;
use crate::handle::MetastoreClientHandle;
use metaport_common::{ClusterDescriptor, Result};
use metaport_config::{ClusterConfig, EnvConfig};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// A remote cluster: metastore access plus its identity and paths.
///
/// Only [`Cluster::metastore_client`] does work; it returns the calling
/// thread's cached handle. Everything else reads the descriptor.
pub trait Cluster: Send + Sync {
    type Client: 'static;

    fn descriptor(&self) -> &ClusterDescriptor;

    fn metastore_client(&self) -> Result<Rc<MetastoreClientHandle<Self::Client>>>;

    /// Drop the calling thread's metastore client so the next call reconnects
    fn invalidate_metastore_client(&self) -> bool;

    fn name(&self) -> &str {
        self.descriptor().name()
    }

    fn storage_root(&self) -> &Path {
        self.descriptor().storage_root()
    }

    fn scratch_dir(&self) -> &Path {
        self.descriptor().scratch_dir()
    }

    fn metastore_host(&self) -> &str {
        self.descriptor().metastore_host()
    }

    fn metastore_port(&self) -> u16 {
        self.descriptor().metastore_port()
    }

    fn compute_host(&self) -> &str {
        self.descriptor().compute_host()
    }

    fn compute_port(&self) -> &str {
        self.descriptor().compute_port()
    }
}

/// Cluster whose metastore speaks unauthenticated Thrift
pub struct PlainCluster<K: MetastoreConnector> {
    cache: ClientCache<K>,
}

impl<K: MetastoreConnector> PlainCluster<K> {
    pub fn new(descriptor: ClusterDescriptor, connector: Arc<K>) -> Self {
        Self {
            cache: ClientCache::plain(Arc::new(descriptor), connector),
        }
    }

    pub fn with_env_config(mut self, env: EnvConfig) -> Self {
        self.cache = self.cache.with_env_config(env);
        self
    }
}

impl<K: MetastoreConnector> Cluster for PlainCluster<K> {
    type Client = K::Client;

    fn descriptor(&self) -> &ClusterDescriptor {
        self.cache.descriptor()
    }

    fn metastore_client(&self) -> Result<Rc<MetastoreClientHandle<K::Client>>> {
        self.cache.get_client()
    }

    fn invalidate_metastore_client(&self) -> bool {
        self.cache.invalidate()
    }
}

/// Cluster whose metastore requires a SASL handshake with a delegation token
pub struct SaslCluster<K: MetastoreConnector> {
    cache: ClientCache<K>,
}

impl<K: MetastoreConnector> SaslCluster<K> {
    pub fn new(descriptor: ClusterDescriptor, connector: Arc<K>) -> Self {
        Self {
            cache: ClientCache::sasl(Arc::new(descriptor), connector),
        }
    }

    pub fn with_env_config(mut self, env: EnvConfig) -> Self {
        self.cache = self.cache.with_env_config(env);
        self
    }

    /// Service principal of the metastore server
    pub fn principal(&self) -> &str {
        self.cache.descriptor().auth_principal()
    }

    pub fn token_signature(&self) -> &str {
        self.cache.descriptor().token_signature()
    }
}

impl<K: MetastoreConnector> Cluster for SaslCluster<K> {
    type Client = K::Client;

    fn descriptor(&self) -> &ClusterDescriptor {
        self.cache.descriptor()
    }

    fn metastore_client(&self) -> Result<Rc<MetastoreClientHandle<K::Client>>> {
        self.cache.get_client()
    }

    fn invalidate_metastore_client(&self) -> bool {
        self.cache.invalidate()
    }
}

/// Cluster variant picked from configuration
pub enum ConfiguredCluster<K: MetastoreConnector> {
    Plain(PlainCluster<K>),
    Sasl(SaslCluster<K>),
}

impl<K: MetastoreConnector> ConfiguredCluster<K> {
    /// Validate `config` and build the variant its `auth` section asks for.
    ///
    /// Connectors see the environment as it is at each handshake.
    pub fn from_config(config: &ClusterConfig, connector: Arc<K>) -> Result<Self> {
        Self::build(config, connector, None)
    }

    /// Like [`ConfiguredCluster::from_config`], with fixed connector settings
    pub fn from_config_with_env(
        config: &ClusterConfig,
        connector: Arc<K>,
        env: EnvConfig,
    ) -> Result<Self> {
        Self::build(config, connector, Some(env))
    }

    fn build(config: &ClusterConfig, connector: Arc<K>, env: Option<EnvConfig>) -> Result<Self> {
        let descriptor = config.to_descriptor()?;
        debug!(
            cluster = %descriptor.name(),
            sasl = config.auth.is_sasl(),
            "Building cluster from configuration"
        );

        let cluster = if config.auth.is_sasl() {
            let cluster = SaslCluster::new(descriptor, connector);
            ConfiguredCluster::Sasl(match env {
                Some(env) => cluster.with_env_config(env),
                None => cluster,
            })
        } else {
            let cluster = PlainCluster::new(descriptor, connector);
            ConfiguredCluster::Plain(match env {
                Some(env) => cluster.with_env_config(env),
                None => cluster,
            })
        };
        Ok(cluster)
    }

    pub fn is_sasl(&self) -> bool {
        matches!(self, ConfiguredCluster::Sasl(_))
    }
}

impl<K: MetastoreConnector> Cluster for ConfiguredCluster<K> {
    type Client = K::Client;

    fn descriptor(&self) -> &ClusterDescriptor {
        match self {
            ConfiguredCluster::Plain(c) => c.descriptor(),
            ConfiguredCluster::Sasl(c) => c.descriptor(),
        }
    }

    fn metastore_client(&self) -> Result<Rc<MetastoreClientHandle<K::Client>>> {
        match self {
            ConfiguredCluster::Plain(c) => c.metastore_client(),
            ConfiguredCluster::Sasl(c) => c.metastore_client(),
        }
    }

    fn invalidate_metastore_client(&self) -> bool {
        match self {
            ConfiguredCluster::Plain(c) => c.invalidate_metastore_client(),
            ConfiguredCluster::Sasl(c) => c.invalidate_metastore_client(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{prod_descriptor, RecordingConnector};
    use metaport_config::AuthConfig;
    use std::path::PathBuf;

    fn create_test_config(auth: AuthConfig) -> ClusterConfig {
        ClusterConfig {
            name: "prod".to_string(),
            metastore_host: None,
            metastore_port: None,
            metastore_url: Some("thrift://meta1:9083".to_string()),
            compute_host: "jt1".to_string(),
            compute_port: "8021".to_string(),
            storage_root: PathBuf::from("/data"),
            scratch_dir: PathBuf::from("/data/tmp"),
            auth,
        }
    }

    #[test]
    fn test_accessors_forward_to_descriptor() {
        let cluster = SaslCluster::new(prod_descriptor(), Arc::new(RecordingConnector::default()));

        assert_eq!(cluster.name(), "prod");
        assert_eq!(cluster.metastore_host(), "meta1");
        assert_eq!(cluster.metastore_port(), 9083);
        assert_eq!(cluster.storage_root(), Path::new("/data"));
        assert_eq!(cluster.scratch_dir(), Path::new("/data/tmp"));
        assert_eq!(cluster.compute_host(), "jt1");
        assert_eq!(cluster.compute_port(), "8021");
        assert_eq!(cluster.principal(), "hive/_HOST@EXAMPLE.COM");
        assert_eq!(cluster.token_signature(), "hive_token");
    }

    #[test]
    fn test_accessors_do_not_connect() {
        let connector = Arc::new(RecordingConnector::default());
        let cluster = PlainCluster::new(prod_descriptor(), connector.clone());

        let _ = (cluster.name(), cluster.storage_root(), cluster.metastore_port());
        assert_eq!(connector.calls(), 0);
    }

    #[test]
    fn test_configured_sasl_cluster() {
        let connector = Arc::new(RecordingConnector::default());
        let config = create_test_config(AuthConfig::Sasl {
            principal: "hive/_HOST@EXAMPLE.COM".to_string(),
            token_signature: "hive_token".to_string(),
        });

        let cluster =
            ConfiguredCluster::from_config_with_env(&config, connector.clone(), EnvConfig::new())
                .unwrap();
        assert!(cluster.is_sasl());

        let handle = cluster.metastore_client().unwrap();
        assert_eq!(handle.client().principal.as_deref(), Some("hive/_HOST@EXAMPLE.COM"));
        assert!(Rc::ptr_eq(&handle, &cluster.metastore_client().unwrap()));
        assert_eq!(connector.calls(), 1);
    }

    #[test]
    fn test_configured_plain_cluster() {
        let connector = Arc::new(RecordingConnector::default());
        let config = create_test_config(AuthConfig::None);

        let cluster =
            ConfiguredCluster::from_config_with_env(&config, connector.clone(), EnvConfig::new())
                .unwrap();
        assert!(!cluster.is_sasl());

        let handle = cluster.metastore_client().unwrap();
        assert_eq!(handle.client().principal, None);
        assert!(cluster.invalidate_metastore_client());
        cluster.metastore_client().unwrap();
        assert_eq!(connector.calls(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = create_test_config(AuthConfig::None);
        config.scratch_dir = PathBuf::from("/elsewhere");

        let result = ConfiguredCluster::from_config(&config, Arc::new(RecordingConnector::default()));
        assert!(matches!(result, Err(metaport_common::Error::Configuration(_))));
    }
}
