//! Named clusters built from a cluster file.

use crate::cluster::ConfiguredCluster;
use crate::connector::MetastoreConnector;
use metaport_common::{Error, Result};
use metaport_config::{ClustersConfig, EnvConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// One cluster, and so one client cache, per configured cluster name
pub struct ClusterRegistry<K: MetastoreConnector> {
    clusters: HashMap<String, Arc<ConfiguredCluster<K>>>,
}

impl<K: MetastoreConnector> ClusterRegistry<K> {
    pub fn from_config(config: &ClustersConfig, connector: Arc<K>) -> Result<Self> {
        Self::build(config, connector, None)
    }

    /// Build every cluster with the same fixed connector settings
    pub fn from_config_with_env(
        config: &ClustersConfig,
        connector: Arc<K>,
        env: EnvConfig,
    ) -> Result<Self> {
        Self::build(config, connector, Some(env))
    }

    fn build(config: &ClustersConfig, connector: Arc<K>, env: Option<EnvConfig>) -> Result<Self> {
        config.validate_config()?;

        let mut clusters = HashMap::with_capacity(config.clusters.len());
        for cluster_config in &config.clusters {
            let cluster = match &env {
                Some(env) => ConfiguredCluster::from_config_with_env(
                    cluster_config,
                    connector.clone(),
                    env.clone(),
                )?,
                None => ConfiguredCluster::from_config(cluster_config, connector.clone())?,
            };
            clusters.insert(cluster_config.name.clone(), Arc::new(cluster));
        }

        info!("Registered {} cluster(s)", clusters.len());
        Ok(Self { clusters })
    }

    pub fn get(&self, name: &str) -> Result<Arc<ConfiguredCluster<K>>> {
        self.clusters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("cluster '{}'", name)))
    }

    /// Registered cluster names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clusters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
