//! Multi-cluster configuration files.

use crate::{ClusterConfig, ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("toml") => Ok(FileFormat::Toml),
            _ => Err(ConfigError::Parse(format!("Unknown file format for {:?}", path))),
        }
    }
}

/// Every cluster a process talks to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClustersConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

impl ClustersConfig {
    /// Load and validate a cluster file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config = Self::parse(&content, format)?;
        info!("Loaded {} cluster(s) from {:?}", config.clusters.len(), path);
        Ok(config)
    }

    /// Parse and validate cluster definitions in the given format
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let config: ClustersConfig = match format {
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            FileFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            FileFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };

        config.validate_config()?;
        Ok(config)
    }

    /// Validate every cluster and require unique names
    pub fn validate_config(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for cluster in &self.clusters {
            cluster.validate_config()?;
            if !seen.insert(cluster.name.as_str()) {
                return Err(ConfigError::DuplicateCluster(cluster.name.clone()));
            }
        }
        Ok(())
    }

    /// Look up a cluster by name
    pub fn get(&self, name: &str) -> Result<&ClusterConfig> {
        self.clusters
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::NotFound(format!("cluster '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthConfig;
    use std::io::Write;

    const YAML: &str = r#"
clusters:
  - name: prod
    metastore_url: "thrift://meta1:9083"
    compute_host: jt1
    compute_port: "8021"
    storage_root: /data
    scratch_dir: /data/tmp
    auth:
      mechanism: sasl
      principal: "hive/_HOST@EXAMPLE.COM"
      token_signature: hive_token
  - name: staging
    metastore_host: meta2
    metastore_port: 9083
    storage_root: /staging
    scratch_dir: /staging/tmp
"#;

    const TOML: &str = r#"
[[clusters]]
name = "prod"
metastore_host = "meta1"
metastore_port = 9083
storage_root = "/data"
scratch_dir = "/data/tmp"

[clusters.auth]
mechanism = "sasl"
principal = "hive/_HOST@EXAMPLE.COM"
token_signature = "hive_token"
"#;

    #[test]
    fn test_parse_yaml() {
        let config = ClustersConfig::parse(YAML, FileFormat::Yaml).unwrap();
        assert_eq!(config.clusters.len(), 2);

        let prod = config.get("prod").unwrap();
        assert!(prod.auth.is_sasl());
        assert_eq!(prod.compute_port, "8021");

        let staging = config.get("staging").unwrap();
        assert_eq!(staging.auth, AuthConfig::None);
        assert_eq!(staging.metastore_endpoint().unwrap().to_string(), "thrift://meta2:9083");
    }

    #[test]
    fn test_parse_toml() {
        let config = ClustersConfig::parse(TOML, FileFormat::Toml).unwrap();
        let prod = config.get("prod").unwrap();
        assert_eq!(prod.metastore_port, Some(9083));
        assert!(prod.auth.is_sasl());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"clusters": [{
            "name": "prod",
            "metastore_url": "thrift://meta1:9083",
            "storage_root": "/data",
            "scratch_dir": "/data/tmp"
        }]}"#;
        let config = ClustersConfig::parse(json, FileFormat::Json).unwrap();
        assert_eq!(config.get("prod").unwrap().auth, AuthConfig::None);
    }

    #[test]
    fn test_duplicate_cluster_names() {
        let json = r#"{"clusters": [
            {"name": "prod", "metastore_url": "thrift://meta1:9083", "storage_root": "/a", "scratch_dir": "/a/tmp"},
            {"name": "prod", "metastore_url": "thrift://meta2:9083", "storage_root": "/b", "scratch_dir": "/b/tmp"}
        ]}"#;
        let result = ClustersConfig::parse(json, FileFormat::Json);
        assert!(matches!(result, Err(ConfigError::DuplicateCluster(name)) if name == "prod"));
    }

    #[test]
    fn test_unknown_cluster() {
        let config = ClustersConfig::parse(YAML, FileFormat::Yaml).unwrap();
        assert!(matches!(config.get("missing"), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = ClustersConfig::from_file(file.path()).unwrap();
        assert_eq!(config.clusters.len(), 2);
    }

    #[test]
    fn test_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            ClustersConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
