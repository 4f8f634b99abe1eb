// Copyright (c) The Podinfo Authors. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// The list of managed clusters, usually read from `clusters.yaml`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClustersConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

/// How to reach a single managed cluster.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClusterConfig {
    /// The short logical name used by callers in the `cluster` parameter.
    pub name: String,
    /// Path of the kubeconfig file; the client configuration is inferred
    /// from the environment when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
    /// The kubeconfig context to use, defaults to the current context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ClustersConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|source| Error::ReadError { path: path.to_path_buf(), source })?;
        let config: ClustersConfig =
            serde_yaml::from_str(&content).map_err(|source| Error::ParseError { path: path.to_path_buf(), source })?;

        config.validate()?;
        debug!("Loaded {} clusters from {}", config.clusters.len(), path.display());

        Ok(config)
    }

    /// Cluster names must be non-empty and unique.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for cluster in &self.clusters {
            if cluster.name.is_empty() {
                return Err(Error::EmptyClusterName);
            }
            if !names.insert(cluster.name.as_str()) {
                return Err(Error::DuplicatedCluster(cluster.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clusters() {
        let yaml = r#"
clusters:
  - name: c1
    kubeconfig: /etc/kube/c1.yaml
    context: admin@c1
  - name: c2
"#;
        let config: ClustersConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.clusters.len(), 2);
        assert_eq!(config.clusters[0].kubeconfig, Some(PathBuf::from("/etc/kube/c1.yaml")));
        assert_eq!(config.clusters[0].context.as_deref(), Some("admin@c1"));
        assert_eq!(config.clusters[1].kubeconfig, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let config = ClustersConfig { clusters: vec![ClusterConfig::default()] };
        assert!(matches!(config.validate(), Err(Error::EmptyClusterName)));
    }

    #[test]
    fn test_validate_rejects_duplicated_name() {
        let cluster = ClusterConfig { name: "c1".into(), ..Default::default() };
        let config = ClustersConfig { clusters: vec![cluster.clone(), cluster] };
        assert!(matches!(config.validate(), Err(Error::DuplicatedCluster(name)) if name == "c1"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClustersConfig::load(Path::new("/nonexistent/clusters.yaml"));
        assert!(matches!(result, Err(Error::ReadError { .. })));
    }
}
