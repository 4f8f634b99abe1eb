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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{future, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::runtime::reflector::Store;
use kube::runtime::{reflector, watcher, WatchStreamExt};
use kube::{Api, Client};
use podinfo_common::config::ClusterConfig;
use tracing::{info, warn};

use super::error::{Error, Result};

/// How long startup waits for the pod cache of a cluster to fill.
const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// A client that talks to the API server of a cluster.
#[async_trait]
pub trait LiveClient: Send + Sync {
    /// Lists pods across all namespaces.
    async fn list_pods(&self, params: &ListParams) -> Result<Vec<Pod>>;
}

#[async_trait]
impl LiveClient for Client {
    async fn list_pods(&self, params: &ListParams) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::all(self.clone());
        let pods = api.list(params).await.map_err(Error::KubeError)?;

        Ok(pods.items)
    }
}

/// The locally cached view of a cluster.
#[derive(Clone)]
pub struct ClusterManager {
    pub name: String,
    /// Pods of all namespaces, kept current by a background reflector.
    pub indexer: Store<Pod>,
}

/// Resolves a cluster name to a live client or to its cached view.
///
/// Implementations are shared between requests and only read from.
pub trait ClusterRegistry: Send + Sync {
    /// Looks the live client of `name` up, `None` if the cluster is unknown.
    fn client(&self, name: &str) -> Option<Arc<dyn LiveClient>>;

    /// Returns the cluster manager of `name`.
    fn manager(&self, name: &str) -> Result<ClusterManager>;
}

/// The clusters this process manages.
#[derive(Clone, Default)]
pub struct Clusters {
    clients: HashMap<String, Arc<dyn LiveClient>>,
    managers: HashMap<String, ClusterManager>,
}

impl Clusters {
    /// Connects to every configured cluster and starts reflecting its pods,
    /// then waits for the initial listing of each cluster.
    pub async fn connect(configs: &[ClusterConfig]) -> Result<Self> {
        let mut clusters = Clusters::default();

        for config in configs {
            let client = client(config).await?;
            let indexer = reflect(&config.name, client.clone());
            clusters.insert(&config.name, Arc::new(client), indexer);

            info!("Connected to cluster {}", config.name);
        }

        let managers = clusters.managers.values();
        future::join_all(managers.map(|manager| synced(&manager.name, &manager.indexer, SYNC_TIMEOUT))).await;

        Ok(clusters)
    }

    pub fn insert(&mut self, name: &str, client: Arc<dyn LiveClient>, indexer: Store<Pod>) {
        self.clients.insert(name.to_string(), client);
        self.managers.insert(name.to_string(), ClusterManager { name: name.to_string(), indexer });
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.clients.keys()
    }
}

impl ClusterRegistry for Clusters {
    fn client(&self, name: &str) -> Option<Arc<dyn LiveClient>> {
        self.clients.get(name).cloned()
    }

    fn manager(&self, name: &str) -> Result<ClusterManager> {
        self.managers.get(name).cloned().ok_or_else(|| Error::ClusterNotFound(name.to_string()))
    }
}

/// Builds the client of a cluster from its kubeconfig, or infers it
/// from the environment when no kubeconfig is given.
async fn client(config: &ClusterConfig) -> Result<Client> {
    let options = KubeConfigOptions { context: config.context.clone(), ..Default::default() };

    let config = match (&config.kubeconfig, &config.context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(Error::KubeconfigError)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options).await.map_err(Error::KubeconfigError)?
        }
        (None, Some(_)) => kube::Config::from_kubeconfig(&options).await.map_err(Error::KubeconfigError)?,
        (None, None) => kube::Config::infer().await.map_err(Error::InferConfigError)?,
    };

    Client::try_from(config).map_err(Error::KubeError)
}

/// Spawns a reflector that mirrors all pods of the cluster into the returned store.
fn reflect(name: &str, client: Client) -> Store<Pod> {
    let api: Api<Pod> = Api::all(client);
    let (reader, writer) = reflector::store();

    let stream = reflector(writer, watcher(api, watcher::Config::default()).default_backoff());
    let name = name.to_string();

    tokio::spawn(async move {
        stream
            .for_each(|event| {
                if let Err(err) = event {
                    warn!("Pod watcher of cluster {} failed: {}", name, err);
                }
                future::ready(())
            })
            .await;
        warn!("Pod reflector of cluster {} exited", name);
    });

    reader
}

/// Waits until the reflector behind `indexer` delivered its first listing.
///
/// Lookups keep working past the timeout, answering from whatever
/// the cache holds so far.
async fn synced(name: &str, indexer: &Store<Pod>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, indexer.wait_until_ready()).await {
        Ok(Ok(())) => {
            info!("Pod cache of cluster {} synced with {} pods", name, indexer.state().len());
            true
        }
        Ok(Err(err)) => {
            warn!("Pod cache of cluster {} will never sync: {}", name, err);
            false
        }
        Err(_) => {
            warn!("Pod cache of cluster {} not synced after {:?}, serving it partially", name, timeout);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;

    struct EmptyClient;

    #[async_trait]
    impl LiveClient for EmptyClient {
        async fn list_pods(&self, _params: &ListParams) -> Result<Vec<Pod>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_registry_lookup() {
        let (indexer, _writer) = reflector::store();
        let mut clusters = Clusters::default();
        clusters.insert("c1", Arc::new(EmptyClient), indexer);

        assert!(clusters.client("c1").is_some());
        assert!(clusters.client("ghost").is_none());

        assert_eq!(clusters.manager("c1").unwrap().name, "c1");
        assert!(matches!(clusters.manager("ghost"), Err(Error::ClusterNotFound(name)) if name == "ghost"));

        assert_eq!(clusters.names().collect::<Vec<_>>(), vec!["c1"]);
    }

    #[tokio::test]
    async fn test_synced_after_first_event() {
        let (indexer, mut writer) = reflector::store::<Pod>();
        let pod = Pod {
            metadata: ObjectMeta { name: Some("p1".into()), namespace: Some("default".into()), ..Default::default() },
            ..Default::default()
        };
        writer.apply_watcher_event(&watcher::Event::Restarted(vec![pod]));

        assert!(synced("c1", &indexer, Duration::from_secs(1)).await);
        assert_eq!(indexer.state().len(), 1);
    }

    #[tokio::test]
    async fn test_synced_gives_up() {
        let (indexer, _writer) = reflector::store::<Pod>();
        assert!(!synced("c1", &indexer, Duration::from_millis(10)).await);

        let (indexer, writer) = reflector::store::<Pod>();
        drop(writer);
        assert!(!synced("c1", &indexer, Duration::from_secs(1)).await);
    }
}
