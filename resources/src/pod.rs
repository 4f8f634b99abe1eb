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

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::runtime::reflector::Store;
use kube::ResourceExt;
use tracing::debug;

use super::cluster::LiveClient;
use super::error::Result;

/// The labels and primary IP of a pod.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PodLite {
    pub labels: BTreeMap<String, String>,
    pub pod_ip: String,
}

impl From<&Pod> for PodLite {
    fn from(pod: &Pod) -> Self {
        Self { labels: pod.labels().clone(), pod_ip: pod_ip(pod).unwrap_or_default().to_string() }
    }
}

/// Returns the primary IP reported by the pod status, if any was allocated.
pub fn pod_ip(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|status| status.pod_ip.as_deref()).filter(|ip| !ip.is_empty())
}

/// Lists the pods of all namespaces matching `selector`, evaluated by the API server.
/// An empty selector matches every pod.
pub async fn list_by_label_selector(client: &dyn LiveClient, selector: &str) -> Result<Vec<PodLite>> {
    let mut params = ListParams::default();
    if !selector.is_empty() {
        params = params.labels(selector);
    }

    let pods = client.list_pods(&params).await?;
    debug!("Found {} pods with label selector {:?}", pods.len(), selector);

    Ok(pods.iter().map(PodLite::from).collect())
}

/// Reads pods from the local cache.
///
/// An empty `namespace` reads all namespaces, and a `selector` of `None`
/// disables label filtering. Otherwise every label in `selector` must be
/// present on the pod with the same value.
pub fn list_from_indexer(
    indexer: &Store<Pod>,
    namespace: &str,
    selector: Option<&BTreeMap<String, String>>,
) -> Vec<Arc<Pod>> {
    indexer
        .state()
        .into_iter()
        .filter(|pod| namespace.is_empty() || pod.namespace().as_deref() == Some(namespace))
        .filter(|pod| selector.map_or(true, |selector| matches(selector, pod.labels())))
        .collect()
}

fn matches(selector: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    selector.iter().all(|(key, value)| labels.get(key) == Some(value))
}
