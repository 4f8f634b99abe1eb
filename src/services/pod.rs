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

use std::sync::Arc;

use podinfo_common::apikey::Action;
use podinfo_resources::cluster::ClusterRegistry;
use podinfo_resources::pod::{self, PodLite};
use tracing::{debug, error};

use crate::auth::Credential;
use crate::context::Context;
use crate::errors::ApiError;
use crate::requests::pod::{PodInfoFromIpParams, PodInfoParams};
use crate::responses::pod::{PodListResponse, PodResponse};
use crate::services::Result;

/// A request that passed the checks shared by all pod queries.
struct Prepared<T> {
    cluster: String,
    target: T,
}

/// Runs the preamble of a pod query in order: route permission, key scope,
/// the `cluster` parameter, then resolution of the cluster with `resolve`.
fn prepare<T>(
    credential: &Credential,
    action: Action,
    cluster: Option<&str>,
    resolve: impl FnOnce(&str) -> Option<T>,
) -> Result<Prepared<T>> {
    credential.checkout_route_permission(action)?;

    // Both queries filter across every application in the cluster, which
    // can not be scoped to the owner of an application key.
    if !credential.is_global() {
        return Err(ApiError::GlobalKeyRequired);
    }

    let cluster = cluster.filter(|name| !name.is_empty()).ok_or(ApiError::MissingCluster)?;
    let target = resolve(cluster).ok_or(ApiError::ClusterNotExist)?;

    Ok(Prepared { cluster: cluster.to_string(), target })
}

pub struct PodService;

impl PodService {
    /// Lists the pods matching a label selector, asking the cluster's API server.
    pub async fn list_by_label_selector(
        ctx: Arc<Context>,
        credential: &Credential,
        params: PodInfoParams,
    ) -> Result<PodListResponse> {
        let registry: &dyn ClusterRegistry = ctx.clusters.as_ref();
        let Prepared { cluster, target: client } =
            prepare(credential, Action::GetPodInfo, params.cluster.as_deref(), |name| registry.client(name))?;

        let selector = params.label_selector.unwrap_or_default();
        let pods = pod::list_by_label_selector(client.as_ref(), &selector).await.map_err(|err| {
            error!("Failed to list pods of cluster {} with selector {:?}: {}", cluster, selector, err);
            ApiError::ProblematicCluster(cluster.clone())
        })?;

        Ok(PodListResponse::ok(pods.into_iter().map(PodResponse::from).collect()))
    }

    /// Looks pods up by their IPs in the local cache of the cluster.
    pub fn list_by_ips(ctx: Arc<Context>, credential: &Credential, params: PodInfoFromIpParams) -> Result<PodListResponse> {
        let registry: &dyn ClusterRegistry = ctx.clusters.as_ref();
        let Prepared { cluster, target: manager } =
            prepare(credential, Action::GetPodInfoFromIp, params.cluster.as_deref(), |name| {
                registry.manager(name).ok()
            })?;

        let ips = params.ip_set();
        let pods: Vec<PodResponse> = pod::list_from_indexer(&manager.indexer, "", None)
            .iter()
            .filter(|item| pod::pod_ip(item).is_some_and(|ip| ips.contains(ip)))
            .map(|item| PodResponse::from(PodLite::from(item.as_ref())))
            .collect();
        debug!("Found {} pods of {} IPs in cluster {}", pods.len(), ips.len(), cluster);

        Ok(PodListResponse::ok(pods))
    }
}

#[cfg(test)]
mod tests {
    use podinfo_common::apikey::{ApiKey, ApiKeyType};

    use super::*;

    fn credential(kind: ApiKeyType, actions: Vec<Action>) -> Credential {
        Credential(ApiKey { name: "test".into(), token: "test".into(), kind, actions })
    }

    fn resolve(name: &str) -> Option<String> {
        (name == "c1").then(|| format!("client of {}", name))
    }

    #[test]
    fn test_prepare_ready() {
        let credential = credential(ApiKeyType::Global, vec![Action::GetPodInfo]);

        let prepared = prepare(&credential, Action::GetPodInfo, Some("c1"), resolve).unwrap();

        assert_eq!(prepared.cluster, "c1");
        assert_eq!(prepared.target, "client of c1");
    }

    #[test]
    fn test_prepare_checks_permission_first() {
        let credential = credential(ApiKeyType::App, vec![]);

        let result = prepare(&credential, Action::GetPodInfo, None, resolve);

        assert_eq!(result.err(), Some(ApiError::PermissionDenied(Action::GetPodInfo)));
    }

    #[test]
    fn test_prepare_requires_global_key_before_resolving() {
        let credential = credential(ApiKeyType::Namespace, vec![Action::GetPodInfo]);

        let result = prepare(&credential, Action::GetPodInfo, Some("c1"), |_| -> Option<()> {
            panic!("the cluster must not be resolved for a non-global key")
        });

        assert_eq!(result.err(), Some(ApiError::GlobalKeyRequired));
    }

    #[test]
    fn test_prepare_requires_cluster() {
        let credential = credential(ApiKeyType::Global, vec![Action::GetPodInfo]);

        let missing = prepare(&credential, Action::GetPodInfo, None, resolve);
        assert_eq!(missing.err(), Some(ApiError::MissingCluster));

        let empty = prepare(&credential, Action::GetPodInfo, Some(""), resolve);
        assert_eq!(empty.err(), Some(ApiError::MissingCluster));

        let unknown = prepare(&credential, Action::GetPodInfo, Some("ghost"), resolve);
        assert_eq!(unknown.err(), Some(ApiError::ClusterNotExist));
    }
}
