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

//! In-memory clusters and keys for exercising the HTTP surface.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use axum::Router;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::ListParams;
use kube::core::ErrorResponse;
use kube::runtime::reflector::Store;
use kube::runtime::{reflector, watcher};
use kube::ResourceExt;
use podinfo_common::apikey::{Action, ApiKey, ApiKeyType, KeyStore};
use podinfo_resources::cluster::{Clusters, LiveClient};
use podinfo_resources::error::{Error, Result};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::context::Context;
use crate::routes;

pub const GLOBAL_TOKEN: &str = "global-token";
pub const APP_TOKEN: &str = "app-token";
pub const LIMITED_TOKEN: &str = "limited-token";

/// The message of the upstream failure, which must never reach callers.
pub const UPSTREAM_MESSAGE: &str = "dial tcp 10.96.0.1:443: connect: connection refused";

/// A live client that evaluates equality selectors over canned pods.
pub struct FakeClient {
    pods: Vec<Pod>,
    fail: bool,
}

impl FakeClient {
    pub fn new(pods: Vec<Pod>) -> Self {
        Self { pods, fail: false }
    }

    pub fn failing() -> Self {
        Self { pods: vec![], fail: true }
    }
}

#[async_trait]
impl LiveClient for FakeClient {
    async fn list_pods(&self, params: &ListParams) -> Result<Vec<Pod>> {
        if self.fail {
            return Err(Error::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".into(),
                message: UPSTREAM_MESSAGE.into(),
                reason: "ServiceUnavailable".into(),
                code: 503,
            })));
        }

        let selector = params.label_selector.clone().unwrap_or_default();
        let requirements: Vec<(&str, &str)> =
            selector.split(',').filter_map(|requirement| requirement.split_once('=')).collect();

        Ok(self
            .pods
            .iter()
            .filter(|pod| {
                requirements.iter().all(|(key, value)| pod.labels().get(*key).map(String::as_str) == Some(*value))
            })
            .cloned()
            .collect())
    }
}

pub fn pod(name: &str, labels: &[(&str, &str)], ip: Option<&str>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.into()),
            namespace: Some("default".into()),
            labels: (!labels.is_empty()).then(|| labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
            ..Default::default()
        },
        status: Some(PodStatus { pod_ip: ip.map(Into::into), ..Default::default() }),
        ..Default::default()
    }
}

pub fn indexer(pods: Vec<Pod>) -> Store<Pod> {
    let (reader, mut writer) = reflector::store();
    for pod in pods {
        writer.apply_watcher_event(&watcher::Event::Applied(pod));
    }
    reader
}

fn key(token: &str, kind: ApiKeyType, actions: Vec<Action>) -> ApiKey {
    ApiKey { name: token.into(), token: token.into(), kind, actions }
}

/// Builds a context serving the given clusters, with a global key, an
/// application key and a global key only granted `get_pod_info`.
pub fn context(clusters: Clusters) -> Arc<Context> {
    let all = vec![Action::GetPodInfo, Action::GetPodInfoFromIp];
    let keys = KeyStore::new(vec![
        key(GLOBAL_TOKEN, ApiKeyType::Global, all.clone()),
        key(APP_TOKEN, ApiKeyType::App, all),
        key(LIMITED_TOKEN, ApiKeyType::Global, vec![Action::GetPodInfo]),
    ])
    .unwrap();

    let config = Config { port: 0, clusters: PathBuf::new(), apikeys: PathBuf::new() };

    Arc::new(Context { config, clusters: Arc::new(clusters), keys })
}

/// Sends a GET request through the router, returning the status and the body,
/// parsed as JSON when possible.
pub async fn get(ctx: Arc<Context>, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }

    let app: Router = routes::build().with_state(ctx);
    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();

    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

    let body = serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()));

    (status, body)
}
