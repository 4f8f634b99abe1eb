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

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use podinfo_resources::pod::PodLite;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct PodResponse {
    /// All labels of the pod at query time.
    pub labels: BTreeMap<String, String>,
    /// The primary IP of the pod.
    #[serde(rename = "podIp")]
    pub pod_ip: String,
}

impl From<PodLite> for PodResponse {
    fn from(value: PodLite) -> Self {
        Self { labels: value.labels, pod_ip: value.pod_ip }
    }
}

/// The envelope of both pod endpoints.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct PodListResponse {
    pub code: u16,
    pub pods: Vec<PodResponse>,
}

impl PodListResponse {
    pub fn ok(pods: Vec<PodResponse>) -> Self {
        Self { code: StatusCode::OK.as_u16(), pods }
    }
}

impl IntoResponse for PodListResponse {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}
