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

use axum::extract::{RawQuery, State};
use axum::response::IntoResponse;

use crate::auth::Credential;
use crate::context::Context;
use crate::errors::ApiError;
use crate::requests::pod::{PodInfoFromIpParams, PodInfoParams};
use crate::services::pod::PodService;

// The Pods Service Handlers.
// Both require a global APIKey, as their filters span every application of the cluster.

/// Lists the pods of a cluster matching a label selector, with their labels and IP.
#[utoipa::path(
    get, path = "/get_pod_info",
    params(PodInfoParams),
    responses(
        (status = 200, description = "The matching pods", body = PodListResponse),
        (status = 400, description = "The cluster is missing or unknown", body = ErrorResponse),
        (status = 401, description = "The APIKey is invalid, not permitted or not global", body = ErrorResponse),
        (status = 500, description = "The cluster failed to list pods", body = ErrorResponse),
    ),
    security(("apikey" = [])),
    tag = "Pods"
)]
pub async fn get_pod_info(
    State(ctx): State<Arc<Context>>,
    credential: Credential,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let params = PodInfoParams::from_query(query.as_deref());
    PodService::list_by_label_selector(ctx, &credential, params).await
}

/// Looks the pods of a cluster up by their IPs, with their labels and IP.
#[utoipa::path(
    get, path = "/get_pod_info_from_ip",
    params(PodInfoFromIpParams),
    responses(
        (status = 200, description = "The pods holding one of the IPs", body = PodListResponse),
        (status = 400, description = "The cluster is missing or unknown", body = ErrorResponse),
        (status = 401, description = "The APIKey is invalid, not permitted or not global", body = ErrorResponse),
    ),
    security(("apikey" = [])),
    tag = "Pods"
)]
pub async fn get_pod_info_from_ip(
    State(ctx): State<Arc<Context>>,
    credential: Credential,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let params = PodInfoFromIpParams::from_query(query.as_deref());
    PodService::list_by_ips(ctx, &credential, params)
}
