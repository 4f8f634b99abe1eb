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

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use podinfo_common::apikey::Action;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("Invalid APIKey!")]
    InvalidApiKey,
    #[error("Permission denied for action {0}!")]
    PermissionDenied(Action),
    #[error("You can only use global APIKey in this action!")]
    GlobalKeyRequired,
    #[error("Invalid cluster parameter:must required!")]
    MissingCluster,
    #[error("Invalid cluster parameter:not exist!")]
    ClusterNotExist,
    #[error("Maybe a problematic k8s cluster({0})!")]
    ProblematicCluster(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::UNAUTHORIZED,
            Self::GlobalKeyRequired => StatusCode::UNAUTHORIZED,
            Self::MissingCluster => StatusCode::BAD_REQUEST,
            Self::ClusterNotExist => StatusCode::BAD_REQUEST,
            Self::ProblematicCluster(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The body of every failed request.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Human readable messages.
    pub errors: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorResponse { code: status.as_u16(), errors: vec![self.to_string()] };
        (status, Json(body)).into_response()
    }
}
