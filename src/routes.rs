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

use axum::routing::get;
use axum::Router;

use crate::context::Context;
use crate::handlers;

pub fn build() -> Router<Arc<Context>> {
    Router::new()
        .route("/health_check", get(handlers::health_check::health_check))
        //
        // pods
        .route("/get_pod_info", get(handlers::pod::get_pod_info))
        .route("/get_pod_info_from_ip", get(handlers::pod::get_pod_info_from_ip))
}
