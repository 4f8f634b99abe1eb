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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kube Error: {0}")]
    KubeError(#[source] kube::Error),

    #[error("Kubeconfig Error: {0}")]
    KubeconfigError(#[source] kube::config::KubeconfigError),

    #[error("Infer Config Error: {0}")]
    InferConfigError(#[source] kube::config::InferConfigError),

    #[error("Cluster Not Found: {0}")]
    ClusterNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
