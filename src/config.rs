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

use std::path::PathBuf;

/// The configuration parameters for the application.
///
/// These can either be passed on the command line, or pulled from environment variables.
/// The latter is preferred as environment variables are one of the recommended ways to
/// get configuration from Kubernetes Secrets in deployment.
///
/// For development convenience, these can also be read from a `.env` file in the working
/// directory where the application is started.
///
/// See `.env.sample` in the repository root for details.
#[derive(clap::Parser, Debug)]
pub struct Config {
    /// The Server port.
    #[clap(long, env = "PODINFO_PORT", default_value_t = 8080)]
    pub port: u16,

    /// The file listing the managed clusters and how to reach them.
    #[clap(long, env = "PODINFO_CLUSTERS", default_value = "clusters.yaml")]
    pub clusters: PathBuf,

    /// The file holding the issued API keys.
    #[clap(long, env = "PODINFO_APIKEYS", default_value = "apikeys.yaml")]
    pub apikeys: PathBuf,
}
