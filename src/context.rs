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

use podinfo_common::apikey::KeyStore;
use podinfo_common::config::ClustersConfig;
use podinfo_resources::cluster::{ClusterRegistry, Clusters};
use tracing::info;

use crate::config::Config;

/// The core type through which handler functions can access common API state.
///
/// This can be accessed by adding a parameter `State<Arc<Context>>` to a handler
/// function's parameters.
pub struct Context {
    pub config: Config,
    pub clusters: Arc<dyn ClusterRegistry>,
    pub keys: KeyStore,
}

impl Context {
    pub async fn new(config: Config) -> anyhow::Result<Context> {
        let keys = KeyStore::load(&config.apikeys)?;
        let clusters = ClustersConfig::load(&config.clusters)?;
        let clusters = Clusters::connect(&clusters.clusters).await?;

        let names: Vec<&String> = clusters.names().collect();
        info!("Managing {} clusters: {:?}, with {} APIKeys", names.len(), names, keys.len());

        Ok(Context { config, clusters: Arc::new(clusters), keys })
    }
}
