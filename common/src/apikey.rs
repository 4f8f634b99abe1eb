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

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// The scope of an API key.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyType {
    /// Bound to a single application.
    App,
    /// Bound to a single namespace.
    Namespace,
    /// Visible across all applications managed by the platform.
    Global,
}

/// The actions an API key may be granted.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    GetPodInfo,
    GetPodInfoFromIp,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetPodInfo => "get_pod_info",
            Action::GetPodInfoFromIp => "get_pod_info_from_ip",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ApiKey {
    pub name: String,
    pub token: String,
    #[serde(rename = "type")]
    pub kind: ApiKeyType,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ApiKey {
    pub fn is_global(&self) -> bool {
        self.kind == ApiKeyType::Global
    }

    /// Returns true if this key was granted the given action.
    pub fn permits(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ApiKeysConfig {
    #[serde(default)]
    apikeys: Vec<ApiKey>,
}

/// The issued API keys, indexed by token.
#[derive(Clone, Debug, Default)]
pub struct KeyStore {
    keys: HashMap<String, ApiKey>,
}

impl KeyStore {
    pub fn new(keys: Vec<ApiKey>) -> Result<Self> {
        let mut store = HashMap::with_capacity(keys.len());
        for key in keys {
            if key.token.is_empty() {
                return Err(Error::EmptyToken(key.name));
            }
            if store.contains_key(&key.token) {
                return Err(Error::DuplicatedToken(key.name));
            }
            store.insert(key.token.clone(), key);
        }

        Ok(KeyStore { keys: store })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|source| Error::ReadError { path: path.to_path_buf(), source })?;
        let config: ApiKeysConfig =
            serde_yaml::from_str(&content).map_err(|source| Error::ParseError { path: path.to_path_buf(), source })?;

        let store = Self::new(config.apikeys)?;
        debug!("Loaded {} APIKeys from {}", store.len(), path.display());

        Ok(store)
    }

    pub fn get(&self, token: &str) -> Option<&ApiKey> {
        self.keys.get(token)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
