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

use std::collections::HashSet;

use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PodInfoParams {
    /// The name of the cluster to query.
    pub cluster: Option<String>,
    /// A Kubernetes label selector, e.g. `app=web,tier!=cache`.
    #[param(required = true)]
    pub label_selector: Option<String>,
}

impl PodInfoParams {
    /// Reads the parameters from a raw query string, keeping the first
    /// value of a repeated key.
    pub fn from_query(query: Option<&str>) -> Self {
        Self { cluster: first(query, "cluster"), label_selector: first(query, "labelSelector") }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct PodInfoFromIpParams {
    /// The name of the cluster to query.
    pub cluster: Option<String>,
    /// A comma-separated list of pod IPs.
    pub ips: Option<String>,
}

impl PodInfoFromIpParams {
    /// Reads the parameters from a raw query string, keeping the first
    /// value of a repeated key.
    pub fn from_query(query: Option<&str>) -> Self {
        Self { cluster: first(query, "cluster"), ips: first(query, "ips") }
    }

    pub fn ip_set(&self) -> IpSet {
        IpSet::from(self.ips.as_deref().unwrap_or_default())
    }
}

fn first(query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes()).find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
}

/// The IPs to look pods up by, compared by exact string match.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IpSet(HashSet<String>);

impl IpSet {
    pub fn contains(&self, ip: &str) -> bool {
        self.0.contains(ip)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for IpSet {
    fn from(ips: &str) -> Self {
        IpSet(ips.split(',').map(str::to_string).collect())
    }
}
