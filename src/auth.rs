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

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt};
use podinfo_common::apikey::{Action, ApiKey};

use crate::context::Context;
use crate::errors::ApiError;

/// The API key the caller authenticated with.
///
/// The token is read from an `Authorization: Bearer` header, falling back
/// to the `apikey` query parameter.
#[derive(Clone, Debug)]
pub struct Credential(pub ApiKey);

impl Credential {
    /// Fails unless the key was granted `action`.
    pub fn checkout_route_permission(&self, action: Action) -> Result<(), ApiError> {
        if self.0.permits(action) {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied(action))
        }
    }

    pub fn is_global(&self) -> bool {
        self.0.is_global()
    }
}

#[async_trait]
impl FromRequestParts<Arc<Context>> for Credential {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, ctx: &Arc<Context>) -> Result<Self, Self::Rejection> {
        let token = bearer(parts).or_else(|| query(parts)).ok_or(ApiError::InvalidApiKey)?;
        let key = ctx.keys.get(&token).ok_or(ApiError::InvalidApiKey)?;

        Ok(Credential(key.clone()))
    }
}

fn bearer(parts: &Parts) -> Option<String> {
    parts.headers.typed_get::<Authorization<Bearer>>().map(|auth| auth.token().to_string())
}

fn query(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "apikey")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use podinfo_common::apikey::ApiKeyType;

    use super::*;

    fn parts(uri: &str, authorization: Option<&str>) -> Parts {
        let mut request = Request::builder().uri(uri);
        if let Some(value) = authorization {
            request = request.header("authorization", value);
        }
        request.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_from_bearer() {
        let request = parts("/get_pod_info?apikey=other", Some("Bearer s3cr3t"));
        assert_eq!(bearer(&request).as_deref(), Some("s3cr3t"));
    }

    #[test]
    fn test_token_from_query() {
        let request = parts("/get_pod_info?cluster=c1&apikey=s3cr3t", None);
        assert_eq!(bearer(&request), None);
        assert_eq!(query(&request).as_deref(), Some("s3cr3t"));

        let request = parts("/get_pod_info?cluster=c1", None);
        assert_eq!(query(&request), None);
    }

    #[test]
    fn test_checkout_route_permission() {
        let credential = Credential(ApiKey {
            name: "ops".into(),
            token: "s3cr3t".into(),
            kind: ApiKeyType::Global,
            actions: vec![Action::GetPodInfo],
        });

        assert!(credential.checkout_route_permission(Action::GetPodInfo).is_ok());
        assert_eq!(
            credential.checkout_route_permission(Action::GetPodInfoFromIp),
            Err(ApiError::PermissionDenied(Action::GetPodInfoFromIp))
        );
    }
}
