// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! # Token acquisition and caching.
//!
//! The identity service issues project-scoped tokens through a password
//! grant. The bearer token travels in the `X-Subject-Token` response header;
//! the response body carries the token metadata, including its expiry. The
//! last issued token is kept in an injectable [`TokenCache`] and reused until
//! it expires.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::compute::ComputeProvider;
use crate::compute::error::ComputeProviderError;
use crate::compute::types::{AuthResponse, TokenMetadata};

/// Header carrying the issued bearer token.
pub(crate) const X_SUBJECT_TOKEN: &str = "x-subject-token";

/// An issued token together with its metadata.
#[derive(Clone, Debug)]
pub struct CachedToken {
    /// Token metadata from the identity service response body.
    pub metadata: TokenMetadata,
    /// Expiry of the token.
    pub expires_at: DateTime<Utc>,
    /// The bearer token itself.
    pub subject_token: SecretString,
}

/// Slot caching the last issued token.
///
/// The slot is shared by cloning; each write replaces the content as a whole,
/// so racing cache misses at worst issue redundant authentications — the last
/// write wins. The lock is never held across a network call.
#[derive(Clone, Debug, Default)]
pub struct TokenCache {
    slot: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenCache {
    /// Return the cached bearer token while its expiry is still ahead of
    /// `now`.
    pub async fn get_valid(&self, now: DateTime<Utc>) -> Option<SecretString> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| token.expires_at > now)
            .map(|token| token.subject_token.clone())
    }

    /// Replace the slot content.
    pub async fn store(&self, token: CachedToken) {
        *self.slot.write().await = Some(token);
    }

    /// Snapshot of the current slot content.
    pub async fn peek(&self) -> Option<CachedToken> {
        self.slot.read().await.clone()
    }
}

impl ComputeProvider {
    /// Issue a password grant to the identity service.
    ///
    /// Expects HTTP 201; the cache is left untouched on any failure.
    #[tracing::instrument(name = "compute.password_grant", skip(self), err)]
    pub(super) async fn password_grant(&self) -> Result<CachedToken, ComputeProviderError> {
        info!("Fetching a token from the identity service");
        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": self.config.os_username,
                            "domain": {"name": self.config.os_user_domain_name},
                            "password": self.config.os_password.expose_secret(),
                        },
                    },
                },
                "scope": {
                    "project": {
                        "name": self.config.os_project_name,
                        "domain": {"id": self.config.os_project_domain_id},
                    },
                },
            },
        });

        let response = self
            .client
            .post(self.keystone_url("v3/auth/tokens"))
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(ComputeProviderError::Authentication {
                status: response.status(),
            });
        }

        let subject_token = response
            .headers()
            .get(X_SUBJECT_TOKEN)
            .and_then(|value| value.to_str().ok())
            .map(|value| SecretString::from(value.to_string()))
            .ok_or(ComputeProviderError::SubjectTokenMissing)?;
        let metadata = response.json::<AuthResponse>().await?.token;

        Ok(CachedToken {
            expires_at: metadata.expires_at,
            metadata,
            subject_token,
        })
    }
}
