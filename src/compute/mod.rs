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

//! # Compute provider
//!
//! Wrapper around the upstream cloud APIs. Every resource operation is a
//! single outbound HTTP call against the compute service, authenticated with
//! a bearer token obtained from the identity service and cached until expiry
//! (see [`auth`]). Responses are decoded into the typed records of
//! [`types`]; an unexpected upstream status becomes a
//! [`ComputeProviderError::RemoteCall`] carrying that status.
//!
//! Operations are deliberately not idempotent — a retried create call makes a
//! second remote resource.

use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::mock;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

pub mod auth;
pub mod error;
pub mod types;

use crate::compute::auth::TokenCache;
use crate::compute::error::ComputeProviderError;
use crate::compute::types::*;
use crate::config::Config;

/// Header carrying the bearer token on compute service calls.
pub(crate) const X_AUTH_TOKEN: &str = "x-auth-token";

/// Client of the upstream compute and identity services.
#[derive(Clone, Debug)]
pub struct ComputeProvider {
    pub(crate) config: Config,
    pub(crate) client: Client,
    token_cache: TokenCache,
}

/// Operations the gateway performs against the upstream cloud.
#[async_trait]
pub trait ComputeApi: Send + Sync + Clone {
    /// Return a valid bearer token, authenticating when the cached one is
    /// absent or expired.
    async fn authenticate(&self) -> Result<SecretString, ComputeProviderError>;

    /// Create a security group.
    async fn create_security_group(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<SecurityGroup, ComputeProviderError>;

    /// Create a rule inside an existing security group.
    async fn create_security_group_rule(
        &self,
        rule: SecurityGroupRuleParams,
    ) -> Result<SecurityGroupRule, ComputeProviderError>;

    /// List the machine images visible to the project.
    async fn list_images(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError>;

    /// Get a machine image by id.
    async fn get_image_by_id<'a>(
        &self,
        image_id: &'a str,
    ) -> Result<MachineImage, ComputeProviderError>;

    /// Create a server and return its id.
    async fn create_instance(
        &self,
        params: ServerCreateParams,
    ) -> Result<String, ComputeProviderError>;

    /// List the servers of the project.
    async fn list_instances(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError>;

    /// Get the full detail record of one server.
    async fn get_instance_by_id<'a>(
        &self,
        server_id: &'a str,
    ) -> Result<Server, ComputeProviderError>;

    /// List the networks of the project.
    async fn list_networks(&self) -> Result<Vec<Network>, ComputeProviderError>;

    /// Get a network by id; `None` when the id does not resolve.
    async fn get_network<'a>(
        &self,
        network_id: &'a str,
    ) -> Result<Option<Network>, ComputeProviderError>;

    /// List the flavors of the project.
    async fn list_flavors(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError>;

    /// Get a flavor by id; `None` when the id does not resolve.
    async fn get_flavor<'a>(
        &self,
        flavor_id: &'a str,
    ) -> Result<Option<Flavor>, ComputeProviderError>;
}

#[cfg(test)]
mock! {
    pub ComputeProvider {
        pub fn new(config: &Config) -> Result<Self, ComputeProviderError>;
    }

    #[async_trait]
    impl ComputeApi for ComputeProvider {
        async fn authenticate(&self) -> Result<SecretString, ComputeProviderError>;

        async fn create_security_group(
            &self,
            name: String,
            description: Option<String>,
        ) -> Result<SecurityGroup, ComputeProviderError>;

        async fn create_security_group_rule(
            &self,
            rule: SecurityGroupRuleParams,
        ) -> Result<SecurityGroupRule, ComputeProviderError>;

        async fn list_images(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError>;

        async fn get_image_by_id<'a>(
            &self,
            image_id: &'a str,
        ) -> Result<MachineImage, ComputeProviderError>;

        async fn create_instance(
            &self,
            params: ServerCreateParams,
        ) -> Result<String, ComputeProviderError>;

        async fn list_instances(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError>;

        async fn get_instance_by_id<'a>(
            &self,
            server_id: &'a str,
        ) -> Result<Server, ComputeProviderError>;

        async fn list_networks(&self) -> Result<Vec<Network>, ComputeProviderError>;

        async fn get_network<'a>(
            &self,
            network_id: &'a str,
        ) -> Result<Option<Network>, ComputeProviderError>;

        async fn list_flavors(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError>;

        async fn get_flavor<'a>(
            &self,
            flavor_id: &'a str,
        ) -> Result<Option<Flavor>, ComputeProviderError>;
    }

    impl Clone for ComputeProvider {
        fn clone(&self) -> Self;
    }
}

impl ComputeProvider {
    pub fn new(config: &Config) -> Result<Self, ComputeProviderError> {
        let client = Client::builder()
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .gzip(true)
            .build()?;
        Ok(Self {
            config: config.clone(),
            client,
            token_cache: TokenCache::default(),
        })
    }

    /// The token cache of this provider.
    pub fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    /// Replace the token cache, e.g. with a shared or pre-seeded one.
    #[must_use]
    pub fn with_token_cache(mut self, token_cache: TokenCache) -> Self {
        self.token_cache = token_cache;
        self
    }

    fn keystone_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.keystone_base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    fn nova_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.nova_base_url.as_str().trim_end_matches('/'),
            path
        )
    }
}

#[async_trait]
impl ComputeApi for ComputeProvider {
    #[tracing::instrument(name = "compute.authenticate", level = "debug", skip(self))]
    async fn authenticate(&self) -> Result<SecretString, ComputeProviderError> {
        if let Some(token) = self.token_cache.get_valid(Utc::now()).await {
            debug!("Reusing the cached token");
            return Ok(token);
        }
        let issued = self.password_grant().await?;
        let subject_token = issued.subject_token.clone();
        self.token_cache.store(issued).await;
        Ok(subject_token)
    }

    #[tracing::instrument(name = "compute.create_security_group", skip(self), err)]
    async fn create_security_group(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<SecurityGroup, ComputeProviderError> {
        let token = self.authenticate().await?;
        let mut security_group = serde_json::Map::new();
        security_group.insert("name".into(), json!(name));
        if let Some(description) = description {
            security_group.insert("description".into(), json!(description));
        }
        let response = self
            .client
            .post(self.nova_url("os-security-groups"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .json(&json!({"security_group": security_group}))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response
                .json::<SecurityGroupContainer>()
                .await?
                .security_group),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "create security group",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.create_security_group_rule", skip(self), err)]
    async fn create_security_group_rule(
        &self,
        rule: SecurityGroupRuleParams,
    ) -> Result<SecurityGroupRule, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .post(self.nova_url("os-security-group-rules"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .json(&json!({
                "security_group_rule": {
                    "parent_group_id": rule.parent_group_id,
                    "ip_protocol": rule.ip_protocol,
                    "from_port": rule.port_range.0,
                    "to_port": rule.port_range.1,
                    "cidr": rule.cidr,
                },
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response
                .json::<SecurityGroupRuleContainer>()
                .await?
                .security_group_rule),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "create security group rule",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.list_images", skip(self), err)]
    async fn list_images(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url("images"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<ImageListResponse>().await?.images),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "list machine images",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.get_image_by_id", skip(self), err)]
    async fn get_image_by_id<'a>(
        &self,
        image_id: &'a str,
    ) -> Result<MachineImage, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url(&format!("images/{image_id}")))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<ImageContainer>().await?.image),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "fetch machine image",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.create_instance", skip(self), err)]
    async fn create_instance(
        &self,
        params: ServerCreateParams,
    ) -> Result<String, ComputeProviderError> {
        if params.network_id.is_some() && params.fixed_ip.is_some() {
            return Err(ComputeProviderError::InvalidArgument(
                "only one of network_id or fixed_ip can be provided".into(),
            ));
        }

        let token = self.authenticate().await?;
        let mut server = serde_json::Map::new();
        server.insert("flavorRef".into(), json!(params.flavor_id));
        server.insert("imageRef".into(), json!(params.image_id));
        server.insert("name".into(), json!(params.name));
        if let Some(security_groups) = &params.security_groups {
            server.insert("security_groups".into(), json!(security_groups));
        }
        if let Some(network_id) = &params.network_id {
            server.insert("networks".into(), json!([{"uuid": network_id}]));
        }
        if let Some(fixed_ip) = &params.fixed_ip {
            server.insert("networks".into(), json!([{"fixed_ip": fixed_ip}]));
        }

        let response = self
            .client
            .post(self.nova_url("servers"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .json(&json!({"server": server}))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<CreatedServerContainer>().await?.server.id),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "create server",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.list_instances", skip(self), err)]
    async fn list_instances(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url("servers"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<ServerListResponse>().await?.servers),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "list servers",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.get_instance_by_id", skip(self), err)]
    async fn get_instance_by_id<'a>(
        &self,
        server_id: &'a str,
    ) -> Result<Server, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url(&format!("servers/{server_id}")))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<ServerContainer>().await?.server),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "fetch server",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.list_networks", skip(self), err)]
    async fn list_networks(&self) -> Result<Vec<Network>, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url("os-networks"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<NetworkListResponse>().await?.networks),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "list networks",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.get_network", skip(self), err)]
    async fn get_network<'a>(
        &self,
        network_id: &'a str,
    ) -> Result<Option<Network>, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url(&format!("os-networks/{network_id}")))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<NetworkContainer>().await?.network)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "fetch network",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.list_flavors", skip(self), err)]
    async fn list_flavors(&self) -> Result<Vec<ResourceSummary>, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url("flavors"))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<FlavorListResponse>().await?.flavors),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "list flavors",
                status,
            }),
        }
    }

    #[tracing::instrument(name = "compute.get_flavor", skip(self), err)]
    async fn get_flavor<'a>(
        &self,
        flavor_id: &'a str,
    ) -> Result<Option<Flavor>, ComputeProviderError> {
        let token = self.authenticate().await?;
        let response = self
            .client
            .get(self.nova_url(&format!("flavors/{flavor_id}")))
            .header(X_AUTH_TOKEN, token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<FlavorContainer>().await?.flavor)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ComputeProviderError::RemoteCall {
                operation: "fetch flavor",
                status,
            }),
        }
    }
}
