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
//! Instance API types.

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::compute::types as provider_types;

/// Body of the create-instance request.
///
/// Unknown fields are dropped during deserialization.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InstanceCreateRequest {
    /// Flavor to build the instance from.
    #[validate(length(min = 1, message = "flavourId must not be empty"))]
    pub flavour_id: String,
    /// Image to boot the instance with.
    pub image_id: Uuid,
    /// Name of the instance.
    pub name: Uuid,
    /// Network to attach the instance to.
    #[validate(length(min = 1, message = "networkId must not be empty"))]
    pub network_id: String,
    /// Security groups to place the instance into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub security_groups: Option<Vec<SecurityGroupRef>>,
}

/// Reference to a security group by name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct SecurityGroupRef {
    /// Security group name.
    #[validate(length(min = 1, message = "security group name must not be empty"))]
    pub name: String,
}

impl From<SecurityGroupRef> for provider_types::SecurityGroupRef {
    fn from(value: SecurityGroupRef) -> Self {
        Self { name: value.name }
    }
}

impl From<provider_types::SecurityGroupRef> for SecurityGroupRef {
    fn from(value: provider_types::SecurityGroupRef) -> Self {
        Self { name: value.name }
    }
}

/// Address of an instance.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct InstanceAddress {
    /// IP version (4 or 6).
    pub version: u8,
    /// The address itself.
    pub addr: String,
    /// Address kind (fixed/floating).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// MAC address of the port carrying the address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_addr: Option<String>,
}

impl From<provider_types::ServerAddress> for InstanceAddress {
    fn from(value: provider_types::ServerAddress) -> Self {
        Self {
            version: value.version,
            addr: value.addr,
            kind: value.kind,
            mac_addr: value.mac_addr,
        }
    }
}

/// Instance record exposed by the gateway — the upstream server detail with
/// the vendor extension attributes flattened to plain names.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct Instance {
    /// Instance id.
    pub id: String,
    /// Instance display name.
    pub name: String,
    /// Instance status (`ACTIVE`, `SHUTOFF`, ...).
    pub status: String,
    /// Owning project id.
    pub tenant_id: String,
    /// Creating user id.
    pub user_id: String,
    /// Host identifier.
    pub host_id: String,
    /// Flavor the instance was built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    /// Image the instance was booted from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Creation timestamp.
    pub created: String,
    /// Last update timestamp.
    pub updated: String,
    /// Addresses per attached network label.
    pub addresses: HashMap<String, Vec<InstanceAddress>>,
    /// IPv4 access address.
    pub access_ipv4: String,
    /// IPv6 access address.
    pub access_ipv6: String,
    /// Security groups the instance belongs to.
    pub security_groups: Vec<SecurityGroupRef>,
    /// Current task, when one is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_state: Option<String>,
    /// Virtual machine state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_state: Option<String>,
    /// Numeric power state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<i64>,
    /// Ids of the attached volumes.
    pub volumes_attached: Vec<String>,
    /// Launch timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launched_at: Option<String>,
    /// Termination timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminated_at: Option<String>,
}

impl From<provider_types::Server> for Instance {
    fn from(value: provider_types::Server) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            tenant_id: value.tenant_id,
            user_id: value.user_id,
            host_id: value.host_id,
            flavor_id: Some(value.flavor.id).filter(|id| !id.is_empty()),
            image_id: image_id(&value.image),
            created: value.created,
            updated: value.updated,
            addresses: value
                .addresses
                .into_iter()
                .map(|(label, addresses)| {
                    (label, addresses.into_iter().map(Into::into).collect())
                })
                .collect(),
            access_ipv4: value.access_ipv4,
            access_ipv6: value.access_ipv6,
            security_groups: value.security_groups.into_iter().map(Into::into).collect(),
            task_state: value.task_state,
            vm_state: value.vm_state,
            power_state: value.power_state,
            volumes_attached: value
                .volumes_attached
                .into_iter()
                .map(|volume| volume.id)
                .collect(),
            launched_at: value.launched_at,
            terminated_at: value.terminated_at,
        }
    }
}

/// The image reference of a server is an object upstream, or an empty string
/// when the server was booted from a volume.
fn image_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Object(map) => map
            .get("id")
            .and_then(|id| id.as_str())
            .map(Into::into),
        _ => None,
    }
}

/// Response of the list-instances endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct InstanceListResponse {
    /// Human readable outcome.
    pub message: String,
    /// The available instances.
    pub data: Vec<Instance>,
}

impl IntoResponse for InstanceListResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Identifier of a freshly created instance.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct CreatedInstance {
    /// Id of the created instance.
    pub instance_id: String,
}

/// Response of the create-instance endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct InstanceCreateResponse {
    /// Human readable outcome.
    pub message: String,
    /// The created instance identifier.
    pub data: CreatedInstance,
}

impl IntoResponse for InstanceCreateResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
