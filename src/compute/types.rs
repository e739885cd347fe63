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

//! # Compute provider types
//!
//! Passthrough records mirroring the documented shapes of the upstream
//! services. The gateway never persists or mutates these; it only forwards
//! and filters them. Free-form timestamps stay strings on purpose — the
//! compute service emits several non-RFC3339 formats.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relation link attached to most compute resources.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Link {
    /// Link rel attribute.
    pub rel: String,
    /// Link href attribute.
    pub href: String,
}

/// Identifier entry of a list response (servers, images, flavors).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ResourceSummary {
    /// Resource id.
    pub id: String,
    /// Resource display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource links.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Address attached to a server.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ServerAddress {
    /// IP version (4 or 6).
    pub version: u8,
    /// The address itself.
    pub addr: String,
    /// Address kind (fixed/floating).
    #[serde(default, rename = "OS-EXT-IPS:type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// MAC address of the port carrying the address.
    #[serde(
        default,
        rename = "OS-EXT-IPS-MAC:mac_addr",
        skip_serializing_if = "Option::is_none"
    )]
    pub mac_addr: Option<String>,
}

/// Reference to a security group by name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SecurityGroupRef {
    /// Security group name.
    pub name: String,
}

/// Reference to an attached volume.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VolumeAttachmentRef {
    /// Volume id.
    pub id: String,
}

/// Server (instance) detail record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Server {
    /// Server id.
    pub id: String,
    /// Server display name.
    pub name: String,
    /// Server status (`ACTIVE`, `SHUTOFF`, ...).
    pub status: String,
    /// Owning project id.
    #[serde(default)]
    pub tenant_id: String,
    /// Creating user id.
    #[serde(default)]
    pub user_id: String,
    /// Host identifier.
    #[serde(default, rename = "hostId")]
    pub host_id: String,
    /// Source image reference; an object or an empty string upstream.
    #[serde(default)]
    pub image: serde_json::Value,
    /// Flavor the server was built from.
    #[serde(default)]
    pub flavor: ResourceSummary,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
    /// Addresses per attached network label.
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    /// IPv4 access address.
    #[serde(default, rename = "accessIPv4")]
    pub access_ipv4: String,
    /// IPv6 access address.
    #[serde(default, rename = "accessIPv6")]
    pub access_ipv6: String,
    /// Resource links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Security groups the server belongs to.
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupRef>,
    /// Current task, when one is running.
    #[serde(
        default,
        rename = "OS-EXT-STS:task_state",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_state: Option<String>,
    /// Virtual machine state.
    #[serde(default, rename = "OS-EXT-STS:vm_state", skip_serializing_if = "Option::is_none")]
    pub vm_state: Option<String>,
    /// Numeric power state.
    #[serde(
        default,
        rename = "OS-EXT-STS:power_state",
        skip_serializing_if = "Option::is_none"
    )]
    pub power_state: Option<i64>,
    /// Volumes attached to the server.
    #[serde(default, rename = "os-extended-volumes:volumes_attached")]
    pub volumes_attached: Vec<VolumeAttachmentRef>,
    /// Launch timestamp.
    #[serde(
        default,
        rename = "OS-SRV-USG:launched_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub launched_at: Option<String>,
    /// Termination timestamp.
    #[serde(
        default,
        rename = "OS-SRV-USG:terminated_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub terminated_at: Option<String>,
}

/// Machine image detail record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MachineImage {
    /// Image id.
    pub id: String,
    /// Image display name.
    #[serde(default)]
    pub name: String,
    /// Minimum RAM (MiB) required to boot the image.
    #[serde(default, rename = "minRam")]
    pub min_ram: i64,
    /// Minimum disk (GiB) required to boot the image.
    #[serde(default, rename = "minDisk")]
    pub min_disk: i64,
    /// Free-form image metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
    /// Image status.
    #[serde(default)]
    pub status: String,
    /// Upload/processing progress.
    #[serde(default)]
    pub progress: i64,
    /// Image size in bytes.
    #[serde(
        default,
        rename = "OS-EXT-IMG-SIZE:size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<i64>,
    /// Resource links.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Flavor detail record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Flavor {
    /// Flavor id.
    pub id: String,
    /// Flavor display name.
    pub name: String,
    /// RAM in MiB.
    #[serde(default)]
    pub ram: i64,
    /// Root disk in GiB.
    #[serde(default)]
    pub disk: i64,
    /// Swap in MiB; empty string when unset upstream.
    #[serde(default)]
    pub swap: String,
    /// Number of virtual CPUs.
    #[serde(default)]
    pub vcpus: i64,
    /// Ephemeral disk in GiB.
    #[serde(default, rename = "OS-FLV-EXT-DATA:ephemeral")]
    pub ephemeral: i64,
    /// Whether the flavor is disabled.
    #[serde(default, rename = "OS-FLV-DISABLED:disabled")]
    pub disabled: bool,
    /// Whether the flavor is public.
    #[serde(default, rename = "os-flavor-access:is_public")]
    pub is_public: bool,
    /// RX/TX factor.
    #[serde(default)]
    pub rxtx_factor: f64,
    /// Resource links.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Network record as reported by the compute networking extension.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Network {
    /// Network id.
    pub id: String,
    /// Network label.
    #[serde(default)]
    pub label: String,
    /// Network CIDR when one is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

/// Range of addresses a security group rule applies to.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IpRange {
    /// CIDR notation of the range.
    #[serde(default)]
    pub cidr: String,
}

/// Security group rule record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SecurityGroupRule {
    /// Rule id.
    pub id: String,
    /// Security group the rule belongs to.
    #[serde(default)]
    pub parent_group_id: String,
    /// IP protocol the rule matches.
    #[serde(default)]
    pub ip_protocol: String,
    /// First port of the matched range.
    #[serde(default)]
    pub from_port: i64,
    /// Last port of the matched range.
    #[serde(default)]
    pub to_port: i64,
    /// Source group, when the rule references one.
    #[serde(default)]
    pub group: serde_json::Value,
    /// Source address range.
    #[serde(default)]
    pub ip_range: IpRange,
}

/// Security group record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SecurityGroup {
    /// Security group id.
    pub id: String,
    /// Security group name.
    pub name: String,
    /// Security group description.
    #[serde(default)]
    pub description: String,
    /// Owning project id.
    #[serde(default)]
    pub tenant_id: String,
    /// Rules of the group.
    #[serde(default)]
    pub rules: Vec<SecurityGroupRule>,
}

/// IP protocol accepted by security group rules.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    /// TCP.
    #[default]
    Tcp,
    /// UDP.
    Udp,
    /// ICMP.
    Icmp,
}

/// Parameters of a create-server call.
///
/// `network_id` and `fixed_ip` are mutually exclusive network-attachment
/// modes; supplying both is rejected before any network traffic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServerCreateParams {
    /// Flavor to build the server from.
    pub flavor_id: String,
    /// Image to boot the server with.
    pub image_id: String,
    /// Server display name.
    pub name: String,
    /// Security groups to place the server into.
    pub security_groups: Option<Vec<SecurityGroupRef>>,
    /// Network to attach the server to.
    pub network_id: Option<String>,
    /// Fixed address to attach the server with.
    pub fixed_ip: Option<String>,
}

/// Parameters of a create-security-group-rule call.
#[derive(Clone, Debug, PartialEq)]
pub struct SecurityGroupRuleParams {
    /// Security group the rule is added to.
    pub parent_group_id: String,
    /// Inclusive port range the rule matches.
    pub port_range: (u16, u16),
    /// IP protocol the rule matches.
    pub ip_protocol: IpProtocol,
    /// Source address range the rule matches.
    pub cidr: String,
}

impl Default for SecurityGroupRuleParams {
    fn default() -> Self {
        Self {
            parent_group_id: String::new(),
            port_range: (0, 0),
            ip_protocol: IpProtocol::Tcp,
            cidr: "0.0.0.0/0".into(),
        }
    }
}

/// Domain reference inside an issued token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DomainRef {
    /// Domain id.
    pub id: String,
    /// Domain name.
    pub name: String,
}

/// Role reference inside an issued token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RoleRef {
    /// Role id.
    pub id: String,
    /// Role name.
    pub name: String,
}

/// User or project entity inside an issued token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AuthEntity {
    /// Owning domain.
    #[serde(default)]
    pub domain: DomainRef,
    /// Entity id.
    pub id: String,
    /// Entity name.
    pub name: String,
    /// Password expiry of the user, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_expires_at: Option<DateTime<Utc>>,
}

/// Metadata of an issued token — the body of the identity service response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TokenMetadata {
    /// Authentication methods used for the issue.
    #[serde(default)]
    pub methods: Vec<String>,
    /// The authenticated user.
    pub user: AuthEntity,
    /// Audit trail identifiers.
    #[serde(default)]
    pub audit_ids: Vec<String>,
    /// Expiry of the token.
    pub expires_at: DateTime<Utc>,
    /// Issue time of the token.
    pub issued_at: DateTime<Utc>,
    /// The scoped project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<AuthEntity>,
    /// Roles granted on the scope.
    #[serde(default)]
    pub roles: Vec<RoleRef>,
}

// Wire envelopes of the upstream services.

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: TokenMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecurityGroupContainer {
    pub security_group: SecurityGroup,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecurityGroupRuleContainer {
    pub security_group_rule: SecurityGroupRule,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageListResponse {
    pub images: Vec<ResourceSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageContainer {
    pub image: MachineImage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerListResponse {
    pub servers: Vec<ResourceSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerContainer {
    pub server: Server,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedServer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedServerContainer {
    pub server: CreatedServer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkListResponse {
    pub networks: Vec<Network>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkContainer {
    pub network: Network,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlavorListResponse {
    pub flavors: Vec<ResourceSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlavorContainer {
    pub flavor: Flavor,
}
