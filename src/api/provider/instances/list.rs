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

//! Instances: list the available ones.
use axum::{extract::State, response::IntoResponse};
use futures::future::try_join_all;

use crate::api::error::GatewayApiError;
use crate::api::provider::instances::types::{Instance, InstanceListResponse};
use crate::compute::ComputeApi;
use crate::gateway::ServiceState;

/// List available instances.
///
/// Fetches every server of the project, expands each one to its full detail
/// record concurrently, and returns only the servers that are not `ACTIVE` —
/// the ones free to hand out. The expansion is all-or-nothing: a single
/// failed detail fetch fails the whole request.
#[utoipa::path(
    get,
    path = "/",
    operation_id = "/provider/instances:list",
    responses(
        (status = OK, description = "The instances available for use", body = InstanceListResponse),
    ),
    tag = "instances"
)]
#[tracing::instrument(name = "api::instances_list", level = "debug", skip(state), err(Debug))]
pub(super) async fn list(
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, GatewayApiError> {
    let compute = state.provider.get_compute_provider();

    let servers = compute.list_instances().await?;
    let details = try_join_all(
        servers
            .iter()
            .map(|server| compute.get_instance_by_id(&server.id)),
    )
    .await?;

    Ok(InstanceListResponse {
        message: "Successfully fetched available servers".into(),
        data: details
            .into_iter()
            .filter(|server| server.status != "ACTIVE")
            .map(Instance::from)
            .collect(),
    })
}
