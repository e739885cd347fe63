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
//! Gateway API
use axum::{extract::State, http::{HeaderMap, header}, response::IntoResponse};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::error::GatewayApiError;
use crate::gateway::ServiceState;

pub mod error;
pub mod provider;
pub mod types;

use crate::api::types::*;

#[derive(OpenApi)]
#[openapi(
    info(version = "1.0.0"),
    tags(
        (name="instances", description=provider::instances::DESCRIPTION),
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .nest("/provider", provider::openapi_router())
        .routes(routes!(version))
}

/// Versions
#[utoipa::path(
    get,
    path = "/",
    description = "Version discovery",
    responses(
        (status = OK, description = "Versions", body = Versions),
    ),
    tag = "version"
)]
async fn version(
    headers: HeaderMap,
    State(_state): State<ServiceState>,
) -> Result<impl IntoResponse, GatewayApiError> {
    let host = headers
        .get(header::HOST)
        .and_then(|header| header.to_str().map(|val| format!("http://{val}")).ok())
        .unwrap_or_else(|| "http://localhost".to_string());

    let res = Versions {
        versions: vec![Version {
            id: "v1.0".into(),
            status: VersionStatus::Stable,
            links: Some(vec![Link::new(format!("{host}/provider"))]),
        }],
    };
    Ok(res)
}
