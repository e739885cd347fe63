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

//! Instances: create an instance.
use axum::{
    Json, debug_handler,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::api::error::GatewayApiError;
use crate::api::provider::instances::types::{
    CreatedInstance, InstanceCreateRequest, InstanceCreateResponse,
};
use crate::compute::{ComputeApi, error::ComputeProviderError, types::ServerCreateParams};
use crate::gateway::ServiceState;

/// Create an instance.
///
/// Validates the request body, then verifies that the referenced flavor,
/// network and image all exist — each with its own upstream lookup — before
/// issuing the create call. Nothing is created when any identifier does not
/// resolve.
#[utoipa::path(
    post,
    path = "/",
    operation_id = "/provider/instances:create",
    request_body = InstanceCreateRequest,
    responses(
        (status = OK, description = "The created instance identifier", body = InstanceCreateResponse),
    ),
    tag = "instances"
)]
#[tracing::instrument(name = "api::instances_create", level = "debug", skip(state, payload), err(Debug))]
#[debug_handler]
pub(super) async fn create(
    State(state): State<ServiceState>,
    payload: Result<Json<InstanceCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let compute = state.provider.get_compute_provider();

    if compute.get_flavor(&request.flavour_id).await?.is_none() {
        return Err(
            ComputeProviderError::InvalidArgument("invalid flavor id provided".into()).into(),
        );
    }
    if compute.get_network(&request.network_id).await?.is_none() {
        return Err(
            ComputeProviderError::InvalidArgument("invalid network id provided".into()).into(),
        );
    }
    if let Err(error) = compute.get_image_by_id(&request.image_id.to_string()).await {
        if error.upstream_status() == Some(StatusCode::NOT_FOUND) {
            return Err(
                ComputeProviderError::InvalidArgument("invalid image id provided".into()).into(),
            );
        }
        return Err(error.into());
    }

    let instance_id = compute
        .create_instance(ServerCreateParams {
            flavor_id: request.flavour_id,
            image_id: request.image_id.to_string(),
            name: request.name.to_string(),
            security_groups: request
                .security_groups
                .map(|groups| groups.into_iter().map(Into::into).collect()),
            network_id: Some(request.network_id),
            fixed_ip: None,
        })
        .await?;

    Ok(InstanceCreateResponse {
        message: "Instance successfully created".into(),
        data: CreatedInstance { instance_id },
    })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt; // for `collect`
    use serde_json::json;
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::{
        super::{openapi_router, tests::get_mocked_state},
        *,
    };
    use crate::compute::{MockComputeProvider, types as provider_types};

    const FLAVOR_ID: &str = "m1.small";
    const IMAGE_ID: &str = "4472bf4e-4da4-4452-b19c-5fce30a92b82";
    const NAME: &str = "b8b63a3a-6ad4-4836-92ee-b9e2a4d1b4d6";
    const NETWORK_ID: &str = "net-1";

    fn request_body() -> serde_json::Value {
        json!({
            "flavourId": FLAVOR_ID,
            "imageId": IMAGE_ID,
            "name": NAME,
            "networkId": NETWORK_ID,
            "securityGroups": [{"name": "default"}],
        })
    }

    fn post(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .uri("/")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn mock_flavor_found(compute_mock: &mut MockComputeProvider) {
        compute_mock
            .expect_get_flavor()
            .withf(|id: &str| id == FLAVOR_ID)
            .returning(|_| {
                Ok(Some(provider_types::Flavor {
                    id: FLAVOR_ID.into(),
                    name: "m1.small".into(),
                    ..Default::default()
                }))
            });
    }

    fn mock_network_found(compute_mock: &mut MockComputeProvider) {
        compute_mock
            .expect_get_network()
            .withf(|id: &str| id == NETWORK_ID)
            .returning(|_| {
                Ok(Some(provider_types::Network {
                    id: NETWORK_ID.into(),
                    label: "private".into(),
                    ..Default::default()
                }))
            });
    }

    fn mock_image_found(compute_mock: &mut MockComputeProvider) {
        compute_mock
            .expect_get_image_by_id()
            .withf(|id: &str| id == IMAGE_ID)
            .returning(|_| {
                Ok(provider_types::MachineImage {
                    id: IMAGE_ID.into(),
                    name: "cirros".into(),
                    ..Default::default()
                })
            });
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create() {
        let mut compute_mock = MockComputeProvider::default();
        mock_flavor_found(&mut compute_mock);
        mock_network_found(&mut compute_mock);
        mock_image_found(&mut compute_mock);
        compute_mock
            .expect_create_instance()
            .withf(|params: &ServerCreateParams| {
                *params
                    == ServerCreateParams {
                        flavor_id: FLAVOR_ID.into(),
                        image_id: IMAGE_ID.into(),
                        name: NAME.into(),
                        security_groups: Some(vec![provider_types::SecurityGroupRef {
                            name: "default".into(),
                        }]),
                        network_id: Some(NETWORK_ID.into()),
                        fixed_ip: None,
                    }
            })
            .times(1)
            .returning(|_| Ok("instance-1".into()));

        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        // The extra field must be dropped before the payload reaches the
        // provider.
        let mut body = request_body();
        body["adminPassword"] = json!("not part of the contract");

        let response = api.as_service().oneshot(post(body)).await.unwrap();

        assert_eq!(StatusCode::OK, response.status());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: InstanceCreateResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!("Instance successfully created", res.message);
        assert_eq!("instance-1", res.data.instance_id);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_unknown_flavor() {
        // No create_instance expectation: reaching it fails the test.
        let mut compute_mock = MockComputeProvider::default();
        compute_mock
            .expect_get_flavor()
            .withf(|id: &str| id == FLAVOR_ID)
            .returning(|_| Ok(None));

        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api.as_service().oneshot(post(request_body())).await.unwrap();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!("An unexpected error occurred.", res["message"]);
        assert!(logs_contain("invalid flavor id provided"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_unknown_network() {
        let mut compute_mock = MockComputeProvider::default();
        mock_flavor_found(&mut compute_mock);
        compute_mock
            .expect_get_network()
            .withf(|id: &str| id == NETWORK_ID)
            .returning(|_| Ok(None));

        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api.as_service().oneshot(post(request_body())).await.unwrap();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert!(logs_contain("invalid network id provided"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_unknown_image() {
        let mut compute_mock = MockComputeProvider::default();
        mock_flavor_found(&mut compute_mock);
        mock_network_found(&mut compute_mock);
        compute_mock
            .expect_get_image_by_id()
            .withf(|id: &str| id == IMAGE_ID)
            .returning(|_| {
                Err(ComputeProviderError::RemoteCall {
                    operation: "fetch machine image",
                    status: StatusCode::NOT_FOUND,
                })
            });

        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api.as_service().oneshot(post(request_body())).await.unwrap();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert!(logs_contain("invalid image id provided"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_image_lookup_failure_propagates() {
        let mut compute_mock = MockComputeProvider::default();
        mock_flavor_found(&mut compute_mock);
        mock_network_found(&mut compute_mock);
        compute_mock
            .expect_get_image_by_id()
            .withf(|id: &str| id == IMAGE_ID)
            .returning(|_| {
                Err(ComputeProviderError::RemoteCall {
                    operation: "fetch machine image",
                    status: StatusCode::BAD_GATEWAY,
                })
            });

        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api.as_service().oneshot(post(request_body())).await.unwrap();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert!(logs_contain("fetch machine image"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_empty_flavour_id_is_bad_request() {
        let compute_mock = MockComputeProvider::default();
        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let mut body = request_body();
        body["flavourId"] = json!("");

        let response = api.as_service().oneshot(post(body)).await.unwrap();

        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!("flavourId must not be empty", res["message"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_malformed_image_id_is_bad_request() {
        let compute_mock = MockComputeProvider::default();
        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let mut body = request_body();
        body["imageId"] = json!("not-a-uuid");

        let response = api.as_service().oneshot(post(body)).await.unwrap();

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_missing_name_is_bad_request() {
        let compute_mock = MockComputeProvider::default();
        let state = get_mocked_state(compute_mock);

        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let mut body = request_body();
        body.as_object_mut().unwrap().remove("name");

        let response = api.as_service().oneshot(post(body)).await.unwrap();

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }
}
