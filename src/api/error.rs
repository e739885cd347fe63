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
//! # Gateway API error.
//!
//! Single conversion point of request-processing failures into HTTP
//! responses. Validation-class errors answer 400 with the offending message;
//! everything else collapses to a generic 500 — the original error is logged
//! server-side and never exposed to the caller.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::compute::error::ComputeProviderError;

/// Gateway API operation errors.
#[derive(Debug, Error)]
pub enum GatewayApiError {
    /// Request validation error.
    #[error("request validation failed: {source}")]
    Validator {
        /// The source of the error.
        #[from]
        source: ValidationErrors,
    },

    /// The request body could not be read as the expected JSON document.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Compute provider error.
    #[error(transparent)]
    Compute {
        /// The source of the error.
        #[from]
        source: ComputeProviderError,
    },
}

impl IntoResponse for GatewayApiError {
    fn into_response(self) -> Response {
        error!("Error happened during request processing: {:#?}", self);

        let (status_code, message) = match &self {
            GatewayApiError::Validator { source } => {
                (StatusCode::BAD_REQUEST, first_validation_message(source))
            }
            GatewayApiError::JsonExtractorRejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
            GatewayApiError::Compute { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred.".to_string(),
            ),
        };

        (status_code, Json(json!({"message": message}))).into_response()
    }
}

/// The first message of a validation report.
fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", error.code),
            })
        })
        .next()
        .unwrap_or_else(|| errors.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    async fn body_message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        value["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let probe = Probe {
            name: String::new(),
        };
        let error = GatewayApiError::from(probe.validate().unwrap_err());

        let response = error.into_response();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert_eq!("name must not be empty", body_message(response).await);
    }

    #[tokio::test]
    async fn test_everything_else_collapses_to_internal_error() {
        let error = GatewayApiError::from(ComputeProviderError::RemoteCall {
            operation: "list servers",
            status: StatusCode::BAD_GATEWAY,
        });

        let response = error.into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert_eq!("An unexpected error occurred.", body_message(response).await);
    }
}
