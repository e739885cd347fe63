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

//! # Compute provider errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Compute provider error.
///
/// Callers branch on the variant, not on the message text. Variants carrying
/// an upstream status keep it so the caller can tell a missing resource from
/// a broken service.
#[derive(Debug, Error)]
pub enum ComputeProviderError {
    /// The identity service rejected the password grant.
    #[error("authentication rejected by the identity service with status {status}")]
    Authentication {
        /// Status the identity service answered with.
        status: StatusCode,
    },

    /// The identity service accepted the grant but returned no subject token.
    #[error("missing x-subject-token header in the identity service response")]
    SubjectTokenMissing,

    /// Caller supplied an invalid or conflicting parameter.
    #[error("{0}")]
    InvalidArgument(String),

    /// A downstream call answered with an unexpected status.
    #[error("unexpected status {status} while trying to {operation}")]
    RemoteCall {
        /// The operation that was attempted.
        operation: &'static str,
        /// Status the service answered with.
        status: StatusCode,
    },

    /// Transport or body decoding error.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl ComputeProviderError {
    /// The upstream status attached to the error, when there is one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { status } | Self::RemoteCall { status, .. } => Some(*status),
            Self::Reqwest(source) => source.status(),
            _ => None,
        }
    }
}
