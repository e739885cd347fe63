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
//! # Error
//!
//! Failures of the gateway outside of request processing (the API has its own
//! error type).

use thiserror::Error;

use crate::compute::error::ComputeProviderError;
use crate::config::ConfigError;

/// Gateway error.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error(transparent)]
    Config {
        #[from]
        source: ConfigError,
    },

    /// Compute provider error.
    #[error(transparent)]
    ComputeProvider {
        #[from]
        source: ComputeProviderError,
    },

    #[error(transparent)]
    IO {
        #[from]
        source: std::io::Error,
    },
}
