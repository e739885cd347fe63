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
//! # Provider manager
//!
//! Access point to the upstream service providers. Handlers reach the cloud
//! through this facade, which also allows an easy injection of mocked
//! providers in tests.

use derive_builder::Builder;
use mockall_double::double;

use crate::compute::ComputeApi;
#[double]
use crate::compute::ComputeProvider;
use crate::config::Config;
use crate::error::GatewayError;

/// Global provider manager.
#[derive(Builder, Clone)]
// The owned pattern is necessary since otherwise the builder invokes clone,
// which immediately confuses mockall in tests.
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Compute provider.
    compute: ComputeProvider,
}

impl Provider {
    pub fn new(cfg: Config) -> Result<Self, GatewayError> {
        let compute_provider = ComputeProvider::new(&cfg)?;

        Ok(Self {
            config: cfg,
            compute: compute_provider,
        })
    }

    /// Get the compute provider.
    pub fn get_compute_provider(&self) -> &impl ComputeApi {
        &self.compute
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let compute_mock = crate::compute::MockComputeProvider::default();

        ProviderBuilder::default()
            .config(Config::for_tests())
            .compute(compute_mock)
    }
}
