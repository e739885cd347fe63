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
//! Instance operations.

use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::ServiceState;

pub mod create;
pub mod list;
pub mod types;

pub const DESCRIPTION: &str = "Simplified instance operations: list the \
instances that are available for use and create new instances from a flavor, \
image and network.";

pub(super) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(list::list, create::create))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::compute::MockComputeProvider;
    use crate::config::Config;
    use crate::gateway::{Service, ServiceState};
    use crate::provider::Provider;

    pub(crate) fn get_mocked_state(compute_mock: MockComputeProvider) -> ServiceState {
        let provider = Provider::mocked_builder()
            .compute(compute_mock)
            .build()
            .unwrap();

        Arc::new(Service::new(Config::for_tests(), provider))
    }
}
