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

//! # OpenStack compute gateway
//!
//! A small HTTP gateway exposing a subset of an OpenStack cloud's compute,
//! network and image operations through a simplified REST surface. Incoming
//! requests are validated, translated into authenticated calls against the
//! cloud (Keystone for identity, Nova for compute) and the responses are
//! reshaped into a compact `{ message, data }` envelope.
//!
//! The gateway holds no state of its own besides a single cached identity
//! token: every request is served by forwarding to the upstream services with
//! a project-scoped bearer token that is obtained lazily and reused until it
//! expires. Consumers therefore see a stable, minimal surface — list the
//! instances that are free to use, create an instance from a flavor, image
//! and network — while the gateway owns the ceremony of authentication,
//! validation and error mapping.

pub mod api;
pub mod compute;
pub mod config;
pub mod error;
pub mod gateway;
pub mod provider;
