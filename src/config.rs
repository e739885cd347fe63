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

//! # Gateway configuration
//!
//! All connection and credential parameters come from the process
//! environment. Every value is required; construction fails when any of them
//! is absent or empty.

use config::Environment;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use url::Url;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The environment could not be read into the configuration structure.
    #[error("failed to load configuration from the environment: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    /// A required value is present but empty.
    #[error("{0} is missing in config")]
    Missing(&'static str),
}

/// Connection and credential parameters of the upstream cloud.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Base URL of the identity service (`KEYSTONE_BASE_URL`).
    pub keystone_base_url: Url,
    /// Base URL of the volume service (`CINDER_BASE_URL`). Reserved; no
    /// operation consumes it yet.
    pub cinder_base_url: Url,
    /// Base URL of the compute service (`NOVA_BASE_URL`).
    pub nova_base_url: Url,
    /// Project to scope issued tokens to (`OS_PROJECT_NAME`).
    pub os_project_name: String,
    /// Domain id owning the project (`OS_PROJECT_DOMAIN_ID`).
    pub os_project_domain_id: String,
    /// User to authenticate as (`OS_USERNAME`).
    pub os_username: String,
    /// Domain name owning the user (`OS_USER_DOMAIN_NAME`).
    pub os_user_domain_name: String,
    /// Password of the user (`OS_PASSWORD`).
    pub os_password: SecretString,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// URLs must parse and the remaining values must be non-empty, otherwise
    /// the construction fails with [`ConfigError`].
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Populating the gateway configuration from the environment");
        let config: Self = config::Config::builder()
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("OS_PROJECT_NAME", &self.os_project_name),
            ("OS_PROJECT_DOMAIN_ID", &self.os_project_domain_id),
            ("OS_USERNAME", &self.os_username),
            ("OS_USER_DOMAIN_NAME", &self.os_user_domain_name),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        if self.os_password.expose_secret().is_empty() {
            return Err(ConfigError::Missing("OS_PASSWORD"));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    pub(crate) fn for_tests() -> Self {
        Self {
            keystone_base_url: Url::parse("http://127.0.0.1:5000").unwrap(),
            cinder_base_url: Url::parse("http://127.0.0.1:8776").unwrap(),
            nova_base_url: Url::parse("http://127.0.0.1:8774/v2.1").unwrap(),
            os_project_name: "demo".into(),
            os_project_domain_id: "default".into(),
            os_username: "gateway".into(),
            os_user_domain_name: "Default".into(),
            os_password: "secret".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_ENV: [(&str, Option<&str>); 8] = [
        ("KEYSTONE_BASE_URL", Some("http://keystone:5000")),
        ("CINDER_BASE_URL", Some("http://cinder:8776")),
        ("NOVA_BASE_URL", Some("http://nova:8774/v2.1")),
        ("OS_PROJECT_NAME", Some("demo")),
        ("OS_PROJECT_DOMAIN_ID", Some("default")),
        ("OS_USERNAME", Some("gateway")),
        ("OS_USER_DOMAIN_NAME", Some("Default")),
        ("OS_PASSWORD", Some("secret")),
    ];

    #[test]
    fn test_from_env() {
        temp_env::with_vars(FULL_ENV, || {
            let config = Config::from_env().unwrap();
            assert_eq!("http://keystone:5000/", config.keystone_base_url.as_str());
            assert_eq!("http://cinder:8776/", config.cinder_base_url.as_str());
            assert_eq!("http://nova:8774/v2.1", config.nova_base_url.as_str());
            assert_eq!("demo", config.os_project_name);
            assert_eq!("default", config.os_project_domain_id);
            assert_eq!("gateway", config.os_username);
            assert_eq!("Default", config.os_user_domain_name);
            assert_eq!("secret", config.os_password.expose_secret());
        });
    }

    #[test]
    fn test_every_value_is_required() {
        for missing in FULL_ENV.map(|(name, _)| name) {
            let env =
                FULL_ENV.map(|(name, value)| (name, if name == missing { None } else { value }));
            temp_env::with_vars(env, || {
                assert!(
                    Config::from_env().is_err(),
                    "config must not load without {missing}"
                );
            });
        }
    }

    #[test]
    fn test_empty_value_is_rejected() {
        let env = FULL_ENV
            .map(|(name, value)| (name, if name == "OS_USERNAME" { Some("") } else { value }));
        temp_env::with_vars(env, || {
            match Config::from_env() {
                Err(ConfigError::Missing(name)) => assert_eq!("OS_USERNAME", name),
                other => panic!("empty OS_USERNAME must be rejected, got {other:?}"),
            };
        });
    }

    #[test]
    fn test_unparsable_url_is_rejected() {
        let env = FULL_ENV.map(|(name, value)| {
            (name, if name == "NOVA_BASE_URL" { Some("not a url") } else { value })
        });
        temp_env::with_vars(env, || {
            assert!(matches!(Config::from_env(), Err(ConfigError::Load { .. })));
        });
    }
}
