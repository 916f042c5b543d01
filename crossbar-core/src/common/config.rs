/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding the per-actor shutdown timeout, in
/// milliseconds. Takes precedence over the configuration file.
pub const SHUTDOWN_TIMEOUT_ENV: &str = "CROSSBAR_SHUTDOWN_TIMEOUT_MS";

lazy_static! {
    /// The process-wide runtime configuration, loaded once from the XDG
    /// config path (`crossbar/config.toml`) with defaults for anything absent.
    pub static ref CONFIG: RuntimeConfig = RuntimeConfig::load();
}

/// Configuration for the Crossbar runtime.
///
/// Loaded from a TOML file in the XDG-compliant config directory; every field
/// falls back to its default when the file or key is missing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Timeout-related configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long `shutdown_all` waits for one actor to stop before cancelling
    /// its loop, in milliseconds.
    pub actor_shutdown_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            actor_shutdown_timeout_ms: 10_000,
        }
    }
}

impl RuntimeConfig {
    fn load() -> Self {
        let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("crossbar") else {
            return Self::default();
        };
        let Some(path) = base_dirs.find_config_file("config.toml") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(error) => {
                    warn!(?path, %error, "malformed config file; using defaults");
                    Self::default()
                }
            },
            Err(error) => {
                warn!(?path, %error, "unreadable config file; using defaults");
                Self::default()
            }
        }
    }

    /// The effective per-actor shutdown timeout, honoring the environment
    /// override.
    pub fn actor_shutdown_timeout(&self) -> Duration {
        let millis = std::env::var(SHUTDOWN_TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(self.timeouts.actor_shutdown_timeout_ms);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_keys_are_missing() {
        let config: RuntimeConfig = toml::from_str("").unwrap();
        assert_eq!(config.timeouts.actor_shutdown_timeout_ms, 10_000);
    }

    #[test]
    fn file_values_override_defaults() {
        let config: RuntimeConfig =
            toml::from_str("[timeouts]\nactor_shutdown_timeout_ms = 250\n").unwrap();
        assert_eq!(config.timeouts.actor_shutdown_timeout_ms, 250);
    }
}
