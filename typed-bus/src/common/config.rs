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

use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::common::BusError;

/// Configuration for a typed bus.
///
/// Loaded from TOML at the XDG location `$XDG_CONFIG_HOME/typed-bus/config.toml`.
/// Every section and field is optional; anything omitted takes its default.
///
/// ```toml
/// [bus]
/// bus_id = "orders-7"
/// receive_self_publish = false
/// id_prefix = "bus"
///
/// [tracing]
/// level = "info"
/// to_file = true
/// log_directory = "logs"
/// log_file = "typed-bus.log"
///
/// [limits]
/// max_concurrent_dispatches = 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Bus identity and subscription defaults.
    pub bus: BusSettings,
    /// Logging setup used by [`init_tracing`](crate::init_tracing).
    pub tracing: TracingConfig,
    /// Concurrency limits of the in-process exchange.
    pub limits: LimitsConfig,
}

/// Bus identity and subscription defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Fixed bus id. When absent a fresh time-ordered id is generated per bus.
    pub bus_id: Option<String>,
    /// Bus-wide default for typed subscriptions that do not choose explicitly.
    pub receive_self_publish: bool,
    /// Prefix of generated bus ids.
    pub id_prefix: String,
}

/// Tracing and logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Write to a daily rolling file instead of stdout.
    pub to_file: bool,
    /// Directory for log files.
    pub log_directory: String,
    /// Log file name prefix.
    pub log_file: String,
}

/// Limits and capacity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Upper bound on bus dispatches the local exchange runs at once, shared
    /// across every in-flight publish.
    pub max_concurrent_dispatches: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            bus_id: None,
            receive_self_publish: false,
            id_prefix: "bus".to_string(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: false,
            log_directory: "logs".to_string(),
            log_file: "typed-bus.log".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dispatches: 64,
        }
    }
}

impl BusConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Config`] if the text is not valid TOML for this layout.
    pub fn from_toml_str(text: &str) -> Result<Self, BusError> {
        toml::from_str(text).map_err(|e| BusError::Config(e.to_string()))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Config`] if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, BusError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BusError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text).map_err(|e| match e {
            BusError::Config(reason) => BusError::Config(format!("{}: {reason}", path.display())),
            other => other,
        })
    }

    /// Loads configuration from XDG-compliant locations.
    ///
    /// Looks for `typed-bus/config.toml` under the XDG config directories. A
    /// missing file yields the defaults; an unreadable or malformed one is
    /// logged and also yields the defaults.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("typed-bus") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        Self::load_from(&path).unwrap_or_else(|e| {
            error!("{}; using defaults", e);
            Self::default()
        })
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations.
    pub static ref CONFIG: BusConfig = BusConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_default() {
        assert_eq!(BusConfig::from_toml_str("").unwrap(), BusConfig::default());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = BusConfig::from_toml_str(
            r#"
            [bus]
            bus_id = "orders-7"

            [limits]
            max_concurrent_dispatches = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.bus.bus_id.as_deref(), Some("orders-7"));
        assert!(!config.bus.receive_self_publish);
        assert_eq!(config.bus.id_prefix, "bus");
        assert_eq!(config.limits.max_concurrent_dispatches, 4);
        assert_eq!(config.tracing, TracingConfig::default());
    }

    #[test]
    fn test_malformed_text_is_config_error() {
        let err = BusConfig::from_toml_str("[bus]\nreceive_self_publish = \"yes\"").unwrap_err();
        assert_eq!(err.as_label(), "config_error");
    }
}
