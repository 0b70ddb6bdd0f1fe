//! Bus-level plumbing.
//!
//! *   [`Bus`] / [`BusBuilder`]: Identity, subscriptions, and publishers wired
//!     around one dispatcher and registry.
//! *   [`BusConfig`]: TOML configuration loaded from XDG locations, exposed
//!     globally as [`CONFIG`].
//! *   [`init_tracing`]: Installs the `tracing` subscriber described by
//!     [`TracingConfig`].
//! *   [`LocalExchange`] / [`Publisher`]: In-process fanout between buses.
//! *   [`BusError`]: The crate's error type.

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

// --- Public Re-exports ---
pub use bus::{Bus, BusBuilder, Subscription};
pub use config::{BusConfig, BusSettings, LimitsConfig, TracingConfig, CONFIG};
pub use error::BusError;
pub use exchange::LocalExchange;
pub use publisher::Publisher;
pub use telemetry::init_tracing;

// --- Submodules ---

/// Defines [`Bus`], [`BusBuilder`], and [`Subscription`].
mod bus;
/// Defines [`BusConfig`] and its TOML/XDG loading.
mod config;
/// Defines [`BusError`].
mod error;
/// Defines the in-process [`LocalExchange`].
mod exchange;
/// Defines the [`Publisher`].
mod publisher;
/// Tracing subscriber setup.
mod telemetry;
