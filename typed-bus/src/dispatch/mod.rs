//! The dispatch engine.
//!
//! *   [`SubscriptionRegistry`]: Concurrent `TypeKey -> Registration` map with
//!     insert-if-absent semantics; one per bus.
//! *   [`Registration`]: A deserializer, handler, and [`FilterInfo`] bound to a type key.
//! *   [`evaluate`] / [`passes`]: Self-publish suppression followed by header predicates.
//! *   [`Dispatcher`]: Reads a frame, resolves and filters it, deserializes only the
//!     accepted body, invokes the handler, and funnels every failure to the error
//!     boundary.

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
pub use dispatcher::{Disposition, Dispatcher, RejectReason};
pub use filter::{evaluate, passes, FilterInfo, FilterVerdict, HeaderMatcher, HeaderPredicate};
pub use registration::{Registration, RegistrationBuilder};
pub use registry::SubscriptionRegistry;

// --- Submodules ---

/// Defines the [`Dispatcher`].
mod dispatcher;
/// Defines [`FilterInfo`] and the filter evaluator.
mod filter;
/// Defines [`Registration`] and its typed builder.
mod registration;
/// Defines the [`SubscriptionRegistry`].
mod registry;
