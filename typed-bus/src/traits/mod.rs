//! Core traits defining the seams of the dispatch engine.
//!
//! *   [`DataContract`]: A payload type with a stable `(name, namespace)` identity.
//! *   [`BusPayload`]: Object-safe, cloneable, downcastable form of a deserialized payload
//!     as stored in an [`Envelope`](crate::Envelope).
//! *   [`MessageHandler`]: Application logic invoked for a fully materialized envelope.
//! *   [`DeserializerFn`]: Per-registration body deserializer.
//! *   [`ErrorSubscriber`]: The error boundary receiving every per-message failure.

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
pub use bus_payload::BusPayload;
pub use data_contract::DataContract;
pub use deserializer::{json_deserializer, DeserializerFn};
pub use error_subscriber::{ErrorSubscriber, NullErrorSubscriber, TracingErrorSubscriber};
pub use message_handler::MessageHandler;

// --- Crate-Internal Re-exports ---
pub(crate) use message_handler::{MessageFn, PayloadFn};

// --- Submodules ---

/// Defines the [`BusPayload`] trait.
mod bus_payload;
/// Defines the [`DataContract`] trait.
mod data_contract;
/// Defines [`DeserializerFn`] and the JSON deserializer factory.
mod deserializer;
/// Defines the [`ErrorSubscriber`] boundary and its stock implementations.
mod error_subscriber;
/// Defines [`MessageHandler`] and the closure adapters behind typed registrations.
mod message_handler;
