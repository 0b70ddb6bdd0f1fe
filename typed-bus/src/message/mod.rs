//! Message representations and the wire codec.
//!
//! This module contains everything that describes a message as it crosses the
//! broker boundary:
//!
//! *   [`TypeKey`]: The `(name, namespace)` routing identity of a payload contract.
//! *   [`BusHeader`] and [`BusMessage`]: The typed, user-facing message shape.
//! *   [`Envelope`]: The in-process form of one inbound message, with a set-once
//!     type-erased body slot.
//! *   [`EnvelopeReader`] and [`BodyReader`]: Parse a frame's header section eagerly
//!     while leaving the payload untouched until a deserializer asks for it.
//! *   [`encode`]: Produces wire frames for typed messages.

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
pub use bus_message::{BusHeader, BusMessage};
pub use envelope::Envelope;
pub use reader::{BodyReader, EnvelopeReader, MalformedEnvelope};
pub use type_key::TypeKey;
pub use wire::encode;

// --- Submodules ---

/// Defines [`BusHeader`] and [`BusMessage`].
mod bus_message;
/// Defines the inbound [`Envelope`].
mod envelope;
/// Defines [`EnvelopeReader`] and the deferred [`BodyReader`].
mod reader;
/// Defines [`TypeKey`].
mod type_key;
/// JSON frame layout shared by the reader and [`encode`].
mod wire;
