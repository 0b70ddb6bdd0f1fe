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
use thiserror::Error;

use crate::message::TypeKey;

/// Errors produced by the bus.
///
/// Per-message variants (`MalformedEnvelope`, `Deserialize`, `HandlerFailed`,
/// `HandlerPanicked`) never propagate out of the dispatcher; they are handed to the
/// [`ErrorSubscriber`](crate::ErrorSubscriber). The remaining variants are returned
/// to callers of registration, configuration, and publishing APIs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// A type key with an empty name or namespace.
    #[error("invalid type key: name={name:?} namespace={namespace:?}")]
    InvalidTypeKey {
        /// The offending name.
        name: String,
        /// The offending namespace.
        namespace: String,
    },

    /// The wire frame could not be read at all.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The body did not match the registered contract.
    #[error("cannot deserialize {contract}: {reason}")]
    Deserialize {
        /// Display form of the contract's type key.
        contract: String,
        /// Underlying deserializer message.
        reason: String,
    },

    /// The handler returned an error.
    #[error("handler failed: {0:#}")]
    HandlerFailed(anyhow::Error),

    /// The handler panicked; the panic was caught.
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    /// A registration already exists for this type key.
    #[error("type {0} is already registered")]
    AlreadyRegistered(TypeKey),

    /// A payload could not be encoded into a frame.
    #[error("cannot serialize message: {0}")]
    Serialize(String),

    /// The envelope body slot was already filled.
    #[error("envelope body already set")]
    BodyAlreadySet,

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InvalidTypeKey { .. } => "invalid_type_key",
            Self::MalformedEnvelope(_) => "malformed_envelope",
            Self::Deserialize { .. } => "deserialize_failed",
            Self::HandlerFailed(_) => "handler_failed",
            Self::HandlerPanicked(_) => "handler_panicked",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::Serialize(_) => "serialize_failed",
            Self::BodyAlreadySet => "body_already_set",
            Self::Config(_) => "config_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_messages() {
        let key = TypeKey::new("Person", "urn:people").unwrap();
        let err = BusError::AlreadyRegistered(key);
        assert_eq!(err.as_label(), "already_registered");
        assert_eq!(err.to_string(), "type urn:people:Person is already registered");

        let err = BusError::HandlerFailed(anyhow::anyhow!("inner").context("outer"));
        assert_eq!(err.to_string(), "handler failed: outer: inner");
    }
}
