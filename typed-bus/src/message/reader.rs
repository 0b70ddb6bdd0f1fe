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

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use tracing::trace;

use super::wire::InboundFrame;
use crate::common::BusError;
use crate::message::{BusHeader, Envelope, TypeKey};

/// A deferred read position over a frame's payload.
///
/// The reader borrows the still-unparsed payload slice of the raw frame; nothing
/// is copied or materialized until a deserializer asks for it. A message that no
/// registration wants is never parsed past its header section.
#[derive(Clone, Copy, Debug)]
pub struct BodyReader<'a> {
    raw: Option<&'a RawValue>,
}

impl<'a> BodyReader<'a> {
    /// The raw JSON text of the payload. A frame without `data` reads as `null`.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        self.raw.map_or("null", RawValue::get)
    }

    /// Whether the frame carried no `data` field at all.
    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.raw.is_none()
    }

    /// Parses the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if the payload does not match
    /// the shape of `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.raw())
    }
}

/// A frame that could not be read, with whatever envelope could be salvaged.
#[derive(Debug)]
pub struct MalformedEnvelope {
    /// Partial envelope: fields that parsed on their own are filled in, the rest
    /// are empty. The type key is absent unless both name and namespace survived.
    pub envelope: Envelope,
    /// Why the frame was rejected.
    pub error: BusError,
}

/// Splits raw wire frames into an [`Envelope`] and a deferred [`BodyReader`].
///
/// Reading is two-phase: [`EnvelopeReader::read`] extracts the type key, origin,
/// timestamp and headers eagerly and hands back the payload untouched, so the
/// caller can decide whether anyone wants the message before paying for
/// deserialization. [`EnvelopeReader::read_with`] wraps the same split behind a
/// provider callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeReader;

impl EnvelopeReader {
    /// Reads the header section of a frame.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedEnvelope`] when the frame is not valid JSON, lacks the
    /// required `name`/`namespace`/`headers` fields, or names an empty type key.
    pub fn read(raw: &[u8]) -> Result<(Envelope, BodyReader<'_>), MalformedEnvelope> {
        let frame: InboundFrame<'_> = match serde_json::from_slice(raw) {
            Ok(frame) => frame,
            Err(e) => {
                return Err(MalformedEnvelope {
                    envelope: salvage(raw),
                    error: BusError::MalformedEnvelope(e.to_string()),
                })
            }
        };

        let InboundFrame {
            name,
            namespace,
            bus_id,
            sent,
            headers,
            data,
        } = frame;

        let type_key = match TypeKey::new(name, namespace) {
            Ok(key) => key,
            Err(error) => {
                return Err(MalformedEnvelope {
                    envelope: Envelope::partial(bus_id, None, headers, sent),
                    error,
                })
            }
        };

        trace!(type_key = %type_key, headers = headers.len(), "Envelope header section read");
        let envelope = Envelope::partial(bus_id, Some(type_key), headers, sent);
        Ok((envelope, BodyReader { raw: data }))
    }

    /// Reads a frame and lets `provider` decide whether and how to fill the body.
    ///
    /// The provider runs after the header section is known and before any payload
    /// parsing, with the partially built envelope and the live body reader.
    ///
    /// # Errors
    ///
    /// Same as [`EnvelopeReader::read`]; the provider is not called for malformed frames.
    pub fn read_with<F>(raw: &[u8], provider: F) -> Result<Envelope, MalformedEnvelope>
    where
        F: FnOnce(&mut Envelope, BodyReader<'_>),
    {
        let (mut envelope, body) = Self::read(raw)?;
        provider(&mut envelope, body);
        Ok(envelope)
    }
}

/// Pulls out every header-section field that parses on its own.
fn salvage(raw: &[u8]) -> Envelope {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(raw) else {
        return Envelope::partial(String::new(), None, Vec::new(), None);
    };

    let text = |field: &str| map.get(field).and_then(Value::as_str).map(str::to_owned);

    let type_key = match (text("name"), text("namespace")) {
        (Some(name), Some(namespace)) => TypeKey::new(name, namespace).ok(),
        _ => None,
    };
    let headers = map
        .get("headers")
        .and_then(|value| Vec::<BusHeader>::deserialize(value).ok())
        .unwrap_or_default();
    let sent = map
        .get("sent")
        .and_then(|value| Deserialize::deserialize(value).ok());

    Envelope::partial(text("busId").unwrap_or_default(), type_key, headers, sent)
}
