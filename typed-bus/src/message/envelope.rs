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

use chrono::{DateTime, Utc};

use crate::common::BusError;
use crate::message::{BusHeader, BusMessage, TypeKey};
use crate::traits::BusPayload;

/// The in-process representation of one inbound message.
///
/// An `Envelope` is produced by the [`EnvelopeReader`](crate::EnvelopeReader) with
/// its identity, headers, and timestamp already populated. The body slot starts
/// empty and is filled at most once, by the deserializer of the registration the
/// message resolved to. Envelopes rejected as unregistered or filtered keep an
/// empty body for their whole lifetime.
///
/// The type key is absent only for frames so malformed that no name/namespace
/// could be read; such envelopes are only ever seen by an
/// [`ErrorSubscriber`](crate::ErrorSubscriber).
#[derive(Clone, Debug)]
pub struct Envelope {
    bus_id: String,
    type_key: Option<TypeKey>,
    headers: Vec<BusHeader>,
    sent: Option<DateTime<Utc>>,
    body: Option<Box<dyn BusPayload>>,
}

impl Envelope {
    /// Creates an envelope with an empty body slot.
    pub fn new(bus_id: impl Into<String>, type_key: TypeKey, headers: Vec<BusHeader>) -> Self {
        Self::partial(bus_id.into(), Some(type_key), headers, None)
    }

    /// Sets the publish timestamp, builder style.
    #[must_use]
    pub fn with_sent(mut self, sent: DateTime<Utc>) -> Self {
        self.sent = Some(sent);
        self
    }

    pub(crate) fn partial(
        bus_id: String,
        type_key: Option<TypeKey>,
        headers: Vec<BusHeader>,
        sent: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            bus_id,
            type_key,
            headers,
            sent,
            body: None,
        }
    }

    /// Identity of the bus instance that published the message. Empty when the
    /// frame did not carry one.
    #[inline]
    #[must_use]
    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// The routing key read from the frame.
    #[inline]
    #[must_use]
    pub fn type_key(&self) -> Option<&TypeKey> {
        self.type_key.as_ref()
    }

    /// All headers in wire order, duplicates included.
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &[BusHeader] {
        &self.headers
    }

    /// Returns the first value of the named header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name == name)
            .map(|header| header.value.as_str())
    }

    /// Iterates every value carried under the named header.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |header| header.name == name)
            .map(|header| header.value.as_str())
    }

    /// When the message was published, if recorded.
    #[inline]
    #[must_use]
    pub fn sent(&self) -> Option<DateTime<Utc>> {
        self.sent
    }

    /// The deserialized payload, if the body slot has been filled.
    #[must_use]
    pub fn body(&self) -> Option<&dyn BusPayload> {
        self.body.as_deref()
    }

    /// Whether the body slot has been filled.
    #[inline]
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Downcasts the body to a concrete payload type.
    #[must_use]
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.body().and_then(|body| body.as_any().downcast_ref::<T>())
    }

    /// Rebuilds the typed [`BusMessage`] view of this envelope.
    ///
    /// Returns `None` if the body is empty or holds a different type.
    #[must_use]
    pub fn to_message<T: Clone + 'static>(&self) -> Option<BusMessage<T>> {
        let data = self.payload::<T>()?.clone();
        Some(BusMessage {
            bus_id: self.bus_id.clone(),
            sent: self.sent,
            headers: self.headers.clone(),
            data,
        })
    }

    /// Fills the body slot.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::BodyAlreadySet`] if the slot was already filled; the
    /// existing body is kept.
    pub fn set_body(&mut self, body: Box<dyn BusPayload>) -> Result<(), BusError> {
        if self.body.is_some() {
            return Err(BusError::BodyAlreadySet);
        }
        self.body = Some(body);
        Ok(())
    }
}
