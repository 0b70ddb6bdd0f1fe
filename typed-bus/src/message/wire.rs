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

//! JSON frame layout carried in a broker message body.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "name": "Person",
//!   "namespace": "urn:people",
//!   "busId": "bus_01h9xz7n2e5p6q8r3t1u2v3w4x",
//!   "sent": "2026-10-16T12:00:00Z",
//!   "headers": [ { "name": "Header", "value": "RightValue" } ],
//!   "data": { "id": 5 }
//! }
//! ```
//!
//! `name`, `namespace` and `headers` are required. `busId`, `sent` and `data`
//! may be omitted; a missing `data` reads as JSON `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::common::BusError;
use crate::message::{BusHeader, BusMessage, TypeKey};
use crate::traits::DataContract;

/// The frame as read off the wire. `data` stays a borrowed, unparsed slice.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InboundFrame<'a> {
    pub(crate) name: String,
    pub(crate) namespace: String,
    #[serde(default)]
    pub(crate) bus_id: String,
    #[serde(default)]
    pub(crate) sent: Option<DateTime<Utc>>,
    pub(crate) headers: Vec<BusHeader>,
    #[serde(borrow, default)]
    pub(crate) data: Option<&'a RawValue>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundFrame<'a, T> {
    name: &'a str,
    namespace: &'a str,
    bus_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sent: Option<DateTime<Utc>>,
    headers: &'a [BusHeader],
    data: &'a T,
}

/// Encodes a typed message into a wire frame.
///
/// The frame carries the contract's `(name, namespace)`, the message's origin
/// stamp and headers, and the serialized payload. Publishers stamp `bus_id` and
/// `sent` before calling this.
///
/// # Errors
///
/// * [`BusError::InvalidTypeKey`] if the contract declares an empty name or namespace.
/// * [`BusError::Serialize`] if the payload cannot be serialized.
pub fn encode<T: DataContract>(message: &BusMessage<T>) -> Result<Vec<u8>, BusError> {
    let key = TypeKey::of::<T>()?;
    let frame = OutboundFrame {
        name: key.name(),
        namespace: key.namespace(),
        bus_id: &message.bus_id,
        sent: message.sent,
        headers: &message.headers,
        data: &message.data,
    };
    serde_json::to_vec(&frame).map_err(|e| BusError::Serialize(e.to_string()))
}
