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

use chrono::Utc;
use tracing::trace;

use crate::common::{BusError, LocalExchange};
use crate::message::{encode, BusMessage};
use crate::traits::DataContract;

/// Publishes typed messages on behalf of one bus.
///
/// Every outgoing message is stamped with the owning bus id and the current
/// time, so receivers can suppress their own publishes.
#[derive(Clone, Debug)]
pub struct Publisher {
    bus_id: String,
    exchange: LocalExchange,
}

impl Publisher {
    pub(crate) fn new(bus_id: String, exchange: LocalExchange) -> Self {
        Self { bus_id, exchange }
    }

    /// Id stamped on every message sent through this publisher.
    #[inline]
    #[must_use]
    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// Publishes a message with its headers.
    ///
    /// Any `bus_id` or `sent` already on `message` is overwritten. Returns the
    /// number of buses that handled the message.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Serialize`] or [`BusError::InvalidTypeKey`] if the
    /// message cannot be encoded; nothing is published in that case.
    pub async fn send<T: DataContract>(&self, mut message: BusMessage<T>) -> Result<usize, BusError> {
        message.bus_id.clone_from(&self.bus_id);
        message.sent = Some(Utc::now());
        let frame = encode(&message)?;
        trace!(bus_id = %self.bus_id, contract = T::NAME, headers = message.headers.len(), "Publishing message");
        Ok(self.exchange.publish(&frame).await)
    }

    /// Publishes a bare payload with no headers.
    ///
    /// # Errors
    ///
    /// Same as [`Publisher::send`].
    pub async fn publish<T: DataContract>(&self, data: T) -> Result<usize, BusError> {
        self.send(BusMessage::new(data)).await
    }
}
