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
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A single name/value header carried alongside a payload.
///
/// Header names are not unique within a message; duplicates are legal and keep
/// their relative order.
#[derive(new, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusHeader {
    /// Header name.
    #[new(into)]
    pub name: String,
    /// Header value.
    #[new(into)]
    pub value: String,
}

/// A typed message as seen by publishers and message-based handlers.
///
/// `bus_id` and `sent` are stamped by the publishing bus; when building a message
/// to send they can be left at their defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct BusMessage<T> {
    /// Identity of the bus instance that published the message.
    pub bus_id: String,
    /// When the message was published, if the publisher recorded it.
    pub sent: Option<DateTime<Utc>>,
    /// Ordered headers; duplicates allowed.
    pub headers: Vec<BusHeader>,
    /// The payload.
    pub data: T,
}

impl<T> BusMessage<T> {
    /// Wraps a payload with no headers and no origin stamp.
    pub fn new(data: T) -> Self {
        Self {
            bus_id: String::new(),
            sent: None,
            headers: Vec::new(),
            data,
        }
    }

    /// Appends a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(BusHeader::new(name, value));
        self
    }

    /// Returns the first header value with the given name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name == name)
            .map(|header| header.value.as_str())
    }
}

impl<T> From<T> for BusMessage<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_keep_order_and_duplicates() {
        let message = BusMessage::new(5_u32)
            .with_header("Header", "first")
            .with_header("Other", "x")
            .with_header("Header", "second");

        assert_eq!(message.headers.len(), 3);
        assert_eq!(message.headers[2], BusHeader::new("Header", "second"));
        assert_eq!(message.header("Header"), Some("first"));
        assert_eq!(message.header("Missing"), None);
    }
}
