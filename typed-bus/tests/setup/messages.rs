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

use typed_bus::prelude::*;
use typed_bus::encode;

#[bus_contract(name = "Person", namespace = "urn:typed-bus:people")]
#[derive(PartialEq, Eq)]
pub struct Person {
    pub id: u32,
}

#[bus_contract(namespace = "urn:typed-bus:orders")]
#[derive(PartialEq, Eq)]
pub struct Order {
    pub sku: String,
    pub quantity: u32,
}

/// Encodes `data` as a frame published by `origin` with `headers`.
pub fn frame_from<T: DataContract>(origin: &str, data: T, headers: &[(&str, &str)]) -> Vec<u8> {
    let mut message = BusMessage::new(data);
    message.bus_id = origin.to_string();
    for (name, value) in headers {
        message = message.with_header(*name, *value);
    }
    encode(&message).unwrap()
}

/// A `Person` frame whose payload does not match the contract.
pub fn broken_person_frame(origin: &str) -> Vec<u8> {
    format!(
        r#"{{"name":"Person","namespace":"urn:typed-bus:people","busId":"{origin}","headers":[],"data":{{"id":"five"}}}}"#
    )
    .into_bytes()
}
