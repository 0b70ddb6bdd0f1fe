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
use std::sync::Arc;

use crate::common::BusError;
use crate::message::{BodyReader, TypeKey};
use crate::traits::{BusPayload, DataContract};

/// Type alias for the deserializer stored in a registration.
///
/// The function receives the deferred [`BodyReader`] of an accepted message and
/// returns the boxed payload, or a [`BusError`] when the body does not match the
/// expected shape.
pub type DeserializerFn =
    Arc<dyn Fn(&BodyReader<'_>) -> Result<Box<dyn BusPayload>, BusError> + Send + Sync>;

/// Builds the JSON deserializer for a [`DataContract`].
#[must_use]
pub fn json_deserializer<T: DataContract>() -> DeserializerFn {
    Arc::new(deserialize_json::<T>)
}

fn deserialize_json<T: DataContract>(body: &BodyReader<'_>) -> Result<Box<dyn BusPayload>, BusError> {
    let payload: T = body.deserialize().map_err(|e| BusError::Deserialize {
        contract: contract_label::<T>(),
        reason: e.to_string(),
    })?;
    Ok(Box::new(payload))
}

fn contract_label<T: DataContract>() -> String {
    TypeKey::of::<T>().map_or_else(|_| T::NAME.to_string(), |key| key.to_string())
}
