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
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A payload type that can travel over the bus.
///
/// A contract names itself with a `(NAME, NAMESPACE)` pair; that pair becomes the
/// [`TypeKey`](crate::TypeKey) stamped on every frame carrying it and the key its
/// handlers are registered under. Both constants must be non-empty.
///
/// Usually implemented through the `#[bus_contract]` attribute, which defaults the
/// name to the type's identifier and the namespace to the declaring module path:
///
/// ```rust,ignore
/// use typed_bus::prelude::*;
///
/// #[bus_contract(name = "Person", namespace = "urn:people")]
/// pub struct Person {
///     pub id: u32,
/// }
/// ```
pub trait DataContract: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// The contract's qualified name.
    const NAME: &'static str;
    /// The contract's namespace (schema).
    const NAMESPACE: &'static str;
}
