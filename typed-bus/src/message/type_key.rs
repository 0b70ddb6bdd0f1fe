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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::BusError;
use crate::traits::DataContract;

/// The routing identity of a payload contract.
///
/// A `TypeKey` pairs the contract's qualified name with its namespace. Both parts
/// are non-empty and compared exactly (case-sensitive), so two keys are equal only
/// when both components match byte for byte. It is the sole key used by the
/// [`SubscriptionRegistry`](crate::SubscriptionRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    name: String,
    namespace: String,
}

impl TypeKey {
    /// Creates a key from a contract name and namespace.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidTypeKey`] if either component is empty.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Result<Self, BusError> {
        let name = name.into();
        let namespace = namespace.into();
        if name.is_empty() || namespace.is_empty() {
            return Err(BusError::InvalidTypeKey { name, namespace });
        }
        Ok(Self { name, namespace })
    }

    /// Derives the key declared by a [`DataContract`].
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidTypeKey`] if the contract declares an empty
    /// name or namespace.
    pub fn of<T: DataContract>() -> Result<Self, BusError> {
        Self::new(T::NAME, T::NAMESPACE)
    }

    /// The contract's qualified name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The contract's namespace (schema).
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}
