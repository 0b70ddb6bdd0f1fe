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

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::dispatch::{FilterInfo, Registration};
use crate::message::TypeKey;

/// Concurrent map from [`TypeKey`] to [`Registration`].
///
/// Each bus owns exactly one registry. Registration is insert-if-absent: the
/// first registration for a key wins and later attempts leave it untouched, even
/// when many threads race on the same key. Lookups hand out `Arc` clones so no
/// map guard is held while a message is deserialized or handled.
#[derive(Default)]
pub struct SubscriptionRegistry {
    registrations: DashMap<TypeKey, Arc<Registration>>,
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("registered_types", &self.registrations.len())
            .finish()
    }
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `registration` unless its type key is already taken.
    ///
    /// Returns `true` if this call inserted it, `false` if an existing
    /// registration was kept.
    pub fn register_type(&self, registration: Registration) -> bool {
        self.insert_if_absent(registration).is_some()
    }

    /// Inserts `registration` if its key is free and returns the stored handle.
    pub(crate) fn insert_if_absent(&self, registration: Registration) -> Option<Arc<Registration>> {
        match self.registrations.entry(registration.type_key().clone()) {
            Entry::Occupied(occupied) => {
                debug!(type_key = %occupied.key(), "Type key already registered; keeping first registration");
                None
            }
            Entry::Vacant(vacant) => {
                trace!(type_key = %vacant.key(), "Registered type key");
                let stored = Arc::new(registration);
                vacant.insert(Arc::clone(&stored));
                Some(stored)
            }
        }
    }

    /// Removes `registration` only if it is still the one stored under its key.
    pub(crate) fn remove_exact(&self, registration: &Arc<Registration>) -> bool {
        let removed = self
            .registrations
            .remove_if(registration.type_key(), |_, stored| Arc::ptr_eq(stored, registration))
            .is_some();
        if removed {
            trace!(type_key = %registration.type_key(), "Subscription released");
        }
        removed
    }

    /// The registration for `type_key`, if any.
    #[must_use]
    pub fn lookup(&self, type_key: &TypeKey) -> Option<Arc<Registration>> {
        self.registrations
            .get(type_key)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether `type_key` has a registration.
    #[must_use]
    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.registrations.contains_key(type_key)
    }

    /// Removes and returns the registration for `type_key`.
    ///
    /// Dispatches already holding the registration finish normally.
    pub fn unregister(&self, type_key: &TypeKey) -> Option<Arc<Registration>> {
        let removed = self.registrations.remove(type_key).map(|(_, registration)| registration);
        if removed.is_some() {
            trace!(type_key = %type_key, "Unregistered type key");
        }
        removed
    }

    /// A snapshot of every registration's filter, e.g. for broker-side bindings.
    ///
    /// Order is unspecified.
    #[must_use]
    pub fn all_filters(&self) -> Vec<FilterInfo> {
        self.registrations
            .iter()
            .map(|entry| entry.value().filter().clone())
            .collect()
    }

    /// A snapshot of every registered type key. Order is unspecified.
    #[must_use]
    pub fn type_keys(&self) -> Vec<TypeKey> {
        self.registrations.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered type keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
