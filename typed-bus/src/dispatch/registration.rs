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
use std::future::Future;
use std::sync::Arc;

use crate::common::BusError;
use crate::dispatch::{FilterInfo, HeaderPredicate};
use crate::message::{BodyReader, BusMessage, TypeKey};
use crate::traits::{
    json_deserializer, BusPayload, DataContract, DeserializerFn, MessageFn, MessageHandler,
    PayloadFn,
};

/// Everything the dispatcher needs to deliver one payload contract.
///
/// A registration is immutable once built and is shared between the registry and
/// every in-flight dispatch through an `Arc`.
pub struct Registration {
    type_key: TypeKey,
    deserializer: DeserializerFn,
    handler: Arc<dyn MessageHandler>,
    filter: FilterInfo,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("type_key", &self.type_key)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Assembles a registration from explicit parts.
    pub fn new(
        type_key: TypeKey,
        deserializer: DeserializerFn,
        handler: Arc<dyn MessageHandler>,
        filter: FilterInfo,
    ) -> Self {
        Self {
            type_key,
            deserializer,
            handler,
            filter,
        }
    }

    /// Starts a registration for contract `T` whose handler receives the bare payload.
    ///
    /// ```rust,ignore
    /// let registration = Registration::for_payload(|person: Person| async move {
    ///     tracing::info!(id = person.id, "arrived");
    ///     Ok(())
    /// })
    /// .header_filter("Header", "RightValue")
    /// .build()?;
    /// ```
    pub fn for_payload<T, F, Fut>(handler: F) -> RegistrationBuilder
    where
        T: DataContract,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::builder::<T>(Arc::new(PayloadFn::new(handler)))
    }

    /// Starts a registration for contract `T` whose handler receives the whole
    /// [`BusMessage`], headers and origin included.
    pub fn for_message<T, F, Fut>(handler: F) -> RegistrationBuilder
    where
        T: DataContract,
        F: Fn(BusMessage<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::builder::<T>(Arc::new(MessageFn::new(handler)))
    }

    /// Starts a registration for contract `T` with a hand-written handler.
    ///
    /// The JSON deserializer for `T` is preselected; the handler can rely on
    /// `envelope.payload::<T>()`.
    pub fn builder<T: DataContract>(handler: Arc<dyn MessageHandler>) -> RegistrationBuilder {
        RegistrationBuilder {
            type_key: TypeKey::of::<T>(),
            deserializer: json_deserializer::<T>(),
            handler,
            receive_self_publish: None,
            predicates: Vec::new(),
        }
    }

    /// The routing key this registration answers to.
    #[inline]
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// The delivery policy.
    #[inline]
    #[must_use]
    pub fn filter(&self) -> &FilterInfo {
        &self.filter
    }

    /// The bound handler.
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn MessageHandler> {
        &self.handler
    }

    /// The bound deserializer.
    #[inline]
    #[must_use]
    pub fn deserializer(&self) -> &DeserializerFn {
        &self.deserializer
    }

    pub(crate) fn deserialize(&self, body: &BodyReader<'_>) -> Result<Box<dyn BusPayload>, BusError> {
        (self.deserializer)(body)
    }
}

/// Typed builder for a [`Registration`].
///
/// Obtained from [`Registration::for_payload`], [`Registration::for_message`], or
/// [`Registration::builder`]. An invalid contract identity is remembered and
/// reported by [`build`](RegistrationBuilder::build).
pub struct RegistrationBuilder {
    type_key: Result<TypeKey, BusError>,
    deserializer: DeserializerFn,
    handler: Arc<dyn MessageHandler>,
    receive_self_publish: Option<bool>,
    predicates: Vec<HeaderPredicate>,
}

impl fmt::Debug for RegistrationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationBuilder")
            .field("type_key", &self.type_key)
            .field("receive_self_publish", &self.receive_self_publish)
            .field("predicates", &self.predicates)
            .finish_non_exhaustive()
    }
}

impl RegistrationBuilder {
    /// Whether messages published by the local bus are delivered. Defaults to `false`.
    #[must_use]
    pub fn receive_self_publish(mut self, receive: bool) -> Self {
        self.receive_self_publish = Some(receive);
        self
    }

    /// Requires a header `name` whose value equals `value` exactly.
    #[must_use]
    pub fn header_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates.push(HeaderPredicate::equals(name, value));
        self
    }

    /// Requires a header `name` whose value satisfies `matcher`.
    #[must_use]
    pub fn header_matcher<F>(mut self, name: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(HeaderPredicate::custom(name, matcher));
        self
    }

    /// Replaces the contract's JSON deserializer.
    #[must_use]
    pub fn deserializer(mut self, deserializer: DeserializerFn) -> Self {
        self.deserializer = deserializer;
        self
    }

    /// Applies a bus-wide self-publish default unless one was chosen explicitly.
    pub(crate) fn inherit_self_publish(mut self, default: bool) -> Self {
        self.receive_self_publish.get_or_insert(default);
        self
    }

    /// Finishes the registration.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidTypeKey`] if the contract declares an empty name
    /// or namespace.
    pub fn build(self) -> Result<Registration, BusError> {
        let type_key = self.type_key?;
        let filter = FilterInfo::new(self.receive_self_publish.unwrap_or(false), self.predicates);
        Ok(Registration::new(
            type_key,
            self.deserializer,
            self.handler,
            filter,
        ))
    }
}
