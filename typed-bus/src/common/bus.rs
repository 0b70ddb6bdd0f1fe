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

use std::future::Future;
use std::sync::{Arc, Weak};

use mti::prelude::*;
use static_assertions::assert_impl_all;
use tracing::{debug, info};

use crate::common::{BusConfig, BusError, LocalExchange, Publisher, CONFIG};
use crate::dispatch::{Dispatcher, FilterInfo, Registration, RegistrationBuilder, SubscriptionRegistry};
use crate::message::{BusMessage, TypeKey};
use crate::traits::{DataContract, ErrorSubscriber, NullErrorSubscriber};

/// Configures and builds a [`Bus`].
///
/// Settings not chosen explicitly come from the [`BusConfig`] the builder was
/// created with ([`CONFIG`] for [`BusBuilder::new`]).
///
/// ```rust,ignore
/// let bus = BusBuilder::new()
///     .set_bus_id("orders-7")
///     .use_error_subscriber(TracingErrorSubscriber)
///     .build();
/// ```
pub struct BusBuilder {
    config: BusConfig,
    bus_id: Option<String>,
    receive_self_publish: Option<bool>,
    error_subscriber: Option<Arc<dyn ErrorSubscriber>>,
}

impl Default for BusBuilder {
    fn default() -> Self {
        Self::from_config(CONFIG.clone())
    }
}

impl std::fmt::Debug for BusBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusBuilder")
            .field("config", &self.config)
            .field("bus_id", &self.bus_id)
            .field("receive_self_publish", &self.receive_self_publish)
            .field("error_subscriber", &self.error_subscriber.is_some())
            .finish()
    }
}

impl BusBuilder {
    /// Creates a builder backed by the global [`CONFIG`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder backed by `config`.
    #[must_use]
    pub fn from_config(config: BusConfig) -> Self {
        Self {
            config,
            bus_id: None,
            receive_self_publish: None,
            error_subscriber: None,
        }
    }

    /// Replaces the backing configuration; explicit settings still win.
    #[must_use]
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the identity stamped on outgoing messages and used for self-publish
    /// suppression.
    #[must_use]
    pub fn set_bus_id(mut self, bus_id: impl Into<String>) -> Self {
        self.bus_id = Some(bus_id.into());
        self
    }

    /// Sets the bus-wide self-publish default for subscriptions that don't
    /// choose one.
    #[must_use]
    pub fn set_receive_self_publish(mut self, receive: bool) -> Self {
        self.receive_self_publish = Some(receive);
        self
    }

    /// Installs the error boundary. Defaults to [`NullErrorSubscriber`].
    #[must_use]
    pub fn use_error_subscriber(mut self, subscriber: impl ErrorSubscriber + 'static) -> Self {
        self.error_subscriber = Some(Arc::new(subscriber));
        self
    }

    /// Installs an already shared error boundary.
    #[must_use]
    pub fn use_shared_error_subscriber(mut self, subscriber: Arc<dyn ErrorSubscriber>) -> Self {
        self.error_subscriber = Some(subscriber);
        self
    }

    /// Builds the bus with a fresh, empty registry.
    #[must_use]
    pub fn build(self) -> Bus {
        // An empty id would match every frame published without one.
        let bus_id = self
            .bus_id
            .filter(|id| !id.is_empty())
            .or(self.config.bus.bus_id.filter(|id| !id.is_empty()))
            .unwrap_or_else(|| self.config.bus.id_prefix.as_str().create_type_id::<V7>().to_string());
        let receive_self_publish = self
            .receive_self_publish
            .unwrap_or(self.config.bus.receive_self_publish);
        let error_subscriber = self
            .error_subscriber
            .unwrap_or_else(|| Arc::new(NullErrorSubscriber));

        info!(bus_id = %bus_id, receive_self_publish, "Bus created");
        Bus {
            dispatcher: Dispatcher::new(bus_id, Arc::new(SubscriptionRegistry::new()), error_subscriber),
            receive_self_publish,
        }
    }
}

/// A bus instance: identity, registry, error boundary, and the dispatcher that
/// ties them together.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Debug)]
pub struct Bus {
    dispatcher: Dispatcher,
    receive_self_publish: bool,
}

assert_impl_all!(Bus: Send, Sync, Clone);
assert_impl_all!(SubscriptionRegistry: Send, Sync);

impl Bus {
    /// This bus's identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        self.dispatcher.bus_id()
    }

    /// The bus-wide self-publish default.
    #[inline]
    #[must_use]
    pub fn receive_self_publish(&self) -> bool {
        self.receive_self_publish
    }

    /// Subscribes `handler` to payloads of contract `T`.
    ///
    /// # Errors
    ///
    /// * [`BusError::AlreadyRegistered`] if `T`'s type key already has a subscription.
    /// * [`BusError::InvalidTypeKey`] if `T` declares an empty name or namespace.
    pub fn subscribe<T, F, Fut>(&self, handler: F) -> Result<Subscription, BusError>
    where
        T: DataContract,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register_builder(Registration::for_payload(handler))
    }

    /// Subscribes `handler` to whole messages of contract `T`, headers included.
    ///
    /// # Errors
    ///
    /// Same as [`Bus::subscribe`].
    pub fn subscribe_messages<T, F, Fut>(&self, handler: F) -> Result<Subscription, BusError>
    where
        T: DataContract,
        F: Fn(BusMessage<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register_builder(Registration::for_message(handler))
    }

    /// Subscribes `handler` to payloads of contract `T` with filters chosen by
    /// `configure`.
    ///
    /// ```rust,ignore
    /// let _subscription = bus.subscribe_with(
    ///     |person: Person| async move { Ok(()) },
    ///     |registration| registration.header_filter("Header", "RightValue"),
    /// )?;
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Bus::subscribe`].
    pub fn subscribe_with<T, F, Fut, C>(&self, handler: F, configure: C) -> Result<Subscription, BusError>
    where
        T: DataContract,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
        C: FnOnce(RegistrationBuilder) -> RegistrationBuilder,
    {
        self.register_builder(configure(Registration::for_payload(handler)))
    }

    /// Registers a fully built registration.
    ///
    /// The bus-wide self-publish default does not apply here; the registration
    /// already carries its filter.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::AlreadyRegistered`] if the type key is taken; the
    /// existing registration stays in effect.
    pub fn register(&self, registration: Registration) -> Result<Subscription, BusError> {
        let type_key = registration.type_key().clone();
        let registry = self.dispatcher.registry();
        match registry.insert_if_absent(registration) {
            Some(stored) => {
                debug!(bus_id = self.id(), type_key = %type_key, "Subscription added");
                Ok(Subscription {
                    registry: Arc::downgrade(registry),
                    registration: stored,
                })
            }
            None => Err(BusError::AlreadyRegistered(type_key)),
        }
    }

    fn register_builder(&self, builder: RegistrationBuilder) -> Result<Subscription, BusError> {
        self.register(builder.inherit_self_publish(self.receive_self_publish).build()?)
    }

    /// The dispatcher that feeds inbound frames to this bus's subscriptions.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Every subscription's filter, e.g. to declare broker-side bindings.
    #[must_use]
    pub fn applicable_filters(&self) -> Vec<FilterInfo> {
        self.dispatcher.get_applicable_filters()
    }

    /// A publisher that stamps this bus's id and sends through `exchange`.
    #[must_use]
    pub fn create_publisher(&self, exchange: &LocalExchange) -> Publisher {
        Publisher::new(self.id().to_string(), exchange.clone())
    }
}

/// A live subscription. Dropping it (or calling [`close`](Subscription::close))
/// removes its registration from the bus.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<SubscriptionRegistry>,
    registration: Arc<Registration>,
}

impl Subscription {
    /// The type key this subscription answers to.
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        self.registration.type_key()
    }

    /// The subscription's filter.
    #[must_use]
    pub fn filter(&self) -> &FilterInfo {
        self.registration.filter()
    }

    /// Unsubscribes now.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_exact(&self.registration);
        }
    }
}
