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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Typed Bus
//!
//! A typed publish/subscribe client for AMQP-style brokers. Producers publish
//! strongly-typed payloads; consumers register handlers per payload contract;
//! the bus routes, filters, and deserializes inbound messages so application
//! code never touches the wire format.
//!
//! ## Key Concepts
//!
//! - **Contracts (`DataContract`)**: payload types carry a stable
//!   `(name, namespace)` identity, usually declared with `#[bus_contract]`.
//! - **Type keys (`TypeKey`)**: the routing identity read from every frame.
//! - **Registrations (`Registration`)**: a deserializer, a handler, and a
//!   `FilterInfo` bound to one type key.
//! - **Registry (`SubscriptionRegistry`)**: concurrent insert-if-absent map of
//!   registrations; one per bus.
//! - **Dispatcher (`Dispatcher`)**: reads a frame, resolves the registration,
//!   applies the filter, deserializes only what is wanted, and invokes the
//!   handler. Per-message failures go to an `ErrorSubscriber` and never
//!   escape.
//! - **Bus (`Bus`, `BusBuilder`)**: identity, configuration, subscriptions,
//!   and publishers wired together.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use typed_bus::prelude::*;
//!
//! #[bus_contract(namespace = "urn:people")]
//! struct Person {
//!     id: u32,
//! }
//!
//! let bus = BusBuilder::new().set_bus_id("orders").build();
//! let _subscription = bus.subscribe::<Person, _, _>(|person| async move {
//!     tracing::info!(id = person.id, "person arrived");
//!     Ok(())
//! })?;
//! ```

// Lets `#[bus_contract]` expand to `::typed_bus::...` paths inside this crate too.
extern crate self as typed_bus;

/// Bus facade, configuration, telemetry, and the in-process exchange.
pub(crate) mod common;

/// Registry, filter evaluation, registrations, and the dispatcher.
pub(crate) mod dispatch;

/// Type keys, envelopes, the envelope reader, and the wire codec.
pub(crate) mod message;

/// Core traits: contracts, payloads, handlers, and the error boundary.
pub(crate) mod traits;

#[doc(hidden)]
pub use serde;

pub use common::{
    init_tracing, Bus, BusBuilder, BusConfig, BusError, BusSettings, LimitsConfig, LocalExchange,
    Publisher, Subscription, TracingConfig, CONFIG,
};
pub use dispatch::{
    evaluate, passes, Disposition, Dispatcher, FilterInfo, FilterVerdict, HeaderMatcher,
    HeaderPredicate, RejectReason, Registration, RegistrationBuilder, SubscriptionRegistry,
};
pub use message::{
    encode, BodyReader, BusHeader, BusMessage, Envelope, EnvelopeReader, MalformedEnvelope,
    TypeKey,
};
pub use traits::{
    json_deserializer, BusPayload, DataContract, DeserializerFn, ErrorSubscriber,
    MessageHandler, NullErrorSubscriber, TracingErrorSubscriber,
};

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `typed-bus-macro`)
/// *   [`typed_bus_macro::bus_contract`]: Attribute macro declaring a payload contract.
///
/// ## External Crates
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html):
///     needed to implement [`MessageHandler`] and friends by hand.
///
/// ## Core Types
/// *   [`Bus`], [`BusBuilder`], [`Subscription`], [`Publisher`], [`LocalExchange`]
/// *   [`Dispatcher`], [`Disposition`], [`RejectReason`]
/// *   [`Registration`], [`FilterInfo`], [`HeaderMatcher`], [`SubscriptionRegistry`]
/// *   [`Envelope`], [`BusMessage`], [`BusHeader`], [`TypeKey`]
/// *   [`DataContract`], [`MessageHandler`], [`ErrorSubscriber`], [`BusError`]
pub mod prelude {
    pub use typed_bus_macro::*;

    pub use async_trait::async_trait;

    pub use crate::common::{Bus, BusBuilder, BusConfig, BusError, LocalExchange, Publisher, Subscription};
    pub use crate::dispatch::{
        Disposition, Dispatcher, FilterInfo, HeaderMatcher, RejectReason, Registration,
        RegistrationBuilder, SubscriptionRegistry,
    };
    pub use crate::message::{BodyReader, BusHeader, BusMessage, Envelope, TypeKey};
    pub use crate::traits::{
        BusPayload, DataContract, ErrorSubscriber, MessageHandler, NullErrorSubscriber,
        TracingErrorSubscriber,
    };
}
