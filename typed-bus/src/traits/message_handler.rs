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
use std::marker::PhantomData;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::message::{BusMessage, Envelope};
use crate::traits::DataContract;

/// Application logic bound to a registration.
///
/// The dispatcher calls [`handle`](MessageHandler::handle) only with envelopes
/// that passed the registration's filter and whose body was deserialized by the
/// registration's own deserializer. Returning an error (or panicking) is
/// contained: the failure is reported to the
/// [`ErrorSubscriber`](crate::ErrorSubscriber) and delivery of other messages
/// carries on.
///
/// Implement this directly when the handler needs the whole envelope; typed
/// closures are adapted through
/// [`Registration::for_payload`](crate::Registration::for_payload) and
/// [`Registration::for_message`](crate::Registration::for_message).
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Processes one fully materialized envelope.
    async fn handle(&self, envelope: &Envelope) -> anyhow::Result<()>;
}

/// Adapts `Fn(T) -> Future` into a [`MessageHandler`].
pub(crate) struct PayloadFn<T, F> {
    f: F,
    _contract: PhantomData<fn(T)>,
}

impl<T, F> PayloadFn<T, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _contract: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F, Fut> MessageHandler for PayloadFn<T, F>
where
    T: DataContract,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, envelope: &Envelope) -> anyhow::Result<()> {
        let payload = envelope
            .payload::<T>()
            .cloned()
            .ok_or_else(|| anyhow!("envelope body is not a {}", T::NAME))?;
        (self.f)(payload).await
    }
}

/// Adapts `Fn(BusMessage<T>) -> Future` into a [`MessageHandler`].
pub(crate) struct MessageFn<T, F> {
    f: F,
    _contract: PhantomData<fn(T)>,
}

impl<T, F> MessageFn<T, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _contract: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F, Fut> MessageHandler for MessageFn<T, F>
where
    T: DataContract,
    F: Fn(BusMessage<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, envelope: &Envelope) -> anyhow::Result<()> {
        let message = envelope
            .to_message::<T>()
            .ok_or_else(|| anyhow!("envelope body is not a {}", T::NAME))?;
        (self.f)(message).await
    }
}
