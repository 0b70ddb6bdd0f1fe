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

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use static_assertions::assert_impl_all;
use tracing::{instrument, trace, warn};

use crate::common::BusError;
use crate::dispatch::{evaluate, FilterInfo, Registration, SubscriptionRegistry};
use crate::message::{Envelope, EnvelopeReader, MalformedEnvelope};
use crate::traits::{ErrorSubscriber, NullErrorSubscriber};

/// Why a frame was not handed to a handler, or why the handler failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// No registration for the frame's type key.
    Unregistered,
    /// The registration's filter rejected the message.
    Filtered,
    /// The frame was malformed or its body did not match the contract.
    DeserializeFailed,
    /// The handler returned an error or panicked.
    HandlerFailed,
}

/// The outcome of dispatching one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The handler ran to completion.
    Handled,
    /// The message stopped short; the error subscriber has been told.
    Rejected(RejectReason),
}

impl Disposition {
    /// Whether the handler ran to completion.
    #[inline]
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Turns raw frames into handler calls.
///
/// A dispatcher holds nothing but the bus identity, a handle to the bus's
/// [`SubscriptionRegistry`], and the [`ErrorSubscriber`] every per-message
/// failure is reported to. It is cheap to clone and safe to call from any number
/// of tasks at once; each frame is processed independently and one message's
/// failure never affects another.
///
/// Processing a frame runs in a fixed order:
///
/// 1. read the header section ([`EnvelopeReader`]);
/// 2. resolve the registration by type key;
/// 3. evaluate its [`FilterInfo`];
/// 4. deserialize the body with the registration's deserializer;
/// 5. invoke the handler (only in [`dispatch`](Dispatcher::dispatch)).
///
/// Only messages that reach step 4 are ever deserialized.
#[derive(Clone)]
pub struct Dispatcher {
    bus_id: String,
    registry: Arc<SubscriptionRegistry>,
    error_subscriber: Arc<dyn ErrorSubscriber>,
}

assert_impl_all!(Dispatcher: Send, Sync, Clone);

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bus_id", &self.bus_id)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher for the bus `bus_id`.
    pub fn new(
        bus_id: impl Into<String>,
        registry: Arc<SubscriptionRegistry>,
        error_subscriber: Arc<dyn ErrorSubscriber>,
    ) -> Self {
        Self {
            bus_id: bus_id.into(),
            registry,
            error_subscriber,
        }
    }

    /// Creates a dispatcher that discards every failure notification.
    pub fn with_registry(bus_id: impl Into<String>, registry: Arc<SubscriptionRegistry>) -> Self {
        Self::new(bus_id, registry, Arc::new(NullErrorSubscriber))
    }

    /// Identity of the local bus, used for self-publish suppression.
    #[inline]
    #[must_use]
    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// The registry this dispatcher resolves against.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Adds a registration unless its type key is taken. See
    /// [`SubscriptionRegistry::register_type`].
    pub fn register_type(&self, registration: Registration) -> bool {
        self.registry.register_type(registration)
    }

    /// Every registration's filter, e.g. to declare broker-side bindings.
    #[must_use]
    pub fn get_applicable_filters(&self) -> Vec<FilterInfo> {
        self.registry.all_filters()
    }

    /// Reads, resolves, filters, and deserializes a frame without running a handler.
    ///
    /// Returns the envelope with its body filled in, or `None` if the message was
    /// rejected at any step; the rejection has been reported to the error
    /// subscriber.
    #[instrument(skip_all, fields(bus_id = %self.bus_id), level = "trace")]
    pub fn translate(&self, raw: &[u8]) -> Option<Envelope> {
        self.resolve(raw).ok().map(|(envelope, _)| envelope)
    }

    /// Processes a frame end to end, handler included.
    ///
    /// Handler errors and panics are caught and reported through
    /// [`ErrorSubscriber::on_dispatch_exception`]; they never propagate to the
    /// caller.
    #[instrument(skip_all, fields(bus_id = %self.bus_id), level = "trace")]
    pub async fn dispatch(&self, raw: &[u8]) -> Disposition {
        let (envelope, registration) = match self.resolve(raw) {
            Ok(resolved) => resolved,
            Err(reason) => return Disposition::Rejected(reason),
        };

        let outcome = AssertUnwindSafe(registration.handler().handle(&envelope))
            .catch_unwind()
            .await;
        let error = match outcome {
            Ok(Ok(())) => {
                trace!(type_key = %registration.type_key(), "Message handled");
                return Disposition::Handled;
            }
            Ok(Err(e)) => BusError::HandlerFailed(e),
            Err(panic) => BusError::HandlerPanicked(panic_message(&*panic)),
        };
        self.error_subscriber.on_dispatch_exception(&envelope, &error);
        Disposition::Rejected(RejectReason::HandlerFailed)
    }

    fn resolve(&self, raw: &[u8]) -> Result<(Envelope, Arc<Registration>), RejectReason> {
        let (mut envelope, body) = match EnvelopeReader::read(raw) {
            Ok(parts) => parts,
            Err(MalformedEnvelope { envelope, error }) => {
                warn!(error = %error, "Discarding malformed frame");
                self.error_subscriber.on_deserialize_exception(&envelope, &error);
                return Err(RejectReason::DeserializeFailed);
            }
        };

        let Some(registration) = envelope.type_key().and_then(|key| self.registry.lookup(key)) else {
            self.error_subscriber.on_unregistered_message(&envelope);
            return Err(RejectReason::Unregistered);
        };

        let verdict = evaluate(registration.filter(), &envelope, &self.bus_id);
        if !verdict.is_accepted() {
            trace!(type_key = %registration.type_key(), ?verdict, "Message filtered out");
            self.error_subscriber.on_message_filtered_out(&envelope);
            return Err(RejectReason::Filtered);
        }

        let payload = panic::catch_unwind(AssertUnwindSafe(|| registration.deserialize(&body)))
            .unwrap_or_else(|panic| {
                Err(BusError::Deserialize {
                    contract: registration.type_key().to_string(),
                    reason: format!("deserializer panicked: {}", panic_message(&*panic)),
                })
            });
        if let Err(error) = payload.and_then(|payload| envelope.set_body(payload)) {
            self.error_subscriber.on_deserialize_exception(&envelope, &error);
            return Err(RejectReason::DeserializeFailed);
        }

        Ok((envelope, registration))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
