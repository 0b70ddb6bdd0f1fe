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
use tracing::{debug, error, warn};

use crate::common::BusError;
use crate::message::Envelope;

/// The error boundary of the dispatcher.
///
/// Every per-message outcome other than a successful handler call is funneled
/// here; nothing escapes [`Dispatcher::translate`](crate::Dispatcher::translate)
/// or [`Dispatcher::dispatch`](crate::Dispatcher::dispatch). Notifications are
/// fire-and-forget: the dispatcher does not wait on or inspect anything they do,
/// and may call them concurrently from many tasks.
///
/// All methods default to doing nothing, so an implementation only overrides what
/// it cares about.
///
/// Without an explicit subscriber a bus uses [`NullErrorSubscriber`], which
/// discards every failure silently. Production code should install a real one,
/// such as [`TracingErrorSubscriber`].
pub trait ErrorSubscriber: Send + Sync {
    /// A message arrived whose type key has no registration.
    fn on_unregistered_message(&self, envelope: &Envelope) {
        let _ = envelope;
    }

    /// A registration exists but its filter rejected the message.
    fn on_message_filtered_out(&self, envelope: &Envelope) {
        let _ = envelope;
    }

    /// The frame was malformed or the body did not match the registered contract.
    ///
    /// For malformed frames `envelope` is partial and may lack a type key.
    fn on_deserialize_exception(&self, envelope: &Envelope, error: &BusError) {
        let _ = (envelope, error);
    }

    /// The handler returned an error or panicked.
    fn on_dispatch_exception(&self, envelope: &Envelope, error: &BusError) {
        let _ = (envelope, error);
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullErrorSubscriber;

impl ErrorSubscriber for NullErrorSubscriber {}

/// Reports every notification as a `tracing` event.
///
/// Unregistered and filtered messages are expected on a shared bus and logged at
/// `debug`; deserialize failures at `warn`; handler failures at `error`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorSubscriber;

fn key_label(envelope: &Envelope) -> String {
    envelope
        .type_key()
        .map_or_else(|| "<unknown>".to_string(), ToString::to_string)
}

impl ErrorSubscriber for TracingErrorSubscriber {
    fn on_unregistered_message(&self, envelope: &Envelope) {
        debug!(type_key = %key_label(envelope), origin = envelope.bus_id(), "Unregistered message arrived");
    }

    fn on_message_filtered_out(&self, envelope: &Envelope) {
        debug!(type_key = %key_label(envelope), origin = envelope.bus_id(), "Message filtered out");
    }

    fn on_deserialize_exception(&self, envelope: &Envelope, error: &BusError) {
        warn!(
            type_key = %key_label(envelope),
            origin = envelope.bus_id(),
            label = error.as_label(),
            error = %error,
            "Message deserialize exception"
        );
    }

    fn on_dispatch_exception(&self, envelope: &Envelope, error: &BusError) {
        error!(
            type_key = %key_label(envelope),
            origin = envelope.bus_id(),
            label = error.as_label(),
            error = %error,
            "Message dispatch exception"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::message::TypeKey;

    #[test]
    fn test_stock_subscribers_accept_every_notification() {
        let envelope = Envelope::new("bus-1", TypeKey::new("Person", "urn:people").unwrap(), vec![]);
        let error = BusError::HandlerPanicked("boom".into());

        let subscribers: Vec<Arc<dyn ErrorSubscriber>> =
            vec![Arc::new(NullErrorSubscriber), Arc::new(TracingErrorSubscriber)];
        for subscriber in subscribers {
            subscriber.on_unregistered_message(&envelope);
            subscriber.on_message_filtered_out(&envelope);
            subscriber.on_deserialize_exception(&envelope, &error);
            subscriber.on_dispatch_exception(&envelope, &error);
        }
    }
}
