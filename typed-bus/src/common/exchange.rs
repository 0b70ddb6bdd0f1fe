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

use futures::future::join_all;
use parking_lot::RwLock;
use static_assertions::assert_impl_all;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, trace};

use crate::common::{Bus, LimitsConfig, CONFIG};
use crate::dispatch::Dispatcher;

/// An in-process stand-in for a broker fanout exchange.
///
/// Buses bind their dispatcher to the exchange; every published frame is handed
/// to each bound dispatcher concurrently. At most
/// [`LimitsConfig::max_concurrent_dispatches`] dispatches run at once across all
/// in-flight publishes. Cloning yields another handle to the same exchange.
#[derive(Clone)]
pub struct LocalExchange {
    bound: Arc<RwLock<Vec<Dispatcher>>>,
    limiter: Arc<Semaphore>,
    max_concurrent_dispatches: usize,
}

assert_impl_all!(LocalExchange: Send, Sync, Clone);

impl std::fmt::Debug for LocalExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalExchange")
            .field("bound", &self.bound_count())
            .field("max_concurrent_dispatches", &self.max_concurrent_dispatches)
            .finish()
    }
}

impl Default for LocalExchange {
    fn default() -> Self {
        Self::with_limits(&CONFIG.limits)
    }
}

impl LocalExchange {
    /// Creates an exchange using the global configuration's limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an exchange with explicit limits. A limit of zero is treated as one.
    #[must_use]
    pub fn with_limits(limits: &LimitsConfig) -> Self {
        let max_concurrent_dispatches = limits.max_concurrent_dispatches.max(1);
        Self {
            bound: Arc::new(RwLock::new(Vec::new())),
            limiter: Arc::new(Semaphore::new(max_concurrent_dispatches)),
            max_concurrent_dispatches,
        }
    }

    /// Binds `bus` so it receives every frame published here.
    ///
    /// Returns `false` if a bus with the same id is already bound.
    pub fn bind(&self, bus: &Bus) -> bool {
        let mut bound = self.bound.write();
        if bound.iter().any(|dispatcher| dispatcher.bus_id() == bus.id()) {
            debug!(bus_id = bus.id(), "Bus already bound to exchange");
            return false;
        }
        bound.push(bus.dispatcher().clone());
        trace!(bus_id = bus.id(), bound = bound.len(), "Bus bound to exchange");
        true
    }

    /// Unbinds the bus with id `bus_id`. Returns whether it was bound.
    pub fn unbind(&self, bus_id: &str) -> bool {
        let mut bound = self.bound.write();
        let before = bound.len();
        bound.retain(|dispatcher| dispatcher.bus_id() != bus_id);
        before != bound.len()
    }

    /// Number of bound buses.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bound.read().len()
    }

    /// Hands `frame` to every bound bus and waits for all dispatches to finish.
    ///
    /// Returns the number of buses whose handler ran to completion. Rejections
    /// and handler failures are reported through each bus's own error subscriber.
    #[instrument(skip_all, fields(frame_len = frame.len()), level = "trace")]
    pub async fn publish(&self, frame: &[u8]) -> usize {
        // Snapshot so no lock is held across dispatch.
        let targets: Vec<Dispatcher> = self.bound.read().clone();
        let fanout = targets.len();

        let dispatches = targets.iter().map(|dispatcher| async move {
            // The semaphore is never closed, so a permit is always granted.
            let _permit = self.limiter.acquire().await.ok();
            dispatcher.dispatch(frame).await
        });
        let handled = join_all(dispatches)
            .await
            .into_iter()
            .filter(|disposition| disposition.is_handled())
            .count();

        trace!(fanout, handled, "Frame published");
        handled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::common::{BusBuilder, BusConfig};

    #[typed_bus_macro::bus_contract(namespace = "urn:people")]
    struct Person {
        id: u32,
    }

    fn bus(id: &str) -> Bus {
        BusBuilder::from_config(BusConfig::default()).set_bus_id(id).build()
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let exchange = LocalExchange::with_limits(&LimitsConfig {
            max_concurrent_dispatches: 0,
        });
        assert_eq!(exchange.limiter.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_publish_counts_handled_buses() {
        let exchange = LocalExchange::with_limits(&LimitsConfig::default());
        let (one, two, three) = (bus("one"), bus("two"), bus("three"));
        let _one = one.subscribe(|_: Person| async { Ok(()) }).unwrap();
        let _two = two.subscribe(|_: Person| async { Ok(()) }).unwrap();
        for bus in [&one, &two, &three] {
            assert!(exchange.bind(bus));
        }

        // `one` suppresses its own publish and `three` has no subscription.
        let handled = one.create_publisher(&exchange).publish(Person { id: 1 }).await.unwrap();
        assert_eq!(handled, 1);
        assert_eq!(exchange.limiter.available_permits(), 64);
    }

    #[tokio::test]
    async fn test_limit_is_shared_across_publishes() {
        let exchange = LocalExchange::with_limits(&LimitsConfig {
            max_concurrent_dispatches: 1,
        });
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let origin = bus("origin");
        let receivers = [bus("a"), bus("b")];
        let mut subscriptions = Vec::new();
        for receiver in &receivers {
            let (in_flight, peak) = (in_flight.clone(), peak.clone());
            let subscription = receiver
                .subscribe(move |_: Person| {
                    let (in_flight, peak) = (in_flight.clone(), peak.clone());
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .unwrap();
            subscriptions.push(subscription);
            assert!(exchange.bind(receiver));
        }

        let publisher = origin.create_publisher(&exchange);
        let (first, second) = tokio::join!(
            publisher.publish(Person { id: 1 }),
            publisher.publish(Person { id: 2 })
        );

        assert_eq!(first.unwrap() + second.unwrap(), 4);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(exchange.limiter.available_permits(), 1);
    }
}
