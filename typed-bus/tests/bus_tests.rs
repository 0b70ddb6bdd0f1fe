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

use parking_lot::Mutex;
use typed_bus::prelude::*;
use typed_bus::{BusSettings, LimitsConfig};

use crate::setup::*;

mod setup;

fn config() -> BusConfig {
    BusConfig::default()
}

fn bus(id: &str, recorder: &Arc<RecordingErrorSubscriber>) -> Bus {
    BusBuilder::from_config(config())
        .set_bus_id(id)
        .use_shared_error_subscriber(recorder.clone())
        .build()
}

fn header_filtered_person_subscription(
    bus: &Bus,
    sink: &Arc<Mutex<Vec<Person>>>,
) -> anyhow::Result<Subscription> {
    let sink = sink.clone();
    Ok(bus.subscribe_with(
        move |person: Person| {
            let sink = sink.clone();
            async move {
                sink.lock().push(person);
                Ok(())
            }
        },
        |registration| registration.header_filter("Header", "RightValue"),
    )?)
}

#[tokio::test]
async fn test_end_to_end_between_two_buses() -> anyhow::Result<()> {
    initialize_tracing();
    let exchange = LocalExchange::with_limits(&LimitsConfig::default());
    let recorder_one = Arc::new(RecordingErrorSubscriber::default());
    let recorder_two = Arc::new(RecordingErrorSubscriber::default());
    let bus_one = bus("B1", &recorder_one);
    let bus_two = bus("B2", &recorder_two);

    let on_one = Arc::new(Mutex::new(Vec::new()));
    let on_two = Arc::new(Mutex::new(Vec::new()));
    let _sub_one = header_filtered_person_subscription(&bus_one, &on_one)?;
    let _sub_two = header_filtered_person_subscription(&bus_two, &on_two)?;

    assert!(exchange.bind(&bus_one));
    assert!(exchange.bind(&bus_two));
    assert!(!exchange.bind(&bus_two));
    assert_eq!(exchange.bound_count(), 2);

    let publisher = bus_one.create_publisher(&exchange);
    let message = BusMessage::new(Person { id: 5 }).with_header("Header", "RightValue");
    let handled = publisher.send(message).await?;

    assert_eq!(handled, 1);
    assert!(on_one.lock().is_empty());
    assert_eq!(*on_two.lock(), vec![Person { id: 5 }]);
    assert_eq!(recorder_one.count(Notice::FilteredOut), 1);
    assert_eq!(recorder_two.total(), 0);
    Ok(())
}

#[tokio::test]
async fn test_publisher_stamps_origin_and_time() -> anyhow::Result<()> {
    initialize_tracing();
    let exchange = LocalExchange::with_limits(&LimitsConfig::default());
    let recorder = Arc::new(RecordingErrorSubscriber::default());
    let sender = bus("sender", &recorder);
    let receiver = bus("receiver", &recorder);

    let seen: Arc<Mutex<Vec<BusMessage<Order>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = receiver.subscribe_messages(move |message: BusMessage<Order>| {
        let sink = sink.clone();
        async move {
            sink.lock().push(message);
            Ok(())
        }
    })?;
    exchange.bind(&receiver);

    let mut message = BusMessage::new(Order {
        sku: "A-1".into(),
        quantity: 2,
    });
    message.bus_id = "spoofed".into();
    let handled = sender.create_publisher(&exchange).send(message).await?;
    assert_eq!(handled, 1);

    let delivered = seen.lock().pop().expect("order not delivered");
    assert_eq!(delivered.bus_id, "sender");
    assert!(delivered.sent.is_some());
    assert_eq!(delivered.data.quantity, 2);
    Ok(())
}

#[tokio::test]
async fn test_bus_wide_self_publish_default() -> anyhow::Result<()> {
    initialize_tracing();
    let exchange = LocalExchange::with_limits(&LimitsConfig::default());
    let mut config = config();
    config.bus = BusSettings {
        bus_id: Some("loopback".into()),
        receive_self_publish: true,
        ..BusSettings::default()
    };
    let bus = BusBuilder::from_config(config).build();
    assert_eq!(bus.id(), "loopback");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = bus.subscribe(move |person: Person| {
        let sink = sink.clone();
        async move {
            sink.lock().push(person.id);
            Ok(())
        }
    })?;
    exchange.bind(&bus);

    assert_eq!(bus.create_publisher(&exchange).publish(Person { id: 9 }).await?, 1);
    assert_eq!(*seen.lock(), vec![9]);
    Ok(())
}

#[tokio::test]
async fn test_dropped_subscription_stops_delivery() -> anyhow::Result<()> {
    initialize_tracing();
    let exchange = LocalExchange::with_limits(&LimitsConfig::default());
    let recorder = Arc::new(RecordingErrorSubscriber::default());
    let sender = bus("sender", &Arc::new(RecordingErrorSubscriber::default()));
    let receiver = bus("receiver", &recorder);
    exchange.bind(&receiver);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscription = header_filtered_person_subscription(&receiver, &seen)?;
    let publisher = sender.create_publisher(&exchange);
    let message = BusMessage::new(Person { id: 1 }).with_header("Header", "RightValue");

    assert_eq!(publisher.send(message.clone()).await?, 1);
    drop(subscription);
    assert!(receiver.applicable_filters().is_empty());
    assert_eq!(publisher.send(message).await?, 0);

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(recorder.count(Notice::Unregistered), 1);
    Ok(())
}

#[tokio::test]
async fn test_unbind_detaches_bus() -> anyhow::Result<()> {
    initialize_tracing();
    let exchange = LocalExchange::with_limits(&LimitsConfig {
        max_concurrent_dispatches: 1,
    });
    let recorder = Arc::new(RecordingErrorSubscriber::default());
    let receiver = bus("receiver", &recorder);
    let _subscription = receiver.subscribe(|_: Person| async { Ok(()) })?;
    exchange.bind(&receiver);

    let publisher = bus("sender", &recorder).create_publisher(&exchange);
    assert_eq!(publisher.publish(Person { id: 1 }).await?, 1);

    assert!(exchange.unbind("receiver"));
    assert!(!exchange.unbind("receiver"));
    assert_eq!(exchange.bound_count(), 0);
    assert_eq!(publisher.publish(Person { id: 2 }).await?, 0);
    assert_eq!(recorder.total(), 0);
    Ok(())
}

#[test]
fn test_register_conflict_keeps_first() -> anyhow::Result<()> {
    initialize_tracing();
    let recorder = Arc::new(RecordingErrorSubscriber::default());
    let bus = bus("B1", &recorder);

    let first = bus.register(
        Registration::for_payload(|_: Person| async { Ok(()) })
            .header_filter("Header", "First")
            .build()?,
    )?;
    let second = bus.register(
        Registration::for_payload(|_: Person| async { Ok(()) })
            .header_filter("Header", "Second")
            .build()?,
    );

    assert!(matches!(second, Err(BusError::AlreadyRegistered(ref key)) if key == first.type_key()));
    let filters = bus.applicable_filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(
        filters[0].binding_arguments().get("Header").map(String::as_str),
        Some("First")
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_bus_id_does_not_swallow_anonymous_frames() -> anyhow::Result<()> {
    initialize_tracing();
    let recorder = Arc::new(RecordingErrorSubscriber::default());
    let bus = bus("", &recorder);
    assert!(!bus.id().is_empty());

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let _subscription = bus.subscribe(move |person: Person| {
        let sink = sink.clone();
        async move {
            sink.lock().push(person);
            Ok(())
        }
    })?;

    let anonymous = br#"{"name":"Person","namespace":"urn:typed-bus:people","headers":[],"data":{"id":3}}"#;
    let disposition = bus.dispatcher().dispatch(anonymous).await;

    assert!(disposition.is_handled());
    assert_eq!(*received.lock(), vec![Person { id: 3 }]);
    assert_eq!(recorder.total(), 0);
    Ok(())
}
