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

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use typed_bus::prelude::*;

/// Which error-boundary callback fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Unregistered,
    FilteredOut,
    DeserializeException,
    DispatchException,
}

/// One recorded notification.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub notice: Notice,
    pub type_key: Option<TypeKey>,
    pub origin: String,
    pub label: Option<&'static str>,
    pub had_body: bool,
}

/// An error subscriber that records every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingErrorSubscriber {
    unregistered: AtomicUsize,
    filtered: AtomicUsize,
    deserialize: AtomicUsize,
    dispatch: AtomicUsize,
    log: Mutex<Vec<Recorded>>,
}

impl RecordingErrorSubscriber {
    pub fn count(&self, notice: Notice) -> usize {
        match notice {
            Notice::Unregistered => &self.unregistered,
            Notice::FilteredOut => &self.filtered,
            Notice::DeserializeException => &self.deserialize,
            Notice::DispatchException => &self.dispatch,
        }
        .load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.log.lock().len()
    }

    pub fn records(&self) -> Vec<Recorded> {
        self.log.lock().clone()
    }

    fn record(&self, notice: Notice, envelope: &Envelope, error: Option<&BusError>) {
        let counter = match notice {
            Notice::Unregistered => &self.unregistered,
            Notice::FilteredOut => &self.filtered,
            Notice::DeserializeException => &self.deserialize,
            Notice::DispatchException => &self.dispatch,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(Recorded {
            notice,
            type_key: envelope.type_key().cloned(),
            origin: envelope.bus_id().to_string(),
            label: error.map(BusError::as_label),
            had_body: envelope.has_body(),
        });
    }
}

impl ErrorSubscriber for RecordingErrorSubscriber {
    fn on_unregistered_message(&self, envelope: &Envelope) {
        self.record(Notice::Unregistered, envelope, None);
    }

    fn on_message_filtered_out(&self, envelope: &Envelope) {
        self.record(Notice::FilteredOut, envelope, None);
    }

    fn on_deserialize_exception(&self, envelope: &Envelope, error: &BusError) {
        self.record(Notice::DeserializeException, envelope, Some(error));
    }

    fn on_dispatch_exception(&self, envelope: &Envelope, error: &BusError) {
        self.record(Notice::DispatchException, envelope, Some(error));
    }
}
