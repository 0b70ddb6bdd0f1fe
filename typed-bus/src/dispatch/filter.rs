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

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::message::{BusHeader, Envelope};

/// How a header predicate judges a header value.
///
/// `Equals` is the guaranteed policy: exact, case-sensitive equality. `Custom`
/// accepts any predicate over the value and is evaluated locally only; it cannot
/// be expressed as a broker-side binding.
#[derive(Clone)]
pub enum HeaderMatcher {
    /// The header value must equal this string exactly.
    Equals(String),
    /// The header value must satisfy this predicate.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl HeaderMatcher {
    /// Whether `value` satisfies the matcher.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Equals(expected) => expected == value,
            Self::Custom(predicate) => predicate(value),
        }
    }

    /// The required value, for exact matchers.
    #[must_use]
    pub fn exact_value(&self) -> Option<&str> {
        match self {
            Self::Equals(expected) => Some(expected),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Debug for HeaderMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(expected) => f.debug_tuple("Equals").field(expected).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A requirement that some header named `name` satisfies `matcher`.
#[derive(Clone, Debug)]
pub struct HeaderPredicate {
    name: String,
    matcher: HeaderMatcher,
}

impl HeaderPredicate {
    /// Requires a header `name` whose value equals `value`.
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher: HeaderMatcher::Equals(value.into()),
        }
    }

    /// Requires a header `name` whose value satisfies `predicate`.
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: HeaderMatcher::Custom(Arc::new(predicate)),
        }
    }

    /// The header name this predicate inspects.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The matcher applied to the header's value.
    #[must_use]
    pub fn matcher(&self) -> &HeaderMatcher {
        &self.matcher
    }

    /// Whether any header with this predicate's name has an acceptable value.
    #[must_use]
    pub fn is_satisfied_by(&self, headers: &[BusHeader]) -> bool {
        headers
            .iter()
            .any(|header| header.name == self.name && self.matcher.matches(&header.value))
    }
}

/// The delivery policy of one registration. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct FilterInfo {
    receive_self_publish: bool,
    predicates: Vec<HeaderPredicate>,
}

impl FilterInfo {
    /// Creates a filter from its parts.
    #[must_use]
    pub fn new(receive_self_publish: bool, predicates: Vec<HeaderPredicate>) -> Self {
        Self {
            receive_self_publish,
            predicates,
        }
    }

    /// Whether messages published by the local bus are delivered.
    #[inline]
    #[must_use]
    pub fn receive_self_publish(&self) -> bool {
        self.receive_self_publish
    }

    /// The header predicates, all of which must hold.
    #[inline]
    #[must_use]
    pub fn predicates(&self) -> &[HeaderPredicate] {
        &self.predicates
    }

    /// Renders exact-match predicates as headers-exchange binding arguments.
    ///
    /// The result is empty when there is nothing to bind on; otherwise it carries
    /// `x-match = all` plus one entry per header. The first predicate wins when a
    /// header name repeats. `Custom` matchers are skipped and stay local.
    #[must_use]
    pub fn binding_arguments(&self) -> BTreeMap<String, String> {
        let mut arguments = BTreeMap::new();
        for predicate in &self.predicates {
            if let Some(value) = predicate.matcher.exact_value() {
                arguments
                    .entry(predicate.name.clone())
                    .or_insert_with(|| value.to_string());
            }
        }
        if !arguments.is_empty() {
            arguments.insert("x-match".to_string(), "all".to_string());
        }
        arguments
    }
}

/// The outcome of evaluating a [`FilterInfo`] against an envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterVerdict {
    /// The message should be delivered.
    Accepted,
    /// The message came from the local bus and the registration does not receive
    /// its own publishes.
    SelfPublished,
    /// No header satisfied the predicate on `header`.
    HeaderMismatch {
        /// Name of the first unsatisfied predicate.
        header: String,
    },
}

impl FilterVerdict {
    /// Whether the message passes.
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Evaluates `filter` for `envelope` on the bus identified by `local_bus_id`.
///
/// Self-publish suppression runs first and short-circuits before any header is
/// inspected. Header predicates are then applied in order, all of which must hold.
#[must_use]
pub fn evaluate(filter: &FilterInfo, envelope: &Envelope, local_bus_id: &str) -> FilterVerdict {
    if !filter.receive_self_publish && envelope.bus_id() == local_bus_id {
        return FilterVerdict::SelfPublished;
    }

    filter
        .predicates
        .iter()
        .find(|predicate| !predicate.is_satisfied_by(envelope.headers()))
        .map_or(FilterVerdict::Accepted, |predicate| FilterVerdict::HeaderMismatch {
            header: predicate.name.clone(),
        })
}

/// Whether `filter` lets `envelope` through on the bus `local_bus_id`.
#[must_use]
pub fn passes(filter: &FilterInfo, envelope: &Envelope, local_bus_id: &str) -> bool {
    evaluate(filter, envelope, local_bus_id).is_accepted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TypeKey;

    fn envelope(origin: &str, headers: &[(&str, &str)]) -> Envelope {
        Envelope::new(
            origin,
            TypeKey::new("Person", "urn:people").unwrap(),
            headers
                .iter()
                .map(|(name, value)| BusHeader::new(*name, *value))
                .collect(),
        )
    }

    #[test]
    fn test_self_publish_suppressed_by_default() {
        let filter = FilterInfo::default();
        assert_eq!(
            evaluate(&filter, &envelope("B1", &[]), "B1"),
            FilterVerdict::SelfPublished
        );
        assert!(passes(&filter, &envelope("B2", &[]), "B1"));
    }

    #[test]
    fn test_self_publish_override() {
        let filter = FilterInfo::new(true, vec![]);
        assert!(passes(&filter, &envelope("B1", &[]), "B1"));
    }

    #[test]
    fn test_self_publish_checked_before_headers() {
        let filter = FilterInfo::new(false, vec![HeaderPredicate::equals("Header", "RightValue")]);
        let message = envelope("B1", &[("Header", "WrongValue")]);
        assert_eq!(evaluate(&filter, &message, "B1"), FilterVerdict::SelfPublished);
    }

    #[test]
    fn test_header_predicates_apply_to_self_receivers() {
        let filter = FilterInfo::new(true, vec![HeaderPredicate::equals("Header", "RightValue")]);
        assert!(passes(&filter, &envelope("B1", &[("Header", "RightValue")]), "B1"));
        assert_eq!(
            evaluate(&filter, &envelope("B1", &[("Header", "WrongValue")]), "B1"),
            FilterVerdict::HeaderMismatch {
                header: "Header".into()
            }
        );
    }

    #[test]
    fn test_missing_header_fails() {
        let filter = FilterInfo::new(false, vec![HeaderPredicate::equals("Header", "RightValue")]);
        assert!(!passes(&filter, &envelope("B2", &[("Other", "RightValue")]), "B1"));
    }

    #[test]
    fn test_any_duplicate_header_may_satisfy() {
        let filter = FilterInfo::new(false, vec![HeaderPredicate::equals("Header", "RightValue")]);
        let message = envelope("B2", &[("Header", "WrongValue"), ("Header", "RightValue")]);
        assert!(passes(&filter, &message, "B1"));
    }

    #[test]
    fn test_predicates_are_anded() {
        let filter = FilterInfo::new(
            false,
            vec![
                HeaderPredicate::equals("Region", "eu"),
                HeaderPredicate::equals("Tier", "gold"),
            ],
        );
        assert!(passes(&filter, &envelope("B2", &[("Region", "eu"), ("Tier", "gold")]), "B1"));
        assert_eq!(
            evaluate(&filter, &envelope("B2", &[("Region", "eu"), ("Tier", "silver")]), "B1"),
            FilterVerdict::HeaderMismatch {
                header: "Tier".into()
            }
        );
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let filter = FilterInfo::new(false, vec![HeaderPredicate::equals("Header", "RightValue")]);
        assert!(!passes(&filter, &envelope("B2", &[("Header", "rightvalue")]), "B1"));
        assert!(!passes(&filter, &envelope("B2", &[("header", "RightValue")]), "B1"));
    }

    #[test]
    fn test_custom_matcher() {
        let filter = FilterInfo::new(
            false,
            vec![HeaderPredicate::custom("Priority", |value| {
                value.parse::<u8>().is_ok_and(|priority| priority >= 5)
            })],
        );
        assert!(passes(&filter, &envelope("B2", &[("Priority", "7")]), "B1"));
        assert!(!passes(&filter, &envelope("B2", &[("Priority", "2")]), "B1"));
        assert!(!passes(&filter, &envelope("B2", &[("Priority", "high")]), "B1"));
    }

    #[test]
    fn test_binding_arguments() {
        assert!(FilterInfo::default().binding_arguments().is_empty());

        let filter = FilterInfo::new(
            false,
            vec![
                HeaderPredicate::equals("Header", "RightValue"),
                HeaderPredicate::custom("Priority", |_| true),
                HeaderPredicate::equals("Header", "Shadowed"),
            ],
        );
        let arguments = filter.binding_arguments();
        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments.get("x-match").map(String::as_str), Some("all"));
        assert_eq!(arguments.get("Header").map(String::as_str), Some("RightValue"));
    }
}
