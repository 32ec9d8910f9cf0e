//! Delivery metadata attached by the dispatcher to every pushed task.
//!
//! The dispatcher describes each delivery through four optional headers. All
//! of them are defaulted so that a bare `POST` with only a body is still a
//! well-formed delivery.

use serde::Serialize;

/// Header names carrying delivery metadata.
///
/// Stored lowercase; HTTP header lookup is case-insensitive so these match
/// `X-TaskQueue-TaskName` and friends as sent on the wire.
pub mod headers {
    /// Dispatcher-assigned task identifier.
    pub const TASK_NAME: &str = "x-taskqueue-taskname";
    /// Originating queue.
    pub const QUEUE_NAME: &str = "x-taskqueue-queuename";
    /// Number of prior redelivery attempts.
    pub const RETRY_COUNT: &str = "x-taskqueue-taskretrycount";
    /// Number of times the task was handed to a worker, this attempt included.
    pub const EXECUTION_COUNT: &str = "x-taskqueue-taskexecutioncount";
}

/// Placeholder used when the dispatcher omits a name header.
pub const UNKNOWN: &str = "unknown";

/// Metadata describing a single task delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMetadata {
    /// Task identifier, `"unknown"` when absent.
    pub task_name: String,
    /// Queue identifier, `"unknown"` when absent.
    pub queue_name: String,
    /// Prior delivery attempts. `0` when absent or unparsable.
    pub retry_count: u32,
    /// Worker hand-offs including the current one. `1` when absent or unparsable.
    pub execution_count: u32,
}

impl Default for DeliveryMetadata {
    fn default() -> Self {
        Self {
            task_name: UNKNOWN.to_string(),
            queue_name: UNKNOWN.to_string(),
            retry_count: 0,
            execution_count: 1,
        }
    }
}

impl DeliveryMetadata {
    /// Builds metadata from a header lookup function.
    ///
    /// `lookup` receives one of the lowercase names in [`headers`] and returns
    /// the raw header value, if any. Empty values are treated as absent.
    pub fn from_lookup<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let text = |name: &str| {
            lookup(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map_or_else(|| UNKNOWN.to_string(), str::to_string)
        };

        Self {
            task_name: text(headers::TASK_NAME),
            queue_name: text(headers::QUEUE_NAME),
            retry_count: parse_count(lookup(headers::RETRY_COUNT), 0),
            execution_count: parse_count(lookup(headers::EXECUTION_COUNT), 1),
        }
    }
}

/// Parses a base-10 unsigned counter header.
///
/// Returns `default` when the value is absent, blank, negative, fractional,
/// non-numeric, or does not fit in a `u32`. Never panics.
#[must_use]
pub fn parse_count(raw: Option<&str>, default: u32) -> u32 {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn from_pairs(pairs: &[(&'static str, &'static str)]) -> DeliveryMetadata {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        DeliveryMetadata::from_lookup(|name| map.get(name).copied())
    }

    #[test]
    fn absent_headers_use_defaults() {
        let meta = from_pairs(&[]);
        assert_eq!(meta, DeliveryMetadata::default());
        assert_eq!(meta.task_name, "unknown");
        assert_eq!(meta.queue_name, "unknown");
        assert_eq!(meta.retry_count, 0);
        assert_eq!(meta.execution_count, 1);
    }

    #[test]
    fn present_headers_are_used() {
        let meta = from_pairs(&[
            (headers::TASK_NAME, "projects/p/queues/q/tasks/123"),
            (headers::QUEUE_NAME, "image-jobs"),
            (headers::RETRY_COUNT, "2"),
            (headers::EXECUTION_COUNT, "3"),
        ]);
        assert_eq!(meta.task_name, "projects/p/queues/q/tasks/123");
        assert_eq!(meta.queue_name, "image-jobs");
        assert_eq!(meta.retry_count, 2);
        assert_eq!(meta.execution_count, 3);
    }

    #[test]
    fn blank_name_header_falls_back_to_unknown() {
        let meta = from_pairs(&[(headers::TASK_NAME, "   ")]);
        assert_eq!(meta.task_name, "unknown");
    }

    #[test]
    fn non_numeric_retry_count_is_zero() {
        let meta = from_pairs(&[(headers::RETRY_COUNT, "abc")]);
        assert_eq!(meta.retry_count, 0);
    }

    #[test]
    fn non_numeric_execution_count_is_one() {
        let meta = from_pairs(&[(headers::EXECUTION_COUNT, "many")]);
        assert_eq!(meta.execution_count, 1);
    }

    #[test]
    fn parse_count_edge_cases() {
        assert_eq!(parse_count(None, 0), 0);
        assert_eq!(parse_count(Some(""), 0), 0);
        assert_eq!(parse_count(Some(" 7 "), 0), 7);
        assert_eq!(parse_count(Some("-1"), 0), 0);
        assert_eq!(parse_count(Some("2.5"), 0), 0);
        assert_eq!(parse_count(Some("99999999999"), 0), 0);
        assert_eq!(parse_count(Some("4294967295"), 0), u32::MAX);
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let json = serde_json::to_value(DeliveryMetadata::default()).unwrap();
        assert_eq!(json["taskName"], "unknown");
        assert_eq!(json["retryCount"], 0);
        assert_eq!(json["executionCount"], 1);
    }

    proptest! {
        #[test]
        fn parse_count_never_panics(raw in ".*") {
            let _ = parse_count(Some(&raw), 0);
        }

        #[test]
        fn parse_count_round_trips_any_u32(n in any::<u32>()) {
            prop_assert_eq!(parse_count(Some(&n.to_string()), 0), n);
        }

        #[test]
        fn non_digit_input_defaults(raw in "[a-zA-Z_ .-]{1,12}") {
            prop_assert_eq!(parse_count(Some(&raw), 0), 0);
        }
    }
}
