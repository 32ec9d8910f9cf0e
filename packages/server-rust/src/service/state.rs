//! Per-delivery lifecycle states.
//!
//! State machine:
//! `Received -> MetadataExtracted -> PayloadParsed -> Dispatched -> Succeeded | FailedRetryable`.
//! `FailedBadRequest` is reached at the `PayloadParsed` step when the body does
//! not parse, and from `Dispatched` when a routine rejects the payload's fields.
//! Nothing here is persisted; the state only labels log lines.

use std::fmt;

use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Received,
    MetadataExtracted,
    PayloadParsed,
    Dispatched,
    Succeeded,
    FailedBadRequest,
    FailedRetryable,
}

impl DeliveryState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::MetadataExtracted => "metadata_extracted",
            Self::PayloadParsed => "payload_parsed",
            Self::Dispatched => "dispatched",
            Self::Succeeded => "succeeded",
            Self::FailedBadRequest => "failed_bad_request",
            Self::FailedRetryable => "failed_retryable",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.terminal_status().is_some()
    }

    /// HTTP status for a terminal state, `None` while the delivery is in flight.
    #[must_use]
    pub fn terminal_status(self) -> Option<StatusCode> {
        match self {
            Self::Succeeded => Some(StatusCode::OK),
            Self::FailedBadRequest => Some(StatusCode::BAD_REQUEST),
            Self::FailedRetryable => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Received | Self::MetadataExtracted | Self::PayloadParsed | Self::Dispatched => {
                None
            }
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_map_to_status() {
        assert_eq!(DeliveryState::Succeeded.terminal_status(), Some(StatusCode::OK));
        assert_eq!(
            DeliveryState::FailedBadRequest.terminal_status(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            DeliveryState::FailedRetryable.terminal_status(),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[test]
    fn in_flight_states_are_not_terminal() {
        for state in [
            DeliveryState::Received,
            DeliveryState::MetadataExtracted,
            DeliveryState::PayloadParsed,
            DeliveryState::Dispatched,
        ] {
            assert!(!state.is_terminal(), "{state} should not be terminal");
        }
    }
}
