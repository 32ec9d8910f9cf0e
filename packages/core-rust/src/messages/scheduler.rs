//! Response body for the periodic scheduler trigger.

use serde::{Deserialize, Serialize};

/// Identity reported in `executedBy`.
pub const EXECUTED_BY: &str = "scheduler";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerTriggerResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub executed_by: String,
}

impl SchedulerTriggerResponse {
    #[must_use]
    pub fn triggered_at(timestamp: String) -> Self {
        Self {
            success: true,
            message: format!("Scheduler triggered at {timestamp}"),
            timestamp,
            executed_by: EXECUTED_BY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggered_at_embeds_timestamp() {
        let resp = SchedulerTriggerResponse::triggered_at("2024-01-01T00:00:00.000Z".to_string());
        assert!(resp.success);
        assert_eq!(resp.message, "Scheduler triggered at 2024-01-01T00:00:00.000Z");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["executedBy"], "scheduler");
    }
}
