use std::time::Duration;

/// Processing configuration for the task routines.
///
/// Each duration is the simulated amount of work a routine suspends for
/// before completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Simulated work for `resize`.
    pub resize_work: Duration,
    /// Simulated work for `thumbnail`.
    pub thumbnail_work: Duration,
    /// Simulated work for any other operation.
    pub generic_work: Duration,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            resize_work: Duration::from_millis(1000),
            thumbnail_work: Duration::from_millis(500),
            generic_work: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_config_defaults() {
        let config = ProcessingConfig::default();
        assert_eq!(config.resize_work, Duration::from_secs(1));
        assert_eq!(config.thumbnail_work, Duration::from_millis(500));
        assert_eq!(config.generic_work, Duration::from_millis(500));
    }
}
