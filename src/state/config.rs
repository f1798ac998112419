//! Coordinator configuration.

use serde::{Deserialize, Serialize};

/// Tunables supplied by the host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Require both sides to send `ready` before the first move.
    pub ready_check: bool,

    /// Broadcast `queueCount` to every connection when the queue changes.
    pub broadcast_queue_count: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ready_check: false,
            broadcast_queue_count: true,
        }
    }
}

impl CoordinatorConfig {
    /// Parse from a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_ready_check(mut self, enabled: bool) -> Self {
        self.ready_check = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert!(!config.ready_check);
        assert!(config.broadcast_queue_count);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CoordinatorConfig::from_json(r#"{"ready_check": true}"#).unwrap();
        assert_eq!(config, CoordinatorConfig::default().with_ready_check(true));

        let config = CoordinatorConfig::from_json("{}").unwrap();
        assert_eq!(config, CoordinatorConfig::default());

        assert!(CoordinatorConfig::from_json(r#"{"ready_check": "yes"}"#).is_err());
    }
}
