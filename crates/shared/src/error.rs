use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body the service attaches to rejected requests, e.g.
/// `{"detail": "..."}` or `{"detail": [{"msg": "...", ...}]}` for validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceError {
    pub detail: Value,
}

impl ServiceError {
    pub fn summary(&self) -> String {
        match &self.detail {
            Value::String(message) => message.clone(),
            Value::Array(entries) => entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}
