use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// A single operator command, built fresh per dispatch and never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct Command {
    pub action: String,
    pub parameters: Value,
    pub context: Value,
    pub timestamp: String,
}

impl Command {
    /// Create a command stamped with the current UTC time.
    pub fn new(action: impl Into<String>, parameters: Value) -> Self {
        Self {
            action: action.into(),
            parameters,
            context: json!({}),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn commands_carry_an_iso8601_utc_timestamp() {
        let command = Command::new("attack", json!({ "target": "zombie" }));
        assert_eq!(command.action, "attack");
        assert_eq!(command.context, json!({}));
        assert!(DateTime::parse_from_rfc3339(&command.timestamp).is_ok());
        assert!(command.timestamp.ends_with('Z'));
    }
}
