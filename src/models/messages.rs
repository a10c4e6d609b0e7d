use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Command;

/// Payload of a broadcast command message
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommandData {
    pub action: String,
    pub parameters: Value,
    pub context: Value,
}

/// Messages sent from the server to clients
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "welcome")]
    Welcome { message: String },
    #[serde(rename = "command")]
    Command { timestamp: String, data: CommandData },
}

impl ServerMessage {
    pub fn welcome(message: impl Into<String>) -> Self {
        ServerMessage::Welcome {
            message: message.into(),
        }
    }

    pub fn command(command: &Command) -> Self {
        ServerMessage::Command {
            timestamp: command.timestamp.clone(),
            data: CommandData {
                action: command.action.clone(),
                parameters: command.parameters.clone(),
                context: command.context.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn welcome_wire_shape() {
        let value = serde_json::to_value(ServerMessage::welcome("hello")).unwrap();
        assert_eq!(value, json!({ "type": "welcome", "message": "hello" }));
    }

    #[test]
    fn command_wire_shape() {
        let command = Command::new(
            "collect",
            json!({ "itemType": "wood", "radius": 10, "maxItems": 64 }),
        );
        let value = serde_json::to_value(ServerMessage::command(&command)).unwrap();

        assert_eq!(value["type"], "command");
        assert_eq!(value["timestamp"], json!(command.timestamp));
        assert_eq!(value["data"]["action"], "collect");
        assert_eq!(
            value["data"]["parameters"],
            json!({ "itemType": "wood", "radius": 10, "maxItems": 64 })
        );
        assert_eq!(value["data"]["context"], json!({}));
    }
}
