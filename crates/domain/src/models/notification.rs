//! Telegram notification payloads.

use serde::{Deserialize, Serialize};

/// Telegram message formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

/// Body of `POST /telegram/notify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
}

impl NotificationPayload {
    /// Plain-text message to one chat.
    pub fn text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            disable_notification: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_payload_serializes_minimal_body() {
        let payload = NotificationPayload::text("1001", "hello");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": "1001", "text": "hello"}));
    }

    #[test]
    fn test_parse_mode_serde() {
        assert_eq!(serde_json::to_string(&ParseMode::Html).unwrap(), "\"HTML\"");
        assert_eq!(
            serde_json::to_string(&ParseMode::Markdown).unwrap(),
            "\"Markdown\""
        );
    }
}
