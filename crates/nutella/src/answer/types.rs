//! Answer-generation types
//!
//! Message and outcome shapes exchanged with the LLM proxy, plus the
//! reasoning-log entry submitted after each answered request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::classify::Route;

/// Message in a chat exchange with the proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Result of an answer-generation call
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Assistant text extracted from the response, if any was present
    pub assistant: Option<String>,
    /// The original proxy response, unmodified
    pub raw: Value,
}

impl ChatOutcome {
    /// Answer text: the assistant field, or the stringified raw response
    /// when no assistant text was present
    pub fn text(&self) -> String {
        self.assistant
            .clone()
            .unwrap_or_else(|| self.raw.to_string())
    }
}

/// One reasoning-log entry describing a completed pipeline request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningEntry {
    pub request_id: Uuid,
    pub route: Route,
    pub query: String,
    /// Short outcome tag, e.g. "answered" or "error"
    pub outcome: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::system("be helpful");
        assert_eq!(msg.role, "system");
        assert_eq!(msg.content, "be helpful");

        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, "user");
    }

    #[test]
    fn test_outcome_text_prefers_assistant() {
        let outcome = ChatOutcome {
            assistant: Some("42 users".to_string()),
            raw: json!({"assistant": "42 users"}),
        };
        assert_eq!(outcome.text(), "42 users");
    }

    #[test]
    fn test_outcome_text_falls_back_to_raw() {
        let outcome = ChatOutcome {
            assistant: None,
            raw: json!({"unexpected": true}),
        };
        assert_eq!(outcome.text(), r#"{"unexpected":true}"#);
    }

    #[test]
    fn test_reasoning_entry_serializes_route() {
        let entry = ReasoningEntry {
            request_id: Uuid::nil(),
            route: Route::Domains,
            query: "show config".to_string(),
            outcome: "answered".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["route"], json!("domains"));
    }
}
