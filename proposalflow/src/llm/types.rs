//! Request and response types for the generative backend.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions establishing the persona.
    System,
    /// The task for this turn.
    User,
}

impl MessageRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One message in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A text-generation request for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Conversation, system message first.
    pub messages: Vec<ChatMessage>,
    /// Per-request temperature override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion length cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Creates a request from a system and a user message.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sets the temperature override.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Caps the completion length.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Text of the system message, if any.
    #[must_use]
    pub fn system_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }

    /// Text of the last user message, if any.
    #[must_use]
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Text returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Completion text.
    pub content: String,
    /// Model that produced it.
    pub model: String,
    /// Prompt tokens, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Completion tokens, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    /// Round-trip time of the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// Why generation stopped, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GenerationResponse {
    /// Creates a response carrying only text.
    #[must_use]
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Returns total tokens.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }

    /// Converts to span attributes.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("llm.model".to_string(), serde_json::json!(self.model));
        if let Some(t) = self.input_tokens {
            map.insert("llm.input_tokens".to_string(), serde_json::json!(t));
        }
        if let Some(t) = self.output_tokens {
            map.insert("llm.output_tokens".to_string(), serde_json::json!(t));
        }
        map.insert("llm.total_tokens".to_string(), serde_json::json!(self.total_tokens()));
        if let Some(l) = self.latency_ms {
            map.insert("llm.latency_ms".to_string(), serde_json::json!(l));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let req = GenerationRequest::new("persona", "task");
        assert_eq!(req.system_text(), Some("persona"));
        assert_eq!(req.user_text(), Some("task"));
        assert_eq!(req.temperature, None);
        assert_eq!(req.max_tokens, None);
    }

    #[test]
    fn test_request_overrides_serialize() {
        let req = GenerationRequest::new("persona", "task").with_temperature(0.25).with_max_tokens(256);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["temperature"], serde_json::json!(0.25));
        assert_eq!(json["max_tokens"], serde_json::json!(256));

        let json = serde_json::to_value(GenerationRequest::new("p", "t")).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_total_tokens() {
        let resp = GenerationResponse {
            input_tokens: Some(120),
            output_tokens: Some(30),
            ..GenerationResponse::text("hi", "gpt-3.5-turbo")
        };
        assert_eq!(resp.total_tokens(), 150);
        assert_eq!(GenerationResponse::text("hi", "m").total_tokens(), 0);
    }

    #[test]
    fn test_attributes() {
        let resp = GenerationResponse {
            latency_ms: Some(12.5),
            ..GenerationResponse::text("hi", "gpt-3.5-turbo")
        };
        let attrs = resp.to_attributes();
        assert_eq!(attrs.get("llm.model"), Some(&serde_json::json!("gpt-3.5-turbo")));
        assert_eq!(attrs.get("llm.latency_ms"), Some(&serde_json::json!(12.5)));
        assert!(!attrs.contains_key("llm.input_tokens"));
    }

    #[test]
    fn test_role_serialize() {
        let msg = ChatMessage::system("x");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
    }
}
