use serde::Serialize;

use super::{Message, MessageRole};

/// One chat completion call: the conversation plus optional sampling limits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// A single question, preceded by the system prompt unless it is blank
    pub fn question(system_prompt: &str, question: impl Into<String>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.trim().is_empty() {
            messages.push(Message::system(system_prompt));
        }
        messages.push(Message::user(question));
        Self::new(messages)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == MessageRole::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_with_system_prompt() {
        let request = LlmRequest::question("You answer questions about the sun", "How hot?")
            .with_temperature(Some(0.2))
            .with_max_tokens(Some(256));

        assert_eq!(request.messages.len(), 2);
        assert_eq!(
            request.system_message().map(Message::content_text),
            Some("You answer questions about the sun")
        );
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));
    }

    #[test]
    fn test_blank_system_prompt_is_left_out() {
        let request = LlmRequest::question("  \n", "Hi");

        assert_eq!(request.messages, vec![Message::user("Hi")]);
        assert!(request.system_message().is_none());
    }

    #[test]
    fn test_unset_limits_are_not_serialized() {
        let json = serde_json::to_value(LlmRequest::question("", "Hi")).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }
}
