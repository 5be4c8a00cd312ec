use serde::{ Deserialize, Serialize };

use super::{ endpoint_url, WireFormat, DEFAULT_SYSTEM_PROMPT };
use crate::config::ProviderEndpoint;
use crate::llm::transport::UpstreamRequest;
use crate::llm::{ LlmError, Provider };
use crate::models::chat::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIReply>,
}

#[derive(Deserialize)]
struct OpenAIReply {
    content: Option<String>,
}

/// Chat completions wire format with bearer authentication.
pub struct OpenAIWire {
    endpoint: ProviderEndpoint,
}

impl OpenAIWire {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }
}

impl WireFormat for OpenAIWire {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn build_request(
        &self,
        message: &str,
        conversation: &[ChatMessage],
        credential: &str
    ) -> UpstreamRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 2);
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: DEFAULT_SYSTEM_PROMPT.to_string(),
        });
        messages.extend(
            conversation.iter().map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
        );
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let payload = OpenAIChatRequest {
            model: self.endpoint.model.clone(),
            messages,
            temperature: 0.7,
            max_tokens: 1000,
        };

        UpstreamRequest::post(
            Provider::OpenAI,
            endpoint_url(&self.endpoint.base_url, "chat/completions"),
            serde_json::json!(payload)
        )
            .header("Authorization", &format!("Bearer {}", credential))
    }

    fn parse_reply(&self, body: &str) -> Result<String, LlmError> {
        let parsed: OpenAIResponse = serde_json
            ::from_str(body)
            .map_err(|e| LlmError::malformed(Provider::OpenAI, e.to_string()))?;

        parsed.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| LlmError::malformed(Provider::OpenAI, "missing choices[0].message.content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::{ ChatAdapter, RemoteAdapter };
    use crate::llm::transport::testing::RecordingTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn wire() -> OpenAIWire {
        OpenAIWire::new(ProviderEndpoint::new(DEFAULT_BASE_URL, DEFAULT_MODEL))
    }

    #[test]
    fn prefixes_system_prompt_and_keeps_roles() {
        let history = vec![
            ChatMessage::system("house rules"),
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1")
        ];
        let req = wire().build_request("q2", &history, "sk-o");

        assert_eq!(req.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(
            req.body,
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": "You are a helpful AI assistant." },
                    { "role": "system", "content": "house rules" },
                    { "role": "user", "content": "q1" },
                    { "role": "assistant", "content": "a1" },
                    { "role": "user", "content": "q2" }
                ],
                "temperature": 0.7,
                "max_tokens": 1000
            })
        );
    }

    #[test]
    fn bearer_header_carries_key() {
        let req = wire().build_request("q", &[], "sk-o");
        assert_eq!(req.header_value("Authorization"), Some("Bearer sk-o"));
        assert!(req.query.is_empty());
    }

    #[test]
    fn parses_first_choice() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Sure." } }]
        });
        assert_eq!(wire().parse_reply(&body.to_string()).unwrap(), "Sure.");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let err = wire().parse_reply(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse { provider: Provider::OpenAI, .. }));
    }

    #[tokio::test]
    async fn upstream_error_reports_status_only() {
        let transport = Arc::new(RecordingTransport::replying(429, json!({ "error": "rate limited" })));
        let adapter = RemoteAdapter::new(wire(), transport);
        let err = adapter.complete("q", &[], "sk-o").await.unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API error: 429");
    }
}
