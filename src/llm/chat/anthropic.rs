use serde::{ Deserialize, Serialize };

use super::{ endpoint_url, WireFormat, DEFAULT_SYSTEM_PROMPT };
use crate::config::ProviderEndpoint;
use crate::llm::transport::UpstreamRequest;
use crate::llm::{ LlmError, Provider };
use crate::models::chat::{ ChatMessage, Role };

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}

/// Messages API wire format. The first system turn is lifted into the
/// top-level `system` field; all system turns are left out of `messages`.
pub struct AnthropicWire {
    endpoint: ProviderEndpoint,
}

impl AnthropicWire {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }
}

impl WireFormat for AnthropicWire {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn build_request(
        &self,
        message: &str,
        conversation: &[ChatMessage],
        credential: &str
    ) -> UpstreamRequest {
        let system = conversation
            .iter()
            .find(|msg| msg.role == Role::System)
            .map(|msg| msg.content.as_str())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);

        let mut messages: Vec<AnthropicMessage<'_>> = conversation
            .iter()
            .filter_map(|msg| match msg.role {
                Role::User => Some(AnthropicMessage { role: "user", content: &msg.content }),
                Role::Assistant => Some(AnthropicMessage { role: "assistant", content: &msg.content }),
                Role::System => None,
            })
            .collect();
        messages.push(AnthropicMessage { role: "user", content: message });

        let payload = AnthropicRequest {
            model: &self.endpoint.model,
            max_tokens: 1000,
            system,
            messages,
        };

        UpstreamRequest::post(
            Provider::Anthropic,
            endpoint_url(&self.endpoint.base_url, "messages"),
            serde_json::json!(payload)
        )
            .header("x-api-key", credential)
            .header("anthropic-version", API_VERSION)
    }

    fn parse_reply(&self, body: &str) -> Result<String, LlmError> {
        let parsed: AnthropicResponse = serde_json
            ::from_str(body)
            .map_err(|e| LlmError::malformed(Provider::Anthropic, e.to_string()))?;

        parsed.content
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .ok_or_else(|| LlmError::malformed(Provider::Anthropic, "missing content[0].text"))
    }
}
