pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use log::{ info, warn };
use std::sync::Arc;

use super::transport::{ Transport, UpstreamRequest };
use super::{ LlmError, Provider };
use crate::models::chat::ChatMessage;

pub use self::anthropic::AnthropicWire;
pub use self::gemini::GeminiWire;
pub use self::mock::{ MockAdapter, MockDelay };
pub use self::openai::OpenAIWire;

/// System prompt used when the conversation does not provide one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Turns the latest message plus history into reply text.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(
        &self,
        message: &str,
        conversation: &[ChatMessage],
        credential: &str
    ) -> Result<String, LlmError>;
}

/// Provider-specific wire knowledge: how to shape the outbound call and how to
/// read the reply out of a successful response body.
pub trait WireFormat: Send + Sync {
    fn provider(&self) -> Provider;

    fn build_request(
        &self,
        message: &str,
        conversation: &[ChatMessage],
        credential: &str
    ) -> UpstreamRequest;

    fn parse_reply(&self, body: &str) -> Result<String, LlmError>;
}

/// Adapter for any HTTP provider: format, call once, parse.
pub struct RemoteAdapter<W> {
    wire: W,
    transport: Arc<dyn Transport>,
}

impl<W: WireFormat> RemoteAdapter<W> {
    pub fn new(wire: W, transport: Arc<dyn Transport>) -> Self {
        Self { wire, transport }
    }
}

#[async_trait]
impl<W: WireFormat> ChatAdapter for RemoteAdapter<W> {
    fn provider(&self) -> Provider {
        self.wire.provider()
    }

    async fn complete(
        &self,
        message: &str,
        conversation: &[ChatMessage],
        credential: &str
    ) -> Result<String, LlmError> {
        let provider = self.wire.provider();
        let request = self.wire.build_request(message, conversation, credential);
        info!(
            "{}Adapter::complete() → url={} history={}",
            provider.display_name(),
            request.url,
            conversation.len()
        );

        let response = self.transport
            .send(request).await
            .map_err(|e| e.redacted(credential))?;

        if !response.is_success() {
            warn!("{} API returned status {}", provider.display_name(), response.status);
            return Err(LlmError::Upstream {
                provider,
                status: response.status,
                body: super::redact(&response.body, credential),
            });
        }

        self.wire.parse_reply(&response.body).map_err(|e| e.redacted(credential))
    }
}

/// Joins a base URL and a path without doubling slashes.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
