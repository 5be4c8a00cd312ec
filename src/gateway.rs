//! Request normalizer: validates a chat request, picks the provider and its
//! credential, runs the matching adapter and folds every failure into the
//! uniform error envelope.

use chrono::{ SecondsFormat, Utc };
use log::{ error, info, warn };
use std::sync::Arc;

use crate::config::{ GatewayConfig, KeySource };
use crate::llm::chat::{
    AnthropicWire,
    ChatAdapter,
    GeminiWire,
    MockAdapter,
    OpenAIWire,
    RemoteAdapter,
};
use crate::llm::transport::{ HttpTransport, Transport };
use crate::llm::{ LlmError, Provider };
use crate::models::chat::{ ChatErrorResponse, ChatRequest, ChatResponse };

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ChatFailure {
    /// The request itself is unusable; no adapter was invoked.
    #[error("Message is required")]
    Validation,

    /// Anything that went wrong on the way to or from a provider.
    #[error("LLM API error: {0}")]
    Provider(#[from] LlmError),

    #[error("Internal server error")]
    Internal,
}

impl ChatFailure {
    pub fn envelope(&self) -> ChatErrorResponse {
        match self {
            ChatFailure::Validation => ChatErrorResponse::message(MESSAGE_REQUIRED),
            ChatFailure::Provider(e) => ChatErrorResponse::upstream(self.to_string(), e.provider().as_str()),
            ChatFailure::Internal => ChatErrorResponse::message(INTERNAL_ERROR),
        }
    }
}

pub struct ChatGateway {
    mock: MockAdapter,
    gemini: RemoteAdapter<GeminiWire>,
    openai: RemoteAdapter<OpenAIWire>,
    anthropic: RemoteAdapter<AnthropicWire>,
    keys: KeySource,
}

impl ChatGateway {
    pub fn new(config: &GatewayConfig, keys: KeySource, transport: Arc<dyn Transport>) -> Self {
        let endpoints = &config.endpoints;
        Self {
            mock: MockAdapter::new(config.mock_delay),
            gemini: RemoteAdapter::new(GeminiWire::new(endpoints.gemini.clone()), transport.clone()),
            openai: RemoteAdapter::new(OpenAIWire::new(endpoints.openai.clone()), transport.clone()),
            anthropic: RemoteAdapter::new(AnthropicWire::new(endpoints.anthropic.clone()), transport),
            keys,
        }
    }

    /// Production wiring: real HTTP transport and keys read from the environment.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::new(config.upstream_timeout)?;
        Ok(Self::new(config, KeySource::Env, Arc::new(transport)))
    }

    pub fn keys(&self) -> &KeySource {
        &self.keys
    }

    pub fn adapter(&self, provider: Provider) -> &dyn ChatAdapter {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::OpenAI => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Mock => &self.mock,
        }
    }

    /// A non-empty `apiKey` on the request wins; otherwise the server-side key.
    pub fn credential_for(&self, provider: Provider, api_key: Option<&str>) -> Result<String, LlmError> {
        let Some(var) = provider.key_env_var() else {
            return Ok(String::new());
        };
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        self.keys.resolve(provider).ok_or(LlmError::MissingCredential { provider, var })
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, ChatFailure> {
        let message = match request.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => {
                warn!("Rejected chat request without a message");
                return Err(ChatFailure::Validation);
            }
        };

        // Unknown providers are answered by the mock.
        let provider = Provider::from_request(request.provider.as_deref());
        if let Some(raw) = request.provider.as_deref() {
            if raw != provider.as_str() {
                warn!("Unrecognized provider '{}', answering with mock", raw);
            }
        }

        let conversation = request.conversation.as_deref().unwrap_or(&[]);
        info!("Chat request → provider={} history={}", provider, conversation.len());

        let adapter = self.adapter(provider);
        let result = match self.credential_for(provider, request.api_key.as_deref()) {
            Ok(credential) => adapter.complete(message, conversation, &credential).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) =>
                Ok(ChatResponse {
                    response,
                    timestamp: timestamp_now(),
                    provider: adapter.provider().as_str().to_string(),
                }),
            Err(e) => {
                error!("LLM API error ({}): {}", provider, e);
                Err(ChatFailure::Provider(e))
            }
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
