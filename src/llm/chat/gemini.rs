use serde::{ Deserialize, Serialize };

use super::{ endpoint_url, WireFormat };
use crate::config::ProviderEndpoint;
use crate::llm::transport::UpstreamRequest;
use crate::llm::{ LlmError, Provider };
use crate::models::chat::{ ChatMessage, Role };

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
    role: &'static str,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Deserialize)]
struct GoogleResponse {
    candidates: Option<Vec<GoogleCandidate>>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
}

fn to_content(role: &'static str, text: &str) -> GeminiContent {
    GeminiContent {
        parts: vec![GeminiPart { text: text.to_string() }],
        role,
    }
}

/// generateContent wire format. The key travels as the `key` query parameter.
pub struct GeminiWire {
    endpoint: ProviderEndpoint,
}

impl GeminiWire {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn url(&self) -> String {
        endpoint_url(
            &self.endpoint.base_url,
            &format!("{}:generateContent", self.endpoint.model)
        )
    }
}

impl WireFormat for GeminiWire {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn build_request(
        &self,
        message: &str,
        conversation: &[ChatMessage],
        credential: &str
    ) -> UpstreamRequest {
        let mut contents: Vec<GeminiContent> = conversation
            .iter()
            .filter_map(|msg| match msg.role {
                Role::User => Some(to_content("user", &msg.content)),
                Role::Assistant => Some(to_content("model", &msg.content)),
                Role::System => None,
            })
            .collect();
        contents.push(to_content("user", message));

        let payload = GeminiRequest {
            contents,
            generation_config: GenerationConfig::default(),
        };

        UpstreamRequest::post(Provider::Gemini, self.url(), serde_json::json!(payload))
            .query("key", credential)
    }

    fn parse_reply(&self, body: &str) -> Result<String, LlmError> {
        let parsed: GoogleResponse = serde_json
            ::from_str(body)
            .map_err(|e| LlmError::malformed(Provider::Gemini, e.to_string()))?;

        parsed.candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| LlmError::malformed(Provider::Gemini, "missing candidates[0].content.parts[0].text"))
    }
}
