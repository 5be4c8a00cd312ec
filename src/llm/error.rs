use super::{ redact, Provider };

/// Failures raised while talking to a provider. Every variant is an
/// upstream-class failure from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error(
        "{} API key not provided. Please add {var} to your environment variables or pass apiKey in the request.",
        name(.provider)
    )]
    MissingCredential {
        provider: Provider,
        var: &'static str,
    },

    #[error("{}", upstream_message(.provider, .status, .body))]
    Upstream {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("Invalid response format from {} API: {detail}", name(.provider))]
    MalformedResponse {
        provider: Provider,
        detail: String,
    },

    #[error("{} API did not respond within {secs}s", name(.provider))]
    Timeout {
        provider: Provider,
        secs: u64,
    },

    #[error("{} API request failed: {detail}", name(.provider))]
    Transport {
        provider: Provider,
        detail: String,
    },
}

fn name(provider: &Provider) -> &'static str {
    provider.display_name()
}

// Gemini failures carry the upstream body; the others only the status.
fn upstream_message(provider: &Provider, status: &u16, body: &str) -> String {
    match provider {
        Provider::Gemini => format!("Gemini API error: {} - {}", status, body),
        other => format!("{} API error: {}", other.display_name(), status),
    }
}

impl LlmError {
    pub fn provider(&self) -> Provider {
        match self {
            LlmError::MissingCredential { provider, .. }
            | LlmError::Upstream { provider, .. }
            | LlmError::MalformedResponse { provider, .. }
            | LlmError::Timeout { provider, .. }
            | LlmError::Transport { provider, .. } => *provider,
        }
    }

    pub fn malformed(provider: Provider, detail: impl Into<String>) -> Self {
        LlmError::MalformedResponse { provider, detail: detail.into() }
    }

    /// Strips `secret` from every free-text field.
    pub fn redacted(self, secret: &str) -> Self {
        match self {
            LlmError::Upstream { provider, status, body } =>
                LlmError::Upstream { provider, status, body: redact(&body, secret) },
            LlmError::MalformedResponse { provider, detail } =>
                LlmError::MalformedResponse { provider, detail: redact(&detail, secret) },
            LlmError::Transport { provider, detail } =>
                LlmError::Transport { provider, detail: redact(&detail, secret) },
            other => other,
        }
    }
}
