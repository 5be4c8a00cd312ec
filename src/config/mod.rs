pub mod credentials;

use std::time::Duration;
use url::Url;

use crate::cli::Args;
use crate::llm::chat::{ anthropic, gemini, openai, MockDelay };

pub use credentials::{ KeySource, ProviderKeys };

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} '{value}': {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("mock delay bounds are inverted: min {min_ms}ms > max {max_ms}ms")]
    InvertedMockDelay {
        min_ms: u64,
        max_ms: u64,
    },

    #[error("upstream timeout must be at least one second")]
    ZeroTimeout,
}

/// Where a provider lives and which model it is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub model: String,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), model: model.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub gemini: ProviderEndpoint,
    pub openai: ProviderEndpoint,
    pub anthropic: ProviderEndpoint,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini: ProviderEndpoint::new(gemini::DEFAULT_BASE_URL, gemini::DEFAULT_MODEL),
            openai: ProviderEndpoint::new(openai::DEFAULT_BASE_URL, openai::DEFAULT_MODEL),
            anthropic: ProviderEndpoint::new(anthropic::DEFAULT_BASE_URL, anthropic::DEFAULT_MODEL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub endpoints: Endpoints,
    pub upstream_timeout: Duration,
    pub mock_delay: MockDelay,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            upstream_timeout: Duration::from_secs(30),
            mock_delay: MockDelay::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let endpoints = Endpoints {
            gemini: ProviderEndpoint::new(
                checked_url("GEMINI_BASE_URL", &args.gemini_base_url)?,
                args.gemini_model.clone()
            ),
            openai: ProviderEndpoint::new(
                checked_url("OPENAI_BASE_URL", &args.openai_base_url)?,
                args.openai_model.clone()
            ),
            anthropic: ProviderEndpoint::new(
                checked_url("ANTHROPIC_BASE_URL", &args.anthropic_base_url)?,
                args.anthropic_model.clone()
            ),
        };

        if args.upstream_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if args.mock_delay_min_ms > args.mock_delay_max_ms {
            return Err(ConfigError::InvertedMockDelay {
                min_ms: args.mock_delay_min_ms,
                max_ms: args.mock_delay_max_ms,
            });
        }

        Ok(Self {
            endpoints,
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
            mock_delay: MockDelay {
                min: Duration::from_millis(args.mock_delay_min_ms),
                max: Duration::from_millis(args.mock_delay_max_ms),
            },
        })
    }
}

fn checked_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        other =>
            Err(ConfigError::InvalidUrl {
                name,
                value: value.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
    }
}
