use std::fmt;

use crate::llm::Provider;

/// Explicit per-provider API keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub gemini: Option<String>,
    pub openai: Option<String>,
    pub anthropic: Option<String>,
}

impl ProviderKeys {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini => self.gemini.as_deref(),
            Provider::OpenAI => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::Mock => None,
        };
        key.filter(|k| !k.is_empty())
    }
}

// Keys never show up in logs, even through `{:?}`.
impl fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderKeys")
            .field("gemini", &self.gemini.as_ref().map(|_| "<set>"))
            .field("openai", &self.openai.as_ref().map(|_| "<set>"))
            .field("anthropic", &self.anthropic.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Where server-side credentials come from when a request carries no `apiKey`.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Read `GEMINI_API_KEY` / `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` on every call.
    Env,
    Fixed(ProviderKeys),
}

impl KeySource {
    pub fn none() -> Self {
        KeySource::Fixed(ProviderKeys::default())
    }

    /// Looks the key up fresh; nothing is cached between calls.
    pub fn resolve(&self, provider: Provider) -> Option<String> {
        match self {
            KeySource::Env => {
                let var = provider.key_env_var()?;
                std::env::var(var).ok().filter(|k| !k.is_empty())
            }
            KeySource::Fixed(keys) => keys.get(provider).map(str::to_string),
        }
    }

    /// Names of providers that currently have a server-side key.
    pub fn configured(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| p.requires_credential() && self.resolve(*p).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_keys_resolve_per_provider() {
        let source = KeySource::Fixed(ProviderKeys {
            gemini: Some("g".into()),
            openai: Some(String::new()),
            anthropic: None,
        });
        assert_eq!(source.resolve(Provider::Gemini).as_deref(), Some("g"));
        assert_eq!(source.resolve(Provider::OpenAI), None);
        assert_eq!(source.resolve(Provider::Anthropic), None);
        assert_eq!(source.resolve(Provider::Mock), None);
        assert_eq!(source.configured(), vec![Provider::Gemini]);
    }

    #[test]
    fn env_source_never_has_a_mock_key() {
        assert_eq!(KeySource::Env.resolve(Provider::Mock), None);
    }

    #[test]
    fn debug_output_hides_keys() {
        let keys = ProviderKeys { openai: Some("sk-very-secret".into()), ..Default::default() };
        let shown = format!("{:?}", KeySource::Fixed(keys));
        assert!(!shown.contains("sk-very-secret"));
        assert!(shown.contains("<set>"));
    }
}
