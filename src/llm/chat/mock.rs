use async_trait::async_trait;
use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::time::Duration;

use super::ChatAdapter;
use crate::llm::{ LlmError, Provider };
use crate::models::chat::ChatMessage;

pub const GREETING_REPLY: &str = "Hello! It's great to meet you. How can I assist you today?";
pub const HELP_REPLY: &str =
    "I'm here to help! What specific topic or question would you like to explore?";
pub const THANKS_REPLY: &str =
    "You're very welcome! I'm glad I could help. Is there anything else you'd like to know?";

pub const GENERIC_REPLIES: [&str; 5] = [
    "That's an interesting question! Let me help you with that.",
    "I understand what you're asking. Here's what I think...",
    "Great question! Based on what you've shared, I'd suggest...",
    "I'd be happy to help you with that. Here's my perspective...",
    "That's a good point. Let me provide some insights on that topic.",
];

/// Simulated latency before a mock reply, sampled uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelay {
    pub min: Duration,
    pub max: Duration,
}

impl Default for MockDelay {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(3000),
        }
    }
}

impl MockDelay {
    pub fn none() -> Self {
        Self { min: Duration::ZERO, max: Duration::ZERO }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// Canned reply for greeting, help and thanks keywords, checked in that order.
pub fn keyword_reply(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    if lowered.contains("hello") || lowered.contains("hi") {
        Some(GREETING_REPLY)
    } else if lowered.contains("help") {
        Some(HELP_REPLY)
    } else if lowered.contains("thank") {
        Some(THANKS_REPLY)
    } else {
        None
    }
}

pub fn mock_reply(message: &str) -> &'static str {
    keyword_reply(message).unwrap_or_else(|| {
        GENERIC_REPLIES.choose(&mut rand::rng()).copied().unwrap_or(GENERIC_REPLIES[0])
    })
}

/// Local stand-in for a provider. Ignores history and credentials and never fails.
pub struct MockAdapter {
    delay: MockDelay,
}

impl MockAdapter {
    pub fn new(delay: MockDelay) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ChatAdapter for MockAdapter {
    fn provider(&self) -> Provider {
        Provider::Mock
    }

    async fn complete(
        &self,
        message: &str,
        _conversation: &[ChatMessage],
        _credential: &str
    ) -> Result<String, LlmError> {
        let pause = self.delay.sample();
        debug!("MockAdapter::complete() → sleeping {:?}", pause);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        Ok(mock_reply(message).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_matches_any_case() {
        assert_eq!(keyword_reply("HELLO there"), Some(GREETING_REPLY));
        assert_eq!(keyword_reply("Oh, Hi!"), Some(GREETING_REPLY));
    }

    #[test]
    fn hi_matches_inside_words() {
        // Plain substring search: "this" contains "hi".
        assert_eq!(keyword_reply("what is this"), Some(GREETING_REPLY));
    }

    #[test]
    fn help_without_greeting() {
        assert_eq!(keyword_reply("Can you HELP me"), Some(HELP_REPLY));
    }

    #[test]
    fn thanks_reply() {
        assert_eq!(keyword_reply("Thank you so much"), Some(THANKS_REPLY));
        assert_eq!(keyword_reply("many thanks"), Some(THANKS_REPLY));
    }

    #[test]
    fn greeting_wins_over_thanks() {
        assert_eq!(keyword_reply("hi, thank you"), Some(GREETING_REPLY));
    }

    #[test]
    fn help_wins_over_thanks() {
        assert_eq!(keyword_reply("thank you for the help"), Some(HELP_REPLY));
    }

    #[test]
    fn no_keyword_picks_generic_phrase() {
        assert_eq!(keyword_reply("quantum flux capacitor"), None);
        for _ in 0..50 {
            let reply = mock_reply("quantum flux capacitor");
            assert!(GENERIC_REPLIES.contains(&reply));
        }
    }

    #[test]
    fn delay_sample_stays_in_range() {
        let delay = MockDelay::default();
        for _ in 0..50 {
            let d = delay.sample();
            assert!(d >= delay.min && d <= delay.max);
        }
        assert_eq!(MockDelay::none().sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn adapter_ignores_history_and_credential() {
        let adapter = MockAdapter::new(MockDelay::none());
        let history = vec![ChatMessage::user("thank you")];
        let reply = adapter.complete("hello", &history, "").await.unwrap();
        assert_eq!(reply, GREETING_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn adapter_waits_before_replying() {
        let delay = MockDelay {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(1000),
        };
        let adapter = MockAdapter::new(delay);
        let started = tokio::time::Instant::now();
        adapter.complete("help", &[], "").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }
}
