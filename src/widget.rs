//! Client side of the chat widget: keeps the transcript, posts each turn to
//! the gateway with the full history, and turns any failure into a friendly
//! assistant reply instead of an error.

use chrono::{ DateTime, Local };
use log::{ debug, warn };
use std::io::Write;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt };
use url::Url;

use crate::models::chat::{ ChatMessage, ChatRequest, Role };

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/chat";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const UNPROCESSED_REPLY: &str =
    "I'm sorry, I couldn't process your request right now. Please try again.";
pub const TRANSPORT_FAILURE_REPLY: &str =
    "I'm experiencing technical difficulties. Please try again in a moment.";

const QUIT_COMMAND: &str = "/quit";

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("invalid chat endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        endpoint: String,
        reason: String,
    },

    #[error("HTTP client build failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct WidgetSettings {
    pub endpoint: String,
    pub provider: String,
    pub api_key: Option<String>,
    pub welcome_message: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            provider: "mock".to_string(),
            api_key: None,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub message: ChatMessage,
    pub at: DateTime<Local>,
}

impl TranscriptEntry {
    fn now(message: ChatMessage) -> Self {
        Self { message, at: Local::now() }
    }

    /// `[14:05] Assistant: ...`
    pub fn render(&self) -> String {
        let speaker = match self.message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        };
        format!("[{}] {}: {}", self.at.format("%H:%M"), speaker, self.message.content)
    }
}

pub struct ChatWidget {
    settings: WidgetSettings,
    endpoint: Url,
    http: reqwest::Client,
    transcript: Vec<TranscriptEntry>,
}

impl ChatWidget {
    pub fn new(settings: WidgetSettings) -> Result<Self, WidgetError> {
        let endpoint = Url::parse(&settings.endpoint).map_err(|e| WidgetError::InvalidEndpoint {
            endpoint: settings.endpoint.clone(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder().build()?;
        let welcome = TranscriptEntry::now(ChatMessage::assistant(settings.welcome_message.clone()));

        Ok(Self {
            settings,
            endpoint,
            http,
            transcript: vec![welcome],
        })
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Sends one user turn. Blank input is ignored and returns `None`;
    /// otherwise the assistant's reply entry is returned.
    pub async fn send(&mut self, input: &str) -> Option<&TranscriptEntry> {
        let content = input.trim();
        if content.is_empty() {
            return None;
        }

        let request = ChatRequest {
            message: Some(content.to_string()),
            conversation: Some(self.transcript.iter().map(|e| e.message.clone()).collect()),
            provider: Some(self.settings.provider.clone()),
            api_key: self.settings.api_key.clone(),
        };
        self.transcript.push(TranscriptEntry::now(ChatMessage::user(content)));

        let reply = self.post(&request).await;
        self.transcript.push(TranscriptEntry::now(ChatMessage::assistant(reply)));
        self.transcript.last()
    }

    async fn post(&self, request: &ChatRequest) -> String {
        let response = match self.http.post(self.endpoint.clone()).json(request).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error sending message: {}", e.without_url());
                return TRANSPORT_FAILURE_REPLY.to_string();
            }
        };
        debug!("Gateway answered with status {}", response.status());

        match response.json::<serde_json::Value>().await {
            Ok(data) =>
                data
                    .get("response")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(UNPROCESSED_REPLY)
                    .to_string(),
            Err(e) => {
                warn!("Error reading gateway reply: {}", e.without_url());
                TRANSPORT_FAILURE_REPLY.to_string()
            }
        }
    }
}

/// Line-oriented chat loop: each input line is one turn, `/quit` or EOF ends it.
pub async fn converse<R, W>(widget: &mut ChatWidget, input: R, out: &mut W) -> std::io::Result<()>
    where R: AsyncBufRead + Unpin, W: Write
{
    if let Some(welcome) = widget.transcript().first() {
        writeln!(out, "{}", welcome.render())?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            break;
        }
        if let Some(reply) = widget.send(&line).await {
            writeln!(out, "{}", reply.render())?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_welcome_turn() {
        let widget = ChatWidget::new(WidgetSettings::default()).unwrap();
        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].message, ChatMessage::assistant(DEFAULT_WELCOME_MESSAGE));
    }

    #[test]
    fn rejects_bad_endpoint() {
        let settings = WidgetSettings { endpoint: "not a url".into(), ..Default::default() };
        assert!(matches!(ChatWidget::new(settings), Err(WidgetError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut widget = ChatWidget::new(WidgetSettings::default()).unwrap();
        assert!(widget.send("   ").await.is_none());
        assert_eq!(widget.transcript().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_gateway_yields_apology() {
        let settings = WidgetSettings {
            endpoint: "http://127.0.0.1:9/api/chat".into(),
            ..Default::default()
        };
        let mut widget = ChatWidget::new(settings).unwrap();
        let reply = widget.send("hello").await.unwrap().message.clone();
        assert_eq!(reply, ChatMessage::assistant(TRANSPORT_FAILURE_REPLY));
        assert_eq!(widget.transcript().len(), 3);
        assert_eq!(widget.transcript()[1].message, ChatMessage::user("hello"));
    }

    #[test]
    fn render_names_the_speaker() {
        let entry = TranscriptEntry::now(ChatMessage::user("hey"));
        let line = entry.render();
        assert!(line.ends_with("] You: hey"));
        assert!(line.starts_with('['));
    }
}
