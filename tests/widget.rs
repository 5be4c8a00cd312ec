use async_trait::async_trait;
use serde_json::Value;
use std::sync::{ Arc, Mutex };

use chat_gateway::config::{ GatewayConfig, KeySource, ProviderKeys };
use chat_gateway::gateway::ChatGateway;
use chat_gateway::llm::chat::mock::{ GREETING_REPLY, THANKS_REPLY };
use chat_gateway::llm::chat::MockDelay;
use chat_gateway::llm::transport::{ Transport, UpstreamRequest, UpstreamResponse };
use chat_gateway::llm::LlmError;
use chat_gateway::models::chat::{ ChatMessage, Role };
use chat_gateway::server::api::{ router, CHAT_PATH };
use chat_gateway::widget::{
    converse,
    ChatWidget,
    WidgetSettings,
    DEFAULT_WELCOME_MESSAGE,
    UNPROCESSED_REPLY,
};

/// Echoes the OpenAI message list length back as the reply text.
#[derive(Default)]
struct CountingUpstream {
    bodies: Mutex<Vec<Value>>,
}

#[async_trait]
impl Transport for CountingUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, LlmError> {
        let count = request.body["messages"].as_array().map(Vec::len).unwrap_or(0);
        self.bodies.lock().unwrap().push(request.body);
        let reply = serde_json::json!({ "choices": [{ "message": { "content": format!("{} messages", count) } }] });
        Ok(UpstreamResponse { status: 200, body: reply.to_string() })
    }
}

async fn spawn_gateway(keys: KeySource, upstream: Arc<CountingUpstream>) -> String {
    let config = GatewayConfig { mock_delay: MockDelay::none(), ..GatewayConfig::default() };
    let app = router(Arc::new(ChatGateway::new(&config, keys, upstream)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}{}", addr, CHAT_PATH)
}

fn settings(endpoint: String, provider: &str) -> WidgetSettings {
    WidgetSettings { endpoint, provider: provider.to_string(), ..WidgetSettings::default() }
}

#[tokio::test]
async fn mock_round_trip_updates_the_transcript() {
    let endpoint = spawn_gateway(KeySource::none(), Arc::default()).await;
    let mut widget = ChatWidget::new(settings(endpoint, "mock")).unwrap();

    let reply = widget.send("  hello  ").await.unwrap();
    assert_eq!(reply.message, ChatMessage::assistant(GREETING_REPLY));

    let roles: Vec<Role> = widget.transcript().iter().map(|e| e.message.role).collect();
    assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(widget.transcript()[0].message.content, DEFAULT_WELCOME_MESSAGE);
    assert_eq!(widget.transcript()[1].message.content, "hello");
}

#[tokio::test]
async fn history_is_sent_with_every_turn() {
    let upstream = Arc::new(CountingUpstream::default());
    let keys = KeySource::Fixed(ProviderKeys { openai: Some("sk-server".into()), ..Default::default() });
    let endpoint = spawn_gateway(keys, upstream.clone()).await;
    let mut widget = ChatWidget::new(settings(endpoint, "openai")).unwrap();

    // system + welcome + current message
    let first = widget.send("first").await.unwrap().message.content.clone();
    assert_eq!(first, "3 messages");

    // system + welcome + first + reply + current message
    let second = widget.send("second").await.unwrap().message.content.clone();
    assert_eq!(second, "5 messages");

    let bodies = upstream.bodies.lock().unwrap();
    let last = bodies.last().unwrap()["messages"].as_array().unwrap().clone();
    assert_eq!(last[1]["content"], DEFAULT_WELCOME_MESSAGE);
    assert_eq!(last[4]["content"], "second");
}

#[tokio::test]
async fn gateway_error_shows_an_apology() {
    let endpoint = spawn_gateway(KeySource::none(), Arc::default()).await;
    let mut widget = ChatWidget::new(settings(endpoint, "anthropic")).unwrap();

    let reply = widget.send("hi").await.unwrap();
    assert_eq!(reply.message, ChatMessage::assistant(UNPROCESSED_REPLY));
}

#[tokio::test]
async fn converse_runs_until_quit() {
    let endpoint = spawn_gateway(KeySource::none(), Arc::default()).await;
    let mut widget = ChatWidget::new(settings(endpoint, "mock")).unwrap();

    let input: &[u8] = b"hello\n\nthanks a lot\n/quit\nnever sent\n";
    let mut out = Vec::new();
    converse(&mut widget, input, &mut out).await.unwrap();

    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(&format!("Assistant: {}", DEFAULT_WELCOME_MESSAGE)));
    assert!(lines[1].ends_with(&format!("Assistant: {}", GREETING_REPLY)));
    assert!(lines[2].ends_with(&format!("Assistant: {}", THANKS_REPLY)));
    assert_eq!(widget.transcript().len(), 5);
}
