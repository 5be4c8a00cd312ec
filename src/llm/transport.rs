use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use std::time::Duration;

use super::{ LlmError, Provider };

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// A fully shaped outbound call. The URL never carries the credential;
/// secrets travel in `query` or `headers` only.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub provider: Provider,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl UpstreamRequest {
    pub fn post(provider: Provider, url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            provider,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs exactly one HTTP exchange per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, LlmError>;
}

pub struct HttpTransport {
    http: HttpClient,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()?;
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, LlmError> {
        let provider = request.provider;
        debug!("HttpTransport::send() → provider={} url={}", provider, request.url);

        let mut req = self.http.post(&request.url).json(&request.body);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(|e| self.classify(provider, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(provider, e))?;
        debug!("HttpTransport::send() ← provider={} status={}", provider, status);

        Ok(UpstreamResponse { status, body })
    }
}

impl HttpTransport {
    fn classify(&self, provider: Provider, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout { provider, secs: self.timeout.as_secs() }
        } else {
            // reqwest includes the full URL (query string too) in its message.
            LlmError::Transport { provider, detail: err.without_url().to_string() }
        }
    }
}
