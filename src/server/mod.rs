pub mod api;

use crate::cli::Args;
use crate::gateway::ChatGateway;
use api::TlsPaths;
use log::{ info, warn };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Server {
    addr: String,
    gateway: Arc<ChatGateway>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, gateway: Arc<ChatGateway>, args: Args) -> Self {
        let configured = gateway.keys().configured();
        if configured.is_empty() {
            warn!(
                "No server-side provider keys found. Set GEMINI_API_KEY, OPENAI_API_KEY or \
                ANTHROPIC_API_KEY, or have clients pass apiKey."
            );
        } else {
            let names: Vec<&str> = configured.iter().map(|p| p.as_str()).collect();
            info!("Server-side keys present for: {}", names.join(", "));
        }

        Self { addr, gateway, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        api::start_http_server(addr, self.gateway.clone(), self.tls_paths()?).await
    }

    fn tls_paths(&self) -> Result<Option<TlsPaths>, Box<dyn Error + Send + Sync>> {
        if !self.args.enable_tls {
            return Ok(None);
        }
        match (&self.args.tls_cert_path, &self.args.tls_key_path) {
            (Some(cert_path), Some(key_path)) => {
                info!(
                    "TLS enabled. Loading certificate from '{}' and key from '{}'",
                    cert_path,
                    key_path
                );
                Ok(Some(TlsPaths { cert_path: cert_path.clone(), key_path: key_path.clone() }))
            }
            (Some(_), None) | (None, Some(_)) => {
                Err("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.".into())
            }
            (None, None) => Err("TLS enabled without cert/key".into()),
        }
    }
}
