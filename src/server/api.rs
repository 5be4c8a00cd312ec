use crate::gateway::{ ChatFailure, ChatGateway };
use crate::models::chat::ChatRequest;
use std::any::Any;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{ rejection::BytesRejection, DefaultBodyLimit, State },
    http::StatusCode,
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{ Any as AnyOrigin, CorsLayer };
use log::{ info, error };

pub const CHAT_PATH: &str = "/api/chat";
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    gateway: Arc<ChatGateway>,
}

/// Paths to a PEM certificate and key for serving HTTPS.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

pub fn router(gateway: Arc<ChatGateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route(CHAT_PATH, post(chat_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .with_state(AppState { gateway })
}

pub async fn start_http_server(
    addr: SocketAddr,
    gateway: Arc<ChatGateway>,
    tls: Option<TlsPaths>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(gateway);

    match tls {
        Some(paths) => {
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &paths.cert_path,
                &paths.key_path
            ).await?;
            info!("HTTPS chat gateway listening on: https://{}{}", addr, CHAT_PATH);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("HTTP chat gateway listening on: http://{}{}", addr, CHAT_PATH);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            error!("Chat API error: request body rejected: {}", e.body_text());
            return failure_response(ChatFailure::Internal);
        }
    };

    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("Chat API error: unreadable request body: {}", e);
            return failure_response(ChatFailure::Internal);
        }
    };

    match state.gateway.handle(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(failure) => failure_response(failure),
    }
}

fn status_for(failure: &ChatFailure) -> StatusCode {
    match failure {
        ChatFailure::Validation => StatusCode::BAD_REQUEST,
        ChatFailure::Provider(_) | ChatFailure::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_response(failure: ChatFailure) -> Response {
    (status_for(&failure), Json(failure.envelope())).into_response()
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Chat API error: handler panicked");
    failure_response(ChatFailure::Internal)
}
