//! Local web UI.
//!
//! ```text
//! GET  /         upload form (files + server-side folder path)
//! POST /convert  multipart form → markitdown_converted.zip
//! POST /results  same form → HTML summary with previews and the zip inline
//! GET  /health   JSON liveness check
//! ```
//!
//! One request converts its files sequentially; there is no state shared
//! between requests beyond the immutable [`AppState`].

pub mod error;
pub mod handlers;
pub mod page;

use crate::config::{ConversionConfig, ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::converter::DocumentConverter;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::WebError;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<dyn DocumentConverter>,
    pub config: ConversionConfig,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(converter: Arc<dyn DocumentConverter>, config: ConversionConfig) -> Self {
        Self {
            converter,
            config,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

/// Build the router without the HTTP trace layer (tests drive this directly).
pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/convert", post(handlers::convert))
        .route("/results", post(handlers::results))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Bind `server.socket_addr()` and serve until Ctrl-C or SIGTERM.
pub async fn serve(server: ServerConfig, state: AppState) -> std::io::Result<()> {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                info!("Finished in {:?} with status {}", latency, response.status());
            },
        );

    let converter_name = state.converter.name().to_string();
    let app = router(state.with_max_upload_bytes(server.max_upload_bytes)).layer(trace_layer);
    let listener = tokio::net::TcpListener::bind(server.socket_addr()).await?;

    info!(
        "mdbatch UI listening on http://{} (converter: {})",
        listener.local_addr()?,
        converter_name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
