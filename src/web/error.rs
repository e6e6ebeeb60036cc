use crate::error::MdBatchError;
use crate::web::page::{render_page, Notice};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Errors a handler can return; rendered as the form page with a notice.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Batch(#[from] MdBatchError),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            WebError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            WebError::Batch(e) if e.is_input_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            WebError::Batch(e) => {
                tracing::error!("Batch error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            WebError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Html(render_page(Some(&Notice::Error(message))))).into_response()
    }
}
