use crate::archive::{build_archive, ARCHIVE_FILE_NAME};
use crate::convert::convert_batch;
use crate::input::{collect_inputs, stage_uploads, Upload};
use crate::output::{BatchOutput, BatchStats};
use crate::web::page::{render_page, render_results, Notice};
use crate::web::{AppState, WebError};
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Summary headers attached to every conversion response.
pub const HEADER_TOTAL: &str = "x-mdbatch-total";
pub const HEADER_CONVERTED: &str = "x-mdbatch-converted";
pub const HEADER_FAILED: &str = "x-mdbatch-failed";

pub async fn index() -> Html<String> {
    Html(render_page(None))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub converter: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        converter: state.converter.name().to_string(),
    })
}

/// Parsed `POST /convert` form.
#[derive(Debug, Default)]
struct ConvertForm {
    uploads: Vec<Upload>,
    folder: Option<PathBuf>,
    recursive: bool,
}

fn multipart_error(e: MultipartError) -> WebError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        WebError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        WebError::BadRequest(e.body_text())
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<ConvertForm, WebError> {
    let mut form = ConvertForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send one empty part when no file was picked.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.uploads.push(Upload {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "folder" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    form.folder = Some(PathBuf::from(text));
                }
            }
            "recursive" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.recursive = matches!(text.trim(), "on" | "true" | "1" | "yes");
            }
            other => {
                warn!("Ignoring unknown form field '{}'", other);
            }
        }
    }

    Ok(form)
}

/// A finished batch together with its archive.
struct Converted {
    output: BatchOutput,
    archive: Vec<u8>,
}

/// Parse the form, convert every input and build the archive.
///
/// An unchecked `recursive` checkbox is simply absent from the form, so a
/// missing field means "do not recurse". `Ok(None)` means there was nothing
/// to convert.
async fn run_conversion(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Option<Converted>, WebError> {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            // Drain the rest of the body so the browser sees our response, not a reset.
            warn!("Form parsing failed: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            return Err(e);
        }
    };

    let mut config = state.config.clone();
    config.recursive = form.recursive;

    let staged = stage_uploads(form.uploads).await?;
    let items = collect_inputs(&staged, form.folder.as_deref(), &config)?;

    if items.is_empty() {
        info!("No files to convert");
        return Ok(None);
    }

    let output = convert_batch(&items, state.converter.as_ref(), &config).await;
    drop(staged);

    let archive = match build_archive(&output.results)? {
        Some(bytes) => bytes,
        None => return Err(WebError::Internal("archive missing for non-empty batch".into())),
    };

    info!(
        "Built {} ({} bytes): {}/{} converted",
        ARCHIVE_FILE_NAME,
        archive.len(),
        output.stats.converted_files,
        output.stats.total_files
    );

    Ok(Some(Converted { output, archive }))
}

fn nothing_to_convert() -> Response {
    (
        StatusCode::OK,
        Html(render_page(Some(&Notice::Warning(
            "No files to convert".to_string(),
        )))),
    )
        .into_response()
}

fn with_summary_headers(
    builder: axum::http::response::Builder,
    stats: &BatchStats,
) -> axum::http::response::Builder {
    builder
        .header(HEADER_TOTAL, stats.total_files.to_string())
        .header(HEADER_CONVERTED, stats.converted_files.to_string())
        .header(HEADER_FAILED, stats.failed_files.to_string())
}

/// Convert the submitted files and reply with the zip archive.
pub async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let Some(Converted { output, archive }) = run_conversion(&state, &mut multipart).await? else {
        return Ok(nothing_to_convert());
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", ARCHIVE_FILE_NAME),
        );
    with_summary_headers(builder, &output.stats)
        .body(Body::from(archive))
        .map_err(|e| WebError::Internal(e.to_string()))
}

/// Convert the submitted files and reply with the results page: summary,
/// per-file status, previews and the archive as an inline download.
pub async fn results(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let Some(Converted { output, archive }) = run_conversion(&state, &mut multipart).await? else {
        return Ok(nothing_to_convert());
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8");
    with_summary_headers(builder, &output.stats)
        .body(Body::from(render_results(&output, &archive)))
        .map_err(|e| WebError::Internal(e.to_string()))
}
