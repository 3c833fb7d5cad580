//! Web upload surface: a single-page form that runs the pipeline on
//! uploaded files.
//!
//! Two routes: `GET /` renders the form, `POST /` accepts a multipart
//! `file` field, stores it, extracts, and re-renders the form with the
//! result. Validation failures (no file, unsupported extension) re-render
//! with a notice instead of redirecting.
//!
//! Uploaded files are stored under a collision-free key
//! `{uuid}_{sanitized-name}`: the client-supplied filename is kept for
//! display only, never trusted as a storage path. Files are written to
//! the upload directory and left there.

use crate::config::ExtractConfig;
use crate::error::OcrError;
use crate::extract::extract;
use crate::pipeline::input;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

/// Uploads larger than this are rejected by the body-limit layer.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for the upload handlers.
struct AppState {
    config: ExtractConfig,
    upload_dir: PathBuf,
}

/// Run the upload server until the process is stopped.
///
/// The upload directory is created if absent. Binding and serving errors
/// surface as [`OcrError::Internal`]; everything request-scoped is
/// rendered into the page instead.
pub async fn serve(
    addr: SocketAddr,
    upload_dir: PathBuf,
    config: ExtractConfig,
) -> Result<(), OcrError> {
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: upload_dir.clone(),
            source: e,
        })?;

    let state = Arc::new(AppState { config, upload_dir });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| OcrError::Internal(format!("could not bind {addr}: {e}")))?;
    info!("upload server listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| OcrError::Internal(format!("server error: {e}")))
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_form).post(handle_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /` — the empty upload form.
async fn show_form() -> Html<String> {
    Html(render_page(None, None, None))
}

/// `POST /` — validate, store, extract, render.
async fn handle_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Html<String> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                file_name = Some(name.to_string());
            }
            match field.bytes().await {
                Ok(b) => file_bytes = Some(b.to_vec()),
                Err(e) => {
                    return Html(render_page(
                        None,
                        None,
                        Some(&format!("Failed to read upload: {e}")),
                    ));
                }
            }
        }
    }

    let (bytes, original_name) = match (file_bytes, file_name) {
        (Some(b), Some(n)) if !b.is_empty() && !n.is_empty() => (b, n),
        _ => return Html(render_page(None, None, Some("No file selected."))),
    };

    if !input::is_supported(Path::new(&original_name)) {
        return Html(render_page(
            Some(&original_name),
            None,
            Some("Unsupported file type. Allowed: png, jpg, jpeg, tiff, bmp, pdf."),
        ));
    }

    // Collision-free storage key; the client filename is display-only.
    let stored_name = format!(
        "{}_{}",
        Uuid::new_v4().simple(),
        sanitize_filename(&original_name)
    );
    let stored_path = state.upload_dir.join(&stored_name);
    if let Err(e) = tokio::fs::write(&stored_path, &bytes).await {
        error!("could not store upload {}: {e}", stored_path.display());
        return Html(render_page(
            Some(&original_name),
            None,
            Some("Could not store the uploaded file."),
        ));
    }
    info!("stored upload {} as {}", original_name, stored_name);

    match extract(&stored_path, &state.config).await {
        Ok(output) => {
            let notice = if output.stats.failed_pages > 0 {
                let failures: Vec<String> = output
                    .failed_pages()
                    .filter_map(|p| p.error.as_ref().map(|e| e.to_string()))
                    .collect();
                Some(failures.join("; "))
            } else {
                None
            };
            Html(render_page(
                Some(&original_name),
                Some(&output.text),
                notice.as_deref(),
            ))
        }
        Err(e) => {
            error!("extraction failed for {}: {e}", original_name);
            Html(render_page(Some(&original_name), None, Some(&e.to_string())))
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Path separators and parent references are stripped by taking only the
/// final component; remaining characters outside `[A-Za-z0-9._-]` become
/// underscores.
pub fn sanitize_filename(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim_start_matches('.');
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Minimal HTML escaping for text interpolated into the page.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the single page: form, optional notice, optional result.
fn render_page(filename: Option<&str>, text: Option<&str>, notice: Option<&str>) -> String {
    let mut body = String::from(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>doc2text</title></head>\n<body>\n\
         <h1>Extract text from an image or PDF</h1>\n\
         <form method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\">\n\
         <button type=\"submit\">Upload</button>\n\
         </form>\n",
    );
    if let Some(msg) = notice {
        body.push_str(&format!("<p class=\"notice\">{}</p>\n", escape_html(msg)));
    }
    if let Some(text) = text {
        let heading = match filename {
            Some(name) => format!("Extracted text from {}", escape_html(name)),
            None => "Extracted text".to_string(),
        };
        body.push_str(&format!(
            "<h2>{heading}</h2>\n<pre>{}</pre>\n",
            escape_html(text)
        ));
    }
    body.push_str("</body>\n</html>\n");
    body
}
