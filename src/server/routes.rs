use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::ApiError;
use super::AppState;
use crate::loader::read_table;
use crate::models::ChartRecord;
use crate::storage::allowed_file;
use crate::transform::{transform, Severity};
use crate::utils::Timer;

const INDEX_HTML: &str = include_str!("index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /upload` — multipart form with a `file` field.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            debug!("Skipping form field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::BadRequest("No selected file".into()));
        }
        if !allowed_file(&filename) {
            return Err(ApiError::BadRequest("Allowed file types are CSV".into()));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        let saved = state.store.save(&filename, &bytes)?;

        return Ok(Json(json!({
            "message": format!("File {} uploaded successfully!", saved)
        })));
    }

    Err(ApiError::BadRequest("No file part".into()))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

/// `GET /files`
pub async fn list_files(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.store.list()?))
}

/// `GET /data` — the configured default file.
pub async fn default_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChartRecord>>, ApiError> {
    let filename = state.config.storage.default_file.clone();
    chart_data(&state, filename).await
}

/// `GET /data/{filename}`
pub async fn data(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Vec<ChartRecord>>, ApiError> {
    chart_data(&state, filename).await
}

async fn chart_data(state: &AppState, filename: String) -> Result<Json<Vec<ChartRecord>>, ApiError> {
    let Some(path) = state.store.resolve(&filename) else {
        return Err(ApiError::NotFound(format!(
            "File '{}' not found. Please upload it first.",
            filename
        )));
    };

    let records = tokio::task::spawn_blocking(move || {
        let _t = Timer::start(format!("chart data {:?}", path));

        let file = std::fs::File::open(&path).map_err(|e| processing(e.to_string(), Severity::Server))?;
        let table = read_table(file).map_err(|e| {
            let severity = if e.is_io_error() { Severity::Server } else { Severity::Client };
            processing(e.to_string(), severity)
        })?;
        let records = transform(&table)?;

        info!("{:?}: {} records", path, records.len());
        Ok::<_, ApiError>(records)
    })
    .await
    .map_err(|e| processing(e.to_string(), Severity::Server))??;

    Ok(Json(records))
}

/// Failure while reading the file rather than inside the transform.
fn processing(detail: String, severity: Severity) -> ApiError {
    ApiError::with_severity(severity, format!("Error processing CSV: {}", detail))
}
