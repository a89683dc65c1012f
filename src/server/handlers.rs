//! Request handlers.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use super::error::{ApiError, ErrorBody};
use super::AppState;
use crate::ocr::EngineStatus;
use crate::pipeline::{ImageUpload, InputBundle, ProcessResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Multipart form accepted by `POST /process`. Both fields are optional,
/// but at least one must be present.
///
/// Only used to generate the OpenAPI schema; the handler reads the fields
/// straight from the multipart stream.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ProcessForm {
    /// Image file (png, jpg, jpeg, bmp).
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    /// Raw text to merge with the OCR output.
    pub text: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = StatusMessage)
    ),
    tag = "Status"
)]
pub async fn home(State(state): State<AppState>) -> Json<StatusMessage> {
    Json(StatusMessage {
        message: state.banner(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Status"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/engines",
    responses(
        (status = 200, description = "Configured OCR engines", body = Vec<EngineStatus>)
    ),
    tag = "Status"
)]
pub async fn list_engines(State(state): State<AppState>) -> Json<Vec<EngineStatus>> {
    Json(state.pipeline.registry().statuses())
}

#[utoipa::path(
    post,
    path = "/process",
    request_body(content = ProcessForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "OCR output and extracted fields", body = ProcessResponse),
        (status = 400, description = "No input, invalid file type or malformed form", body = ErrorBody),
        (status = 500, description = "OCR failed", body = ErrorBody)
    ),
    tag = "OCR"
)]
pub async fn process_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut image = None;
    let mut text = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                debug!("Received image {} ({} bytes)", file_name, bytes.len());
                image = Some(ImageUpload::new(file_name, bytes.to_vec()));
            }
            "text" => text = Some(field.text().await?),
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    let response = state
        .pipeline
        .process(InputBundle::new(image, text))
        .await?;
    Ok(Json(response))
}
