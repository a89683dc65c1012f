//! OpenAPI spec generation and serving.

use axum::{http::StatusCode, response::IntoResponse};
use utoipa::OpenApi;

use super::error;
use super::handlers;
use crate::extract::ExtractionResult;
use crate::ocr::EngineStatus;
use crate::pipeline::ProcessResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "cardocr API",
        description = "Multi-engine OCR and contact extraction",
        version = "0.3.0"
    ),
    paths(
        handlers::home,
        handlers::health,
        handlers::list_engines,
        handlers::process_document,
    ),
    components(schemas(
        handlers::StatusMessage,
        handlers::HealthResponse,
        handlers::ProcessForm,
        error::ErrorBody,
        EngineStatus,
        ExtractionResult,
        ProcessResponse,
    )),
    tags(
        (name = "Status", description = "Service status"),
        (name = "OCR", description = "Image and text processing"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI JSON document.
pub async fn openapi_spec() -> impl IntoResponse {
    let spec = ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
    (StatusCode::OK, [("content-type", "application/json")], spec)
}
