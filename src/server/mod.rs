//! HTTP interface.
//!
//! - `GET /` service banner
//! - `POST /process` multipart `image` and/or `text`, returns OCR output
//!   and extracted fields
//! - `GET /engines` configured engines and their availability
//! - `GET /health`
//! - `GET /api-docs/openapi.json`

mod error;
mod handlers;
mod openapi;
mod routes;

pub use error::{ApiError, ErrorBody};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::text::Charset;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub charset: Charset,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            pipeline: Arc::new(Pipeline::from_config(config)?),
            charset: config.charset,
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Status line naming the engines and charset in use.
    pub fn banner(&self) -> String {
        let engines = self.pipeline.registry().names();
        let engines = if engines.is_empty() {
            "no engines".to_string()
        } else {
            engines.join(" + ")
        };
        format!("OCR API running ({}, {})", engines, self.charset.as_str())
    }
}

/// Start the web server.
pub async fn serve(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
