//! Engine adapters: run one backend over an image without ever failing.
//!
//! A backend error, a panic inside the engine, or a timeout all become an
//! [`EngineOutcome::Failed`], whose raw text is the empty string. One broken
//! engine never aborts the other engines or the request.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::backend::{OcrBackend, OcrBackendType, OcrError, OcrResult};

/// What a single engine produced for one image.
#[derive(Debug)]
pub enum EngineOutcome {
    /// The engine ran and returned text (possibly empty: no detections).
    Text(OcrResult),
    /// The engine failed; the message is kept for logging only.
    Failed(String),
}

/// One engine invocation.
#[derive(Debug)]
pub struct EngineRun {
    pub engine: OcrBackendType,
    pub outcome: EngineOutcome,
    pub elapsed_ms: u64,
}

impl EngineRun {
    /// Raw text of the run; empty when the engine failed.
    pub fn raw_text(&self) -> &str {
        match &self.outcome {
            EngineOutcome::Text(result) => &result.text,
            EngineOutcome::Failed(_) => "",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, EngineOutcome::Failed(_))
    }
}

/// Wraps a shared backend with a per-run timeout.
#[derive(Clone)]
pub struct EngineAdapter {
    backend: Arc<dyn OcrBackend>,
    timeout: Duration,
}

impl EngineAdapter {
    pub fn new(backend: Arc<dyn OcrBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn engine(&self) -> OcrBackendType {
        self.backend.backend_type()
    }

    /// Engine identifier used as the key in responses.
    pub fn name(&self) -> &'static str {
        self.engine().as_str()
    }

    pub fn backend(&self) -> &dyn OcrBackend {
        self.backend.as_ref()
    }

    /// Run the engine on a blocking thread and absorb every failure.
    ///
    /// On timeout the blocking thread is left to finish on its own; its
    /// result is discarded.
    pub async fn run(&self, image_path: &Path) -> EngineRun {
        let engine = self.engine();
        let backend = Arc::clone(&self.backend);
        let path = image_path.to_path_buf();
        let start = Instant::now();

        let task = tokio::task::spawn_blocking(move || backend.ocr_image(&path));

        let outcome = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(result))) => {
                debug!(
                    "{} produced {} chars in {}ms",
                    engine,
                    result.text.len(),
                    result.processing_time_ms
                );
                EngineOutcome::Text(result)
            }
            Ok(Ok(Err(e))) => {
                warn!("OCR engine {} failed: {}", engine, e);
                EngineOutcome::Failed(e.to_string())
            }
            Ok(Err(join_error)) => {
                warn!("OCR engine {} aborted: {}", engine, join_error);
                EngineOutcome::Failed(format!("engine task aborted: {}", join_error))
            }
            Err(_) => {
                let e = OcrError::Timeout(self.timeout.as_secs());
                warn!("OCR engine {}: {}", engine, e);
                EngineOutcome::Failed(e.to_string())
            }
        };

        EngineRun {
            engine,
            outcome,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Join line-oriented detections into one string, one line per detection.
pub fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flatten block → line results, keeping block-then-line order.
pub fn flatten_blocks<B, L>(blocks: B) -> String
where
    B: IntoIterator<Item = L>,
    L: IntoIterator<Item = String>,
{
    join_lines(blocks.into_iter().flatten())
}
