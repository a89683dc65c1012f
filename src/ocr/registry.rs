//! The configured set of OCR engines, built once at startup.
//!
//! Engines run in registration order, and that order is also the order of
//! per-engine results in responses and in the combined text.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::adapter::EngineAdapter;
use super::backend::{OcrBackend, OcrBackendType, OcrConfig};
use super::tesseract::TesseractBackend;

#[cfg(feature = "ocr-ocrs")]
use super::ocrs_backend::OcrsBackend;
#[cfg(feature = "ocr-paddle")]
use super::paddle_backend::PaddleBackend;

/// Availability report for one configured engine.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EngineStatus {
    pub name: String,
    pub available: bool,
    pub hint: String,
}

/// Ordered, read-only collection of engine adapters.
#[derive(Clone)]
pub struct EngineRegistry {
    adapters: Vec<EngineAdapter>,
    timeout: Duration,
}

impl EngineRegistry {
    /// Create an empty registry whose engines run with the given timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            adapters: Vec::new(),
            timeout,
        }
    }

    /// Build a registry from engine names, skipping unknown names, engines
    /// not compiled into this build, and duplicates.
    pub fn from_names<S: AsRef<str>>(names: &[S], config: &OcrConfig, timeout: Duration) -> Self {
        let mut registry = Self::new(timeout);

        for name in names {
            let name = name.as_ref();
            let Some(backend) = Self::create_backend(name, config) else {
                warn!("OCR engine '{}' is unknown or not compiled in, skipping", name);
                continue;
            };
            if !backend.is_available() {
                warn!(
                    "OCR engine {} is not available: {}",
                    backend.backend_type(),
                    backend.availability_hint()
                );
            }
            registry.register(backend);
        }

        info!("OCR engines initialized: [{}]", registry.names().join(", "));

        registry
    }

    /// Create a backend by name.
    fn create_backend(name: &str, config: &OcrConfig) -> Option<Arc<dyn OcrBackend>> {
        match OcrBackendType::from_str(name)? {
            OcrBackendType::Tesseract => {
                Some(Arc::new(TesseractBackend::with_config(config.clone())))
            }
            #[cfg(feature = "ocr-ocrs")]
            OcrBackendType::Ocrs => Some(Arc::new(OcrsBackend::with_config(config.clone()))),
            #[cfg(feature = "ocr-paddle")]
            OcrBackendType::PaddleOcr => {
                Some(Arc::new(PaddleBackend::with_config(config.clone())))
            }
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Register a backend. Returns false if an engine of the same type is
    /// already registered.
    pub fn register(&mut self, backend: Arc<dyn OcrBackend>) -> bool {
        let engine = backend.backend_type();
        if self.adapters.iter().any(|a| a.engine() == engine) {
            warn!("OCR engine {} registered twice, keeping the first", engine);
            return false;
        }
        debug!("Registered OCR engine {}", engine);
        self.adapters.push(EngineAdapter::new(backend, self.timeout));
        true
    }

    pub fn adapters(&self) -> impl Iterator<Item = &EngineAdapter> {
        self.adapters.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Availability of every registered engine.
    pub fn statuses(&self) -> Vec<EngineStatus> {
        self.adapters
            .iter()
            .map(|a| EngineStatus {
                name: a.name().to_string(),
                available: a.backend().is_available(),
                hint: a.backend().availability_hint(),
            })
            .collect()
    }
}
