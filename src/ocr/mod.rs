//! OCR engines and the adapters that run them.
//!
//! ## OCR Backends
//!
//! - **Tesseract**: Traditional OCR via the system binary (always compiled)
//! - **OCRS**: Pure Rust OCR, no external binaries (feature: ocr-ocrs)
//! - **PaddleOCR**: CNN-based, GPU support via ONNX (feature: ocr-paddle)
//!
//! Backends are wrapped in [`EngineAdapter`]s, which turn every engine
//! failure into an empty result, and collected in an [`EngineRegistry`].

mod adapter;
mod backend;
mod model_utils;
mod registry;
mod tesseract;

#[cfg(feature = "ocr-ocrs")]
mod ocrs_backend;
#[cfg(feature = "ocr-paddle")]
mod paddle_backend;

pub use adapter::{flatten_blocks, join_lines, EngineAdapter, EngineOutcome, EngineRun};
pub use backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult};
pub use registry::{EngineRegistry, EngineStatus};
pub use tesseract::TesseractBackend;

#[cfg(feature = "ocr-ocrs")]
pub use ocrs_backend::OcrsBackend;
#[cfg(feature = "ocr-paddle")]
pub use paddle_backend::PaddleBackend;
