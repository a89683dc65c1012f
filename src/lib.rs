//! cardocr - multi-engine OCR and contact extraction.
//!
//! Runs several OCR engines over a visiting card or document image, merges
//! their normalized output with any supplied text, and extracts emails,
//! phone numbers, addresses and numbers from the result.

#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod server;
pub mod text;

pub use config::{Config, ConfigError, Preset};
pub use extract::{ExtractionConfig, ExtractionResult, ExtractorSet};
pub use pipeline::{ImageUpload, InputBundle, Pipeline, PipelineError, ProcessResponse};
pub use text::{Charset, TextNormalizer};
