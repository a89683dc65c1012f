//! OCRS engine (pure Rust, feature `ocr-ocrs`).
//!
//! Words are detected, grouped into text lines, and each line is recognized
//! separately; the adapter output is one line of text per detected line.
//! Models are downloaded on first use from
//! https://ocrs-models.s3-accelerate.amazonaws.com/

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use tracing::info;

use super::adapter::join_lines;
use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult};
use super::model_utils::{
    build_ocr_result, ensure_models_present, model_availability_hint, ModelDirConfig, ModelSpec,
};

/// Process-wide engine. `OcrEngine` is `Sync` and only needs `&self`.
static ENGINE: OnceLock<OcrEngine> = OnceLock::new();

const MODELS: ModelDirConfig = ModelDirConfig {
    subdir: "ocrs",
    required_files: &["text-detection.rten", "text-recognition.rten"],
};

const DETECTION: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten",
    filename: "text-detection.rten",
    size_hint: "2.5 MB",
};

const RECOGNITION: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten",
    filename: "text-recognition.rten",
    size_hint: "10 MB",
};

fn load_model(dir: &Path, spec: &ModelSpec) -> Result<rten::Model, OcrError> {
    rten::Model::load_file(dir.join(spec.filename))
        .map_err(|e| OcrError::OcrFailed(format!("Failed to load {}: {}", spec.filename, e)))
}

/// Line-oriented OCR via the ocrs crate.
pub struct OcrsBackend {
    config: OcrConfig,
}

impl OcrsBackend {
    pub fn new() -> Self {
        Self::with_config(OcrConfig::default())
    }

    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    fn model_dir(&self) -> Result<PathBuf, OcrError> {
        ensure_models_present(
            self.config.model_path.as_ref(),
            &MODELS,
            &[&DETECTION, &RECOGNITION],
        )
    }

    fn engine(&self) -> Result<&'static OcrEngine, OcrError> {
        if let Some(engine) = ENGINE.get() {
            return Ok(engine);
        }

        let dir = self.model_dir()?;
        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(load_model(&dir, &DETECTION)?),
            recognition_model: Some(load_model(&dir, &RECOGNITION)?),
            ..Default::default()
        })
        .map_err(|e| OcrError::OcrFailed(format!("Failed to create OCRS engine: {}", e)))?;
        info!("OCRS engine loaded from {}", dir.display());

        // A concurrent first call may have stored its engine already
        Ok(ENGINE.get_or_init(|| engine))
    }

    /// Recognized text lines, top to bottom.
    fn recognize_lines(&self, image_path: &Path) -> Result<Vec<String>, OcrError> {
        let engine = self.engine()?;

        let rgb = image::open(image_path)
            .map_err(|e| OcrError::ImageError(format!("Failed to load image: {}", e)))?
            .into_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|e| OcrError::ImageError(format!("Unsupported image layout: {}", e)))?;
        let input = engine
            .prepare_input(source)
            .map_err(|e| OcrError::OcrFailed(format!("Failed to prepare input: {}", e)))?;

        let words = engine
            .detect_words(&input)
            .map_err(|e| OcrError::OcrFailed(format!("Word detection failed: {}", e)))?;
        let line_rects = engine.find_text_lines(&input, &words);
        let lines = engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| OcrError::OcrFailed(format!("Line recognition failed: {}", e)))?;

        Ok(lines
            .iter()
            .flatten()
            .map(|line| line.to_string().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }
}

impl Default for OcrsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for OcrsBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Ocrs
    }

    fn is_available(&self) -> bool {
        // Missing models are fetched on first use
        true
    }

    fn availability_hint(&self) -> String {
        model_availability_hint(self.config.model_path.as_ref(), &MODELS, "OCRS", "12 MB")
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let lines = self.recognize_lines(image_path)?;
        Ok(build_ocr_result(
            join_lines(lines),
            OcrBackendType::Ocrs,
            None,
            start,
        ))
    }
}
