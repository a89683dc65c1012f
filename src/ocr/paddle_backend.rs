//! PaddleOCR engine via ONNX Runtime (feature `ocr-paddle`).
//!
//! Every detected text box becomes one output line. PP-OCRv4 models are
//! downloaded on first use from the RapidOCR mirrors.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use paddle_ocr_rs::ocr_lite::OcrLite;
use tracing::info;

use super::adapter::join_lines;
use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult};
use super::model_utils::{
    build_ocr_result, ensure_models_present, model_availability_hint, ModelDirConfig, ModelSpec,
};

/// Process-wide engine. Detection needs `&mut OcrLite`, hence the lock.
static ENGINE: OnceLock<Mutex<OcrLite>> = OnceLock::new();

const DETECTION: ModelSpec = ModelSpec {
    url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_det_infer.onnx",
    filename: "ch_PP-OCRv4_det_infer.onnx",
    size_hint: "4 MB",
};

const RECOGNITION: ModelSpec = ModelSpec {
    url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_rec_infer.onnx",
    filename: "ch_PP-OCRv4_rec_infer.onnx",
    size_hint: "10 MB",
};

const CLASSIFIER: ModelSpec = ModelSpec {
    url: "https://www.modelscope.cn/models/RapidAI/RapidOCR/resolve/v3.4.0/onnx/PP-OCRv4/cls/ch_ppocr_mobile_v2.0_cls_infer.onnx",
    filename: "ch_ppocr_mobile_v2.0_cls_infer.onnx",
    size_hint: "1 MB",
};

const MODELS: ModelDirConfig = ModelDirConfig {
    subdir: "paddle-ocr",
    required_files: &[DETECTION.filename, RECOGNITION.filename, CLASSIFIER.filename],
};

/// Line-oriented OCR via paddle-ocr-rs.
pub struct PaddleBackend {
    config: OcrConfig,
}

impl PaddleBackend {
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
            &[&DETECTION, &RECOGNITION, &CLASSIFIER],
        )
    }

    fn engine(&self) -> Result<&'static Mutex<OcrLite>, OcrError> {
        if let Some(engine) = ENGINE.get() {
            return Ok(engine);
        }

        let dir = self.model_dir()?;
        let model = |spec: &ModelSpec| dir.join(spec.filename).to_string_lossy().to_string();

        let mut ocr = OcrLite::new();
        ocr.init_models(
            &model(&DETECTION),
            &model(&CLASSIFIER),
            &model(&RECOGNITION),
            4, // inference threads
        )
        .map_err(|e| OcrError::OcrFailed(format!("Failed to init PaddleOCR: {}", e)))?;
        info!("PaddleOCR engine loaded from {}", dir.display());

        // A concurrent first call may have stored its engine already
        Ok(ENGINE.get_or_init(|| Mutex::new(ocr)))
    }

    /// Text of every detected box, in detection order.
    fn detect_lines(&self, image_path: &Path) -> Result<Vec<String>, OcrError> {
        let path = image_path
            .to_str()
            .ok_or_else(|| OcrError::ImageError("Image path is not valid UTF-8".to_string()))?;

        let mut ocr = self
            .engine()?
            .lock()
            .map_err(|_| OcrError::OcrFailed("PaddleOCR engine lock poisoned".to_string()))?;

        let result = ocr
            .detect_from_path(
                path,
                50,    // padding
                1024,  // max side length
                0.5,   // box score threshold
                0.3,   // box threshold
                1.6,   // unclip ratio
                false, // do angle
                false, // most angle
            )
            .map_err(|e| OcrError::OcrFailed(format!("PaddleOCR detection failed: {}", e)))?;

        Ok(result
            .text_blocks
            .into_iter()
            .map(|block| block.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect())
    }
}

impl Default for PaddleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for PaddleBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::PaddleOcr
    }

    fn is_available(&self) -> bool {
        // Missing models are fetched on first use
        true
    }

    fn availability_hint(&self) -> String {
        model_availability_hint(
            self.config.model_path.as_ref(),
            &MODELS,
            "PaddleOCR",
            "15 MB",
        )
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let lines = self.detect_lines(image_path)?;
        Ok(build_ocr_result(
            join_lines(lines),
            OcrBackendType::PaddleOcr,
            None,
            start,
        ))
    }
}
