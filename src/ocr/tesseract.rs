//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line with TSV output. Tesseract reports
//! words nested under page/block/paragraph/line; the backend flattens that
//! layout back into text, one output line per detected line.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::adapter::flatten_blocks;
use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult};
use super::model_utils::check_binary;

/// OCR engine mode: default (LSTM when available).
const OEM: &str = "3";
/// Page segmentation mode: assume a single uniform block of text.
const PSM: &str = "6";

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Run Tesseract on an image file, returning its TSV report.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .args(["--oem", OEM, "--psm", PSM])
            .arg("tsv")
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if check_binary("tesseract") {
            format!("Tesseract is available (languages: {})", self.config.language)
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let tsv = self.run_tesseract(image_path)?;
        let layout = TsvLayout::parse(&tsv);

        Ok(OcrResult {
            confidence: layout.mean_confidence(),
            text: layout.into_text(),
            backend: OcrBackendType::Tesseract,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Words from a Tesseract TSV report, grouped into blocks of lines.
#[derive(Debug, Default)]
struct TsvLayout {
    blocks: Vec<Vec<String>>,
    confidence_sum: f32,
    confidence_count: u32,
}

impl TsvLayout {
    /// TSV columns: level, page_num, block_num, par_num, line_num, word_num,
    /// left, top, width, height, conf, text. Only word rows (level 5) carry text.
    fn parse(tsv: &str) -> Self {
        let mut layout = TsvLayout::default();
        let mut current_block: Option<(u32, u32)> = None;
        let mut current_line: Option<(u32, u32)> = None;

        for row in tsv.lines() {
            let cols: Vec<&str> = row.splitn(12, '\t').collect();
            if cols.len() < 12 || cols[0] != "5" {
                continue;
            }
            let word = cols[11].trim();
            if word.is_empty() {
                continue;
            }

            let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
            let block_key = (num(1), num(2));
            let line_key = (num(3), num(4));

            if current_block != Some(block_key) {
                layout.blocks.push(Vec::new());
                current_block = Some(block_key);
                current_line = None;
            }
            let Some(lines) = layout.blocks.last_mut() else {
                continue;
            };
            if current_line != Some(line_key) {
                lines.push(String::new());
                current_line = Some(line_key);
            }
            if let Some(line) = lines.last_mut() {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }

            if let Ok(conf) = cols[10].trim().parse::<f32>() {
                if conf >= 0.0 {
                    layout.confidence_sum += conf;
                    layout.confidence_count += 1;
                }
            }
        }

        layout
    }

    fn mean_confidence(&self) -> Option<f32> {
        (self.confidence_count > 0)
            .then(|| self.confidence_sum / self.confidence_count as f32 / 100.0)
    }

    fn into_text(self) -> String {
        flatten_blocks(self.blocks)
    }
}
