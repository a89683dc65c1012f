//! Helpers shared by the OCR backends: binary lookup, model discovery and
//! first-use model downloads.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{info, warn};

use super::backend::{OcrBackendType, OcrError, OcrResult};

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// A downloadable model file.
#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
pub struct ModelSpec {
    pub url: &'static str,
    pub filename: &'static str,
    /// Approximate size, for log messages.
    pub size_hint: &'static str,
}

/// Where one engine keeps its models.
#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
pub struct ModelDirConfig {
    /// Per-engine directory name (e.g. "ocrs", "paddle-ocr").
    pub subdir: &'static str,
    pub required_files: &'static [&'static str],
}

#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
impl ModelDirConfig {
    /// Download target: `<data dir>/cardocr/models/<subdir>`.
    pub fn default_dir(&self) -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cardocr")
            .join("models")
            .join(self.subdir)
    }

    /// Directories searched for already-present models, in order. A
    /// configured model path is tried as-is and with the engine subdirectory.
    pub fn candidate_dirs(&self, configured: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(path) = configured {
            dirs.push(path.clone());
            dirs.push(path.join(self.subdir));
        }
        dirs.push(self.default_dir());
        dirs.push(PathBuf::from("models").join(self.subdir));
        dirs.push(PathBuf::from("/usr/share/cardocr/models").join(self.subdir));
        dirs
    }

    pub fn has_required_files(&self, dir: &Path) -> bool {
        self.required_files
            .iter()
            .all(|file| dir.join(file).is_file())
    }

    /// First candidate directory holding every required file.
    pub fn find(&self, configured: Option<&PathBuf>) -> Option<PathBuf> {
        self.candidate_dirs(configured)
            .into_iter()
            .find(|dir| self.has_required_files(dir))
    }
}

/// Download `url` to `dest`, trying curl then wget. The file is written
/// under a `.part` name and renamed once complete.
#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
pub fn download_file(url: &str, dest: &Path) -> Result<(), OcrError> {
    let partial = dest.with_extension("part");
    let downloaders: [(&str, [&str; 2]); 2] = [("curl", ["-fsSL", "-o"]), ("wget", ["-q", "-O"])];

    for (tool, args) in downloaders {
        if !check_binary(tool) {
            continue;
        }
        let status = Command::new(tool)
            .args(args)
            .arg(&partial)
            .arg(url)
            .status()?;
        if status.success() {
            std::fs::rename(&partial, dest)?;
            return Ok(());
        }
        let _ = std::fs::remove_file(&partial);
        warn!("{} failed to download {}", tool, url);
    }

    Err(OcrError::ModelNotFound(format!(
        "Could not download {} (needs curl or wget and network access)",
        url
    )))
}

/// Make sure every model file exists in `config`'s directory, downloading
/// missing ones into the default directory.
#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
pub fn ensure_models_present(
    configured: Option<&PathBuf>,
    config: &ModelDirConfig,
    specs: &[&ModelSpec],
) -> Result<PathBuf, OcrError> {
    if let Some(dir) = config.find(configured) {
        return Ok(dir);
    }

    let dir = config.default_dir();
    std::fs::create_dir_all(&dir)?;

    for spec in specs {
        let dest = dir.join(spec.filename);
        if dest.is_file() {
            continue;
        }
        info!("Downloading {} (~{})", spec.filename, spec.size_hint);
        download_file(spec.url, &dest)?;
    }

    Ok(dir)
}

/// Build an [`OcrResult`] timed from `start`.
#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
pub fn build_ocr_result(
    text: String,
    backend: OcrBackendType,
    confidence: Option<f32>,
    start: Instant,
) -> OcrResult {
    OcrResult {
        text,
        confidence,
        backend,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}

/// Availability hint for a model-based engine.
#[cfg_attr(not(any(feature = "ocr-ocrs", feature = "ocr-paddle")), allow(dead_code))]
pub fn model_availability_hint(
    configured: Option<&PathBuf>,
    config: &ModelDirConfig,
    engine: &str,
    total_size: &str,
) -> String {
    match config.find(configured) {
        Some(dir) => format!("{} models found at {}", engine, dir.display()),
        None => format!(
            "{} models (~{}) will be downloaded on first use to {}",
            engine,
            total_size,
            config.default_dir().display()
        ),
    }
}
