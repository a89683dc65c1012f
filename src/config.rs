//! Configuration for cardocr using the prefer crate for discovery.
//!
//! A config file (`cardocr.toml`, `cardocr.yaml`, `cardocr.json`, ...) is
//! found in the standard locations, or given explicitly with `--config`.
//! Every field has a default, so an empty or missing file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::ExtractionConfig;
use crate::ocr::OcrConfig;
use crate::text::{Charset, TextNormalizer};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Invalid character allow-list: {0}")]
    InvalidAllowList(regex::Error),

    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(regex::Error),
}

/// Named engine/charset combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Tesseract, OCRS and PaddleOCR over English text.
    English,
    /// OCRS and Tesseract over English and Bangla text.
    Bilingual,
}

fn default_engines() -> Vec<String> {
    ["ocrs", "tesseract", "paddleocr"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_image_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "bmp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_engine_timeout_secs() -> u64 {
    60
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

/// File-backed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OCR engines to run, in order.
    #[serde(default = "default_engines")]
    pub engines: Vec<String>,
    /// Tesseract language string (e.g. "eng", "eng+ben").
    #[serde(default = "default_language")]
    pub language: String,
    /// Directory holding OCR model files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default)]
    pub charset: Charset,
    /// Character-class body used when `charset` is `custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_chars: Option<String>,
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    /// Where uploads are stored while engines run. Relative paths resolve
    /// against the config file's directory.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_engine_timeout_secs")]
    pub engine_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engines: default_engines(),
            language: default_language(),
            model_path: None,
            charset: Charset::default(),
            allow_chars: None,
            image_extensions: default_image_extensions(),
            upload_dir: default_upload_dir(),
            engine_timeout_secs: default_engine_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            bind: default_bind(),
            extraction: ExtractionConfig::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer for discovery, then apply
    /// environment overrides. Defaults are used when no file is found.
    pub async fn load() -> Result<Self, ConfigError> {
        let config = match prefer::load("cardocr").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await?,
                None => Self::default(),
            },
            Err(_) => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?,
        };

        debug!("Loaded config from {}", path.display());
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply `CARDOCR_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(engines) = lookup("CARDOCR_ENGINES") {
            self.engines = engines
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }
        if let Some(language) = lookup("CARDOCR_LANGUAGE").filter(|l| !l.is_empty()) {
            self.language = language;
        }
        if let Some(dir) = lookup("CARDOCR_UPLOAD_DIR").filter(|d| !d.is_empty()) {
            self.upload_dir = dir;
        }
        self
    }

    /// Switch engines, language and charset to a preset.
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::English => {
                self.engines = default_engines();
                self.language = default_language();
                self.charset = Charset::Latin;
            }
            Preset::Bilingual => {
                self.engines = vec!["ocrs".to_string(), "tesseract".to_string()];
                self.language = "eng+ben".to_string();
                self.charset = Charset::LatinBengali;
            }
        }
    }

    /// Get the base directory for resolving relative paths.
    /// The config file's directory if known, otherwise the working directory.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a path that may be relative to the config file.
    /// Paths starting with ~ are expanded.
    pub fn resolve_path(&self, path_str: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    pub fn resolve_upload_dir(&self) -> PathBuf {
        self.resolve_path(&self.upload_dir)
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs.max(1))
    }

    /// Engine settings shared by every backend.
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            language: self.language.clone(),
            model_path: self.model_path.as_deref().map(|p| self.resolve_path(p)),
        }
    }

    pub fn normalizer(&self) -> Result<TextNormalizer, ConfigError> {
        if self.charset != Charset::Custom && self.allow_chars.is_some() {
            warn!(
                "allow_chars is only used with charset = custom (current: {})",
                self.charset.as_str()
            );
        }
        TextNormalizer::for_charset(self.charset, self.allow_chars.as_deref())
            .map_err(ConfigError::InvalidAllowList)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engines, vec!["ocrs", "tesseract", "paddleocr"]);
        assert_eq!(config.language, "eng");
        assert_eq!(config.charset, Charset::Latin);
        assert_eq!(config.image_extensions, vec!["png", "jpg", "jpeg", "bmp"]);
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.engine_timeout(), Duration::from_secs(60));
        assert_eq!(config.bind, "127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_load_toml_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardocr.toml");
        std::fs::write(
            &path,
            r#"
engines = ["tesseract"]
charset = "latin_bengali"
upload_dir = "tmp/uploads"

[extraction]
locality_tokens = ["sylhet"]
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.engines, vec!["tesseract"]);
        assert_eq!(config.charset, Charset::LatinBengali);
        assert_eq!(config.language, "eng");
        assert_eq!(config.extraction.locality_tokens, vec!["sylhet"]);
        assert_eq!(config.extraction.phone_prefixes, vec!["+880", "+88", "01"]);
        assert_eq!(config.resolve_upload_dir(), dir.path().join("tmp/uploads"));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("cardocr.yaml");
        std::fs::write(&yaml, "language: eng+ben\nengine_timeout_secs: 5\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.language, "eng+ben");
        assert_eq!(config.engine_timeout(), Duration::from_secs(5));

        let json = dir.path().join("cardocr.json");
        std::fs::write(&json, r#"{"bind": "0.0.0.0:8080"}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Config::load_from_path(&dir.path().join("nope.toml")).await;
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "engines = 3").unwrap();
        let err = Config::load_from_path(&bad).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse TOML config"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CARDOCR_ENGINES", " tesseract, ocrs ,"),
            ("CARDOCR_LANGUAGE", "ben"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.engines, vec!["tesseract", "ocrs"]);
        assert_eq!(config.language, "ben");
        assert_eq!(config.upload_dir, "uploads");
    }

    #[test]
    fn test_bilingual_preset() {
        let mut config = Config::default();
        config.apply_preset(Preset::Bilingual);
        assert_eq!(config.engines, vec!["ocrs", "tesseract"]);
        assert_eq!(config.language, "eng+ben");
        assert_eq!(config.charset, Charset::LatinBengali);

        config.apply_preset(Preset::English);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_custom_charset_needs_valid_class() {
        let config = Config {
            charset: Charset::Custom,
            allow_chars: Some("z-a".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.normalizer(),
            Err(ConfigError::InvalidAllowList(_))
        ));
    }

    #[test]
    fn test_absolute_and_tilde_paths() {
        let config = Config::default();
        assert_eq!(config.resolve_path("/var/cardocr"), PathBuf::from("/var/cardocr"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.resolve_path("~/models"), home.join("models"));
        }
    }
}
