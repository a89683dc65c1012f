//! Request orchestration: validate input, run the engines over an uploaded
//! image, merge their text with any supplied text, and extract entities.

mod error;
mod input;
mod response;

pub use error::PipelineError;
pub use input::{ImageUpload, InputBundle};
pub use response::{OcrResults, ProcessResponse};

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::extract::ExtractorSet;
use crate::ocr::EngineRegistry;
use crate::text::{aggregate, EngineResult, TextNormalizer};

const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// The processing pipeline. Built once and shared across requests.
pub struct Pipeline {
    registry: EngineRegistry,
    normalizer: TextNormalizer,
    extractors: ExtractorSet,
    image_extensions: Vec<String>,
    upload_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        registry: EngineRegistry,
        normalizer: TextNormalizer,
        extractors: ExtractorSet,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            normalizer,
            extractors,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            upload_dir: upload_dir.into(),
        }
    }

    /// Build engines, normalizer and extractors from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let normalizer = config.normalizer()?;
        let extractors =
            ExtractorSet::from_config(&config.extraction).map_err(ConfigError::InvalidPattern)?;
        let registry = EngineRegistry::from_names(
            config.engines.as_slice(),
            &config.ocr_config(),
            config.engine_timeout(),
        );
        if registry.is_empty() {
            warn!("No OCR engines configured; images will produce no text");
        }

        Ok(
            Self::new(registry, normalizer, extractors, config.resolve_upload_dir())
                .with_image_extensions(config.image_extensions.as_slice()),
        )
    }

    /// Replace the accepted image extensions (case-insensitive, no dot).
    pub fn with_image_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.image_extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Process one request.
    pub async fn process(&self, input: InputBundle) -> Result<ProcessResponse, PipelineError> {
        if input.is_empty() {
            return Err(PipelineError::NoInput);
        }

        if let Some(upload) = input.image() {
            self.check_extension(upload)?;
        }

        let engine_results = match input.image() {
            Some(upload) => self.run_engines(upload).await?,
            None => Vec::new(),
        };

        let combined = aggregate(&self.normalizer, &engine_results, input.text());
        let extracted = self.extractors.extract(&combined);

        info!(
            "Processed request: {} engine results, {} chars, {} emails, {} phones, {} addresses",
            engine_results.len(),
            combined.len(),
            extracted.emails.len(),
            extracted.phones.len(),
            extracted.addresses.len()
        );

        Ok(ProcessResponse {
            ocr_results: OcrResults(engine_results),
            combined_cleaned_text: combined,
            extracted,
        })
    }

    fn check_extension(&self, upload: &ImageUpload) -> Result<(), PipelineError> {
        match upload.extension() {
            Some(ext) if self.image_extensions.contains(&ext) => Ok(()),
            Some(ext) => Err(PipelineError::InvalidFileType(format!(".{}", ext))),
            None => Err(PipelineError::InvalidFileType(upload.file_name.clone())),
        }
    }

    /// Run every engine over the stored upload. The temporary file is
    /// removed when this returns, whatever the engines did.
    async fn run_engines(&self, upload: &ImageUpload) -> Result<Vec<EngineResult>, PipelineError> {
        let stored = self.store_upload(upload)?;

        match infer::get(&upload.bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
                debug!("Upload {} sniffed as {}", upload.file_name, kind.mime_type());
            }
            Some(kind) => warn!(
                "Upload {} looks like {}, not an image",
                upload.file_name,
                kind.mime_type()
            ),
            None => warn!("Upload {} has an unrecognized format", upload.file_name),
        }

        let mut results = Vec::with_capacity(self.registry.len());
        for adapter in self.registry.adapters() {
            let run = adapter.run(stored.path()).await;
            debug!("{} finished in {}ms", adapter.name(), run.elapsed_ms);
            results.push(EngineResult::from_raw(
                adapter.name(),
                run.raw_text(),
                &self.normalizer,
            ));
        }

        Ok(results)
    }

    fn store_upload(&self, upload: &ImageUpload) -> Result<NamedTempFile, PipelineError> {
        let storage_error = |e: std::io::Error| PipelineError::OcrFailure(e.to_string());

        std::fs::create_dir_all(&self.upload_dir).map_err(storage_error)?;

        let suffix = upload
            .extension()
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.upload_dir)
            .map_err(storage_error)?;
        file.write_all(&upload.bytes).map_err(storage_error)?;
        file.flush().map_err(storage_error)?;

        debug!(
            "Stored {} ({} bytes) at {}",
            upload.file_name,
            upload.bytes.len(),
            file.path().display()
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::ocr::{OcrBackend, OcrBackendType, OcrError, OcrResult};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    /// Returns fixed text and records every path it sees.
    struct RecordingBackend {
        engine: OcrBackendType,
        text: &'static str,
        calls: AtomicUsize,
        seen: Mutex<Vec<(PathBuf, bool)>>,
    }

    impl RecordingBackend {
        fn new(engine: OcrBackendType, text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                engine,
                text,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl OcrBackend for RecordingBackend {
        fn backend_type(&self) -> OcrBackendType {
            self.engine
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "test".to_string()
        }

        fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((image_path.to_path_buf(), image_path.exists()));
            Ok(OcrResult {
                text: self.text.to_string(),
                confidence: None,
                backend: self.engine,
                processing_time_ms: 0,
            })
        }
    }

    struct FailingBackend(OcrBackendType);

    impl OcrBackend for FailingBackend {
        fn backend_type(&self) -> OcrBackendType {
            self.0
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "test".to_string()
        }

        fn ocr_image(&self, _image_path: &Path) -> Result<OcrResult, OcrError> {
            Err(OcrError::OcrFailed("model exploded".to_string()))
        }
    }

    fn shared<B: OcrBackend + 'static>(backend: &Arc<B>) -> Arc<dyn OcrBackend> {
        backend.clone()
    }

    fn failing(engine: OcrBackendType) -> Arc<dyn OcrBackend> {
        Arc::new(FailingBackend(engine))
    }

    fn pipeline(backends: Vec<Arc<dyn OcrBackend>>, upload_dir: &Path) -> Pipeline {
        let mut registry = EngineRegistry::new(Duration::from_secs(5));
        for backend in backends {
            registry.register(backend);
        }
        Pipeline::new(
            registry,
            TextNormalizer::latin(),
            ExtractorSet::default(),
            upload_dir,
        )
    }

    fn png(name: &str) -> ImageUpload {
        ImageUpload::new(name, PNG_MAGIC.to_vec())
    }

    #[tokio::test]
    async fn test_no_input_calls_no_engine() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(OcrBackendType::Tesseract, "text");
        let pipeline = pipeline(vec![shared(&backend)], dir.path());

        let err = pipeline.process(InputBundle::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoInput));
        assert!(err.is_client_error());

        let err = pipeline
            .process(InputBundle::new(None, Some(String::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoInput));

        let err = pipeline
            .process(InputBundle::default().with_text("   \n "))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoInput));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_extension_rejected_before_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(OcrBackendType::Tesseract, "text");
        let pipeline = pipeline(vec![shared(&backend)], dir.path());

        let input = InputBundle::default()
            .with_image(ImageUpload::new("card.gif", b"GIF89a".to_vec()))
            .with_text("x@y.com");
        let err = pipeline.process(input).await.unwrap_err();

        assert!(matches!(err, PipelineError::InvalidFileType(ref ext) if ext == ".gif"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(OcrBackendType::Tesseract, "Acme");
        let pipeline = pipeline(vec![shared(&backend)], dir.path());

        let response = pipeline
            .process(InputBundle::default().with_image(png("CARD.PNG")))
            .await
            .unwrap();
        assert_eq!(response.combined_cleaned_text, "Acme");
    }

    #[tokio::test]
    async fn test_text_only() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(OcrBackendType::Tesseract, "ignored");
        let pipeline = pipeline(vec![shared(&backend)], dir.path());

        let text = "Email: x@y.com, Phone: 01712345678";
        let response = pipeline
            .process(InputBundle::default().with_text(text))
            .await
            .unwrap();

        assert!(response.ocr_results.is_empty());
        assert_eq!(
            response.combined_cleaned_text,
            TextNormalizer::latin().clean(text)
        );
        assert_eq!(response.extracted.emails, vec!["x@y.com"]);
        assert!(response
            .extracted
            .phones
            .contains(&"01712345678".to_string()));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_engine_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let good = RecordingBackend::new(OcrBackendType::Tesseract, "Road 12, Gulshan Avenue");
        let pipeline = pipeline(
            vec![failing(OcrBackendType::Ocrs), shared(&good)],
            dir.path(),
        );

        let response = pipeline
            .process(InputBundle::default().with_image(png("card.png")))
            .await
            .unwrap();

        let names: Vec<&str> = response
            .ocr_results
            .0
            .iter()
            .map(|r| r.engine_name.as_str())
            .collect();
        assert_eq!(names, vec!["ocrs", "tesseract"]);

        let failed = response.ocr_results.get("ocrs").unwrap();
        assert_eq!(failed.raw_text, "");
        assert_eq!(failed.cleaned_text, "");
        assert_eq!(good.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.combined_cleaned_text, "Road 12, Gulshan Avenue");
        assert_eq!(response.extracted.addresses, vec!["Gulshan Avenue"]);
    }

    #[tokio::test]
    async fn test_image_and_text_combined_in_engine_order() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(
            vec![
                shared(&RecordingBackend::new(OcrBackendType::Ocrs, "John Doe")),
                shared(&RecordingBackend::new(OcrBackendType::Tesseract, "CEO |")),
            ],
            dir.path(),
        );

        let response = pipeline
            .process(
                InputBundle::default()
                    .with_image(png("card.jpg"))
                    .with_text("john@doe.com"),
            )
            .await
            .unwrap();

        assert_eq!(
            response.combined_cleaned_text,
            "John Doe CEO john@doe.com"
        );
        assert_eq!(response.ocr_results.get("tesseract").unwrap().cleaned_text, "CEO");
    }

    #[tokio::test]
    async fn test_upload_removed_after_processing() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let backend = RecordingBackend::new(OcrBackendType::Tesseract, "text");
        let pipeline = pipeline(
            vec![shared(&backend), failing(OcrBackendType::Ocrs)],
            &upload_dir,
        );

        pipeline
            .process(InputBundle::default().with_image(png("card.bmp")))
            .await
            .unwrap();

        let seen = backend.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        let (path, existed) = &seen[0];
        assert!(existed);
        assert!(path.starts_with(&upload_dir));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("bmp"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(&upload_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_ocr_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let backend = RecordingBackend::new(OcrBackendType::Tesseract, "text");
        let pipeline = pipeline(vec![shared(&backend)], &blocker);

        let err = pipeline
            .process(InputBundle::default().with_image(png("card.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::OcrFailure(_)));
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("OCR failed: "));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(
            vec![shared(&RecordingBackend::new(OcrBackendType::Tesseract, "x"))],
            dir.path(),
        )
        .with_image_extensions(&[".TIFF"]);

        assert!(pipeline
            .process(InputBundle::default().with_image(png("scan.tiff")))
            .await
            .is_ok());
        assert!(matches!(
            pipeline
                .process(InputBundle::default().with_image(png("scan.png")))
                .await,
            Err(PipelineError::InvalidFileType(_))
        ));
    }
}
