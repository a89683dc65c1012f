//! End-to-end tests against the public library API.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cardocr::ocr::{EngineRegistry, OcrBackend, OcrBackendType, OcrError, OcrResult};
use cardocr::{
    Charset, Config, ExtractorSet, ImageUpload, InputBundle, Pipeline, PipelineError,
    TextNormalizer,
};

struct CardBackend {
    engine: OcrBackendType,
    text: &'static str,
    calls: AtomicUsize,
}

impl OcrBackend for CardBackend {
    fn backend_type(&self) -> OcrBackendType {
        self.engine
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "always".to_string()
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !image_path.exists() {
            return Err(OcrError::ImageError("missing upload".to_string()));
        }
        Ok(OcrResult {
            text: self.text.to_string(),
            confidence: None,
            backend: self.engine,
            processing_time_ms: 0,
        })
    }
}

struct SlowBackend;

impl OcrBackend for SlowBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::PaddleOcr
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "slow".to_string()
    }

    fn ocr_image(&self, _image_path: &Path) -> Result<OcrResult, OcrError> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(OcrResult {
            text: "too late".to_string(),
            confidence: None,
            backend: OcrBackendType::PaddleOcr,
            processing_time_ms: 500,
        })
    }
}

fn card_pipeline(upload_dir: &Path, timeout: Duration) -> (Pipeline, Arc<CardBackend>) {
    let ocrs = Arc::new(CardBackend {
        engine: OcrBackendType::Ocrs,
        text: "Rahim Uddin\nSenior Engineer\nHouse 7, Road 11, Banani, Dhaka",
        calls: AtomicUsize::new(0),
    });
    let tesseract = Arc::new(CardBackend {
        engine: OcrBackendType::Tesseract,
        text: "rahim@example.com.bd | +880 1711 000000",
        calls: AtomicUsize::new(0),
    });

    let mut registry = EngineRegistry::new(timeout);
    registry.register(ocrs.clone());
    registry.register(tesseract);
    registry.register(Arc::new(SlowBackend));

    let pipeline = Pipeline::new(
        registry,
        TextNormalizer::latin(),
        ExtractorSet::default(),
        upload_dir,
    );
    (pipeline, ocrs)
}

fn jpeg(name: &str) -> ImageUpload {
    ImageUpload::new(name, vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'])
}

#[tokio::test]
async fn image_and_text_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (pipeline, ocrs) = card_pipeline(dir.path(), Duration::from_millis(100));

    let response = pipeline
        .process(
            InputBundle::default()
                .with_image(jpeg("scan.JPEG"))
                .with_text("Office: Level 5, Gulshan Tower, Dhaka 1212"),
        )
        .await
        .unwrap();

    assert_eq!(ocrs.calls.load(Ordering::SeqCst), 1);

    let engines: Vec<&str> = response
        .ocr_results
        .0
        .iter()
        .map(|r| r.engine_name.as_str())
        .collect();
    assert_eq!(engines, vec!["ocrs", "tesseract", "paddleocr"]);

    // The slow engine timed out and contributes nothing
    let slow = response.ocr_results.get("paddleocr").unwrap();
    assert_eq!(slow.raw_text, "");

    assert_eq!(
        response.combined_cleaned_text,
        "Rahim Uddin Senior Engineer House 7, Road 11, Banani, Dhaka \
         rahim@example.com.bd +880 1711 000000 Office: Level 5, Gulshan Tower, Dhaka 1212"
    );
    assert_eq!(response.extracted.emails, vec!["rahim@example.com.bd"]);
    // Fragments are split on commas and periods only, so neighbouring
    // lines run together
    assert_eq!(
        response.extracted.addresses,
        vec![
            "Rahim Uddin Senior Engineer House 7",
            "Dhaka rahim@example",
            "bd +880 1711 000000 Office: Level 5",
            "Gulshan Tower",
            "Dhaka 1212",
        ]
    );
    assert_eq!(
        response.extracted.numbers,
        vec!["7", "11", "880", "1711", "000000", "5", "1212"]
    );

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn no_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (pipeline, ocrs) = card_pipeline(dir.path(), Duration::from_secs(1));

    let err = pipeline
        .process(InputBundle::new(
            Some(ImageUpload::new("empty.png", Vec::new())),
            None,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoInput));
    assert_eq!(ocrs.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pipeline_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("cardocr.yaml");
    std::fs::write(
        &config_path,
        "engines: []\ncharset: latin_bengali\nupload_dir: spool\nextraction:\n  locality_tokens: [chattogram]\n",
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).await.unwrap();
    assert_eq!(config.charset, Charset::LatinBengali);

    let pipeline = Pipeline::from_config(&config).unwrap();
    assert!(pipeline.registry().is_empty());
    assert_eq!(pipeline.upload_dir(), dir.path().join("spool"));

    let response = pipeline
        .process(InputBundle::default().with_text("ঠিকানা: Agrabad, Chattogram, 4100"))
        .await
        .unwrap();

    assert!(response.ocr_results.is_empty());
    assert_eq!(
        response.combined_cleaned_text,
        "ঠিকানা: Agrabad, Chattogram, 4100"
    );
    assert_eq!(response.extracted.addresses, vec!["Chattogram"]);
    assert_eq!(response.extracted.numbers, vec!["4100"]);
}
