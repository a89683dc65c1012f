use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::extract::ExtractionResult;
use crate::text::EngineResult;

/// Per-engine results, serialized as a JSON object keyed by engine name in
/// engine order: `{"tesseract": {"raw": "...", "cleaned": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrResults(pub Vec<EngineResult>);

impl OcrResults {
    pub fn get(&self, engine_name: &str) -> Option<&EngineResult> {
        self.0.iter().find(|r| r.engine_name == engine_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct RawAndCleaned<'a>(&'a EngineResult);

impl Serialize for RawAndCleaned<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EngineResult", 2)?;
        state.serialize_field("raw", &self.0.raw_text)?;
        state.serialize_field("cleaned", &self.0.cleaned_text)?;
        state.end()
    }
}

impl Serialize for OcrResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in &self.0 {
            map.serialize_entry(&result.engine_name, &RawAndCleaned(result))?;
        }
        map.end()
    }
}

/// Result of processing one request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// Raw and cleaned text per engine; empty when no image was sent.
    #[schema(value_type = Object)]
    pub ocr_results: OcrResults,
    pub combined_cleaned_text: String,
    pub extracted: ExtractionResult,
}
