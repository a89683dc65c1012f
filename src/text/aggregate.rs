//! Fusion of per-engine OCR output and supplied text into one combined text.

use super::normalize::TextNormalizer;

/// Raw and cleaned output of one engine for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResult {
    pub engine_name: String,
    /// Empty when the engine failed or detected nothing.
    pub raw_text: String,
    pub cleaned_text: String,
}

impl EngineResult {
    pub fn from_raw(
        engine_name: impl Into<String>,
        raw_text: impl Into<String>,
        normalizer: &TextNormalizer,
    ) -> Self {
        let raw_text = raw_text.into();
        let cleaned_text = normalizer.clean(&raw_text);
        Self {
            engine_name: engine_name.into(),
            raw_text,
            cleaned_text,
        }
    }
}

/// Join cleaned engine texts (in the given order) and the cleaned supplied
/// text with single spaces, then clean the whole again.
pub fn aggregate(
    normalizer: &TextNormalizer,
    results: &[EngineResult],
    supplied_text: Option<&str>,
) -> String {
    let supplied = normalizer.clean_opt(supplied_text);

    let joined = results
        .iter()
        .map(|r| r.cleaned_text.as_str())
        .chain((!supplied.is_empty()).then_some(supplied.as_str()))
        .collect::<Vec<_>>()
        .join(" ");

    normalizer.clean(&joined)
}
