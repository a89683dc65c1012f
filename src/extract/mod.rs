//! Pattern-based entity extraction over combined text.
//!
//! Each extractor is independent and stateless: it scans the same text and
//! returns unique matches in first-occurrence order. [`ExtractorSet`] runs
//! all four and assembles an [`ExtractionResult`].

mod address;
mod email;
mod number;
mod phone;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use address::AddressExtractor;
pub use email::EmailExtractor;
pub use number::NumberExtractor;
pub use phone::PhoneExtractor;

/// Kind of entity an extractor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Email,
    Phone,
    Address,
    Number,
}

/// A single entity extractor.
pub trait EntityExtractor: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Unique matches in first-occurrence order.
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Collect matches, dropping exact duplicates and keeping first-seen order.
pub(crate) fn unique_matches<'a>(matches: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for m in matches {
        if seen.insert(m) {
            unique.push(m.to_string());
        }
    }
    unique
}

/// Entities extracted from one combined text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractionResult {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub addresses: Vec<String>,
    pub numbers: Vec<String>,
}

fn default_address_keywords() -> Vec<String> {
    [
        "road", "rd", "street", "st", "avenue", "ave", "house", "floor", "level", "block",
        "sector", "city", "tower", "building",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_locality_tokens() -> Vec<String> {
    vec!["dhaka".to_string(), "bangladesh".to_string()]
}

fn default_phone_prefixes() -> Vec<String> {
    ["+880", "+88", "01"].into_iter().map(String::from).collect()
}

/// Extraction heuristics. The defaults target Bangladeshi visiting cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Substrings that mark a fragment as an address (case-insensitive).
    #[serde(default = "default_address_keywords")]
    pub address_keywords: Vec<String>,
    /// Place names that also mark a fragment as an address.
    #[serde(default = "default_locality_tokens")]
    pub locality_tokens: Vec<String>,
    /// Literal phone prefixes, tried in order before the generic
    /// `+` and 1-3 digit prefix.
    #[serde(default = "default_phone_prefixes")]
    pub phone_prefixes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            address_keywords: default_address_keywords(),
            locality_tokens: default_locality_tokens(),
            phone_prefixes: default_phone_prefixes(),
        }
    }
}

/// The full set of extractors, built once from configuration.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn EntityExtractor>>,
}

impl ExtractorSet {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, regex::Error> {
        let keywords = config
            .address_keywords
            .iter()
            .chain(config.locality_tokens.iter())
            .cloned();

        Ok(Self {
            extractors: vec![
                Box::new(EmailExtractor),
                Box::new(PhoneExtractor::new(&config.phone_prefixes)?),
                Box::new(AddressExtractor::new(keywords)),
                Box::new(NumberExtractor),
            ],
        })
    }

    /// Run every extractor over the same text.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        for extractor in &self.extractors {
            let found = extractor.extract(text);
            match extractor.kind() {
                EntityKind::Email => result.emails = found,
                EntityKind::Phone => result.phones = found,
                EntityKind::Address => result.addresses = found,
                EntityKind::Number => result.numbers = found,
            }
        }
        result
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
            .expect("default extraction patterns should compile")
    }
}
