use super::{unique_matches, EntityExtractor, EntityKind};

/// Fragments longer than this (in characters, before trimming) qualify.
const MIN_FRAGMENT_CHARS: usize = 10;

/// Address-like fragments between commas and periods.
pub struct AddressExtractor {
    keywords: Vec<String>,
}

impl AddressExtractor {
    /// Keywords match as case-insensitive substrings.
    pub fn new(keywords: impl IntoIterator<Item = String>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn qualifies(&self, fragment: &str) -> bool {
        if fragment.chars().count() <= MIN_FRAGMENT_CHARS {
            return false;
        }
        let lower = fragment.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

impl EntityExtractor for AddressExtractor {
    fn kind(&self) -> EntityKind {
        EntityKind::Address
    }

    fn extract(&self, text: &str) -> Vec<String> {
        unique_matches(
            text.split([',', '.'])
                .filter(|fragment| self.qualifies(fragment))
                .map(str::trim),
        )
    }
}
