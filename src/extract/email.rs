use std::sync::LazyLock;

use regex::Regex;

use super::{unique_matches, EntityExtractor, EntityKind};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("email regex should compile")
});

/// Email addresses. Case is preserved and dedup is exact.
pub struct EmailExtractor;

impl EntityExtractor for EmailExtractor {
    fn kind(&self) -> EntityKind {
        EntityKind::Email
    }

    fn extract(&self, text: &str) -> Vec<String> {
        unique_matches(EMAIL.find_iter(text).map(|m| m.as_str()))
    }
}
