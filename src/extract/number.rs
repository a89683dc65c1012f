use std::sync::LazyLock;

use regex::Regex;

use super::{unique_matches, EntityExtractor, EntityKind};

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit regex should compile"));

/// Maximal digit runs.
pub struct NumberExtractor;

impl EntityExtractor for NumberExtractor {
    fn kind(&self) -> EntityKind {
        EntityKind::Number
    }

    fn extract(&self, text: &str) -> Vec<String> {
        unique_matches(DIGITS.find_iter(text).map(|m| m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup() {
        assert_eq!(NumberExtractor.extract("order 42 qty 7 ref 42"), vec!["42", "7"]);
    }

    #[test]
    fn test_maximal_runs() {
        assert_eq!(
            NumberExtractor.extract("+880-1712-345678"),
            vec!["880", "1712", "345678"]
        );
        assert!(NumberExtractor.extract("no digits here").is_empty());
    }
}
