use regex::Regex;

use super::{unique_matches, EntityExtractor, EntityKind};

/// Digits that may open any number: an optional `+` and 1-3 digits.
const GENERIC_PREFIX: &str = r"\+?\d{1,3}";

/// Phone numbers: a prefix, an optional space or hyphen, then 8-11 digits.
///
/// Known prefixes are tried in configured order before the generic one, and
/// the first alternative that matches wins at each match start. The pattern
/// is loose on purpose and accepts many non-phone digit runs.
pub struct PhoneExtractor {
    pattern: Regex,
}

impl PhoneExtractor {
    /// Build from literal prefixes such as `+880` or `01`.
    pub fn new<S: AsRef<str>>(prefixes: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = prefixes
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .chain(std::iter::once(GENERIC_PREFIX.to_string()))
            .collect();

        let pattern = format!(r"(?:{})[\s\-]?\d{{8,11}}", alternatives.join("|"));

        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl EntityExtractor for PhoneExtractor {
    fn kind(&self) -> EntityKind {
        EntityKind::Phone
    }

    fn extract(&self, text: &str) -> Vec<String> {
        unique_matches(self.pattern.find_iter(text).map(|m| m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bd() -> PhoneExtractor {
        PhoneExtractor::new(&["+880", "+88", "01"]).unwrap()
    }

    #[test]
    fn test_default_pattern() {
        assert_eq!(
            bd().as_str(),
            r"(?:\+880|\+88|01|\+?\d{1,3})[\s\-]?\d{8,11}"
        );
    }

    #[test]
    fn test_prefix_order_and_long_runs() {
        let cases: &[(&str, &[&str])] = &[
            (
                "0212345678901 and 0171234567890",
                &["0212345678901", "0171234567890"],
            ),
            (
                "+8801712345678 and 01812345678",
                &["+8801712345678", "01812345678"],
            ),
            ("01812345678 / 01812345678", &["01812345678"]),
            (
                "Tel: +880 1712345678, 0-1712345678",
                &["+880 1712345678", "0-1712345678"],
            ),
            ("+88 01712345678", &["+88 01712345678"]),
            ("+88-01712345678", &["+88-01712345678"]),
            (
                "02-9876543210 or 0 1712345678",
                &["02-9876543210", "0 1712345678"],
            ),
            ("8801712345678", &["8801712345678"]),
            ("01712345678901234", &["0171234567890"]),
            ("call +44 2071234567", &["+44 2071234567"]),
            ("ext 1234, room 56", &[]),
        ];

        let extractor = bd();
        for (text, expected) in cases {
            assert_eq!(extractor.extract(text), *expected, "text: {:?}", text);
        }
    }

    #[test]
    fn test_no_prefixes_uses_generic_only() {
        let extractor = PhoneExtractor::new::<&str>(&[]).unwrap();
        assert_eq!(extractor.as_str(), r"(?:\+?\d{1,3})[\s\-]?\d{8,11}");
        assert_eq!(extractor.extract("+44 2071234567"), vec!["+44 2071234567"]);
    }

    #[test]
    fn test_prefix_is_escaped() {
        let extractor = PhoneExtractor::new(&["1.2", ""]).unwrap();
        assert!(extractor.as_str().starts_with(r"(?:1\.2|\+?"));
    }
}
