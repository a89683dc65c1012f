//! Canonical cleaning of OCR and user-supplied text.
//!
//! Characters outside an allow-list become spaces, whitespace runs collapse
//! to one ASCII space, and the result is trimmed. Cleaning is idempotent.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Latin letters, digits, whitespace and the punctuation found on cards.
const LATIN_CLASS: &str = r"A-Za-z0-9\s.,\-()/@:+";

/// Bengali block plus angle brackets, on top of [`LATIN_CLASS`].
const BENGALI_CLASS: &str = r"\x{0980}-\x{09FF}<>";

/// Which characters survive cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    #[default]
    Latin,
    LatinBengali,
    /// Character-class body supplied by configuration.
    Custom,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Latin => "latin",
            Charset::LatinBengali => "latin_bengali",
            Charset::Custom => "custom",
        }
    }
}

/// Text normalizer built from an allow-list.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    disallowed: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    /// Build a normalizer from a regex character-class body (the part that
    /// goes between `[` and `]`). Whitespace is always allowed.
    pub fn from_class(class_body: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            disallowed: Regex::new(&format!(r"[^{}\s]", class_body))?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Build the normalizer for a charset. `custom` is required for
    /// [`Charset::Custom`] and ignored otherwise.
    pub fn for_charset(charset: Charset, custom: Option<&str>) -> Result<Self, regex::Error> {
        match charset {
            Charset::Latin => Self::from_class(LATIN_CLASS),
            Charset::LatinBengali => Self::from_class(&format!("{LATIN_CLASS}{BENGALI_CLASS}")),
            Charset::Custom => match custom {
                Some(body) if !body.is_empty() => Self::from_class(body),
                _ => Err(regex::Error::Syntax(
                    "custom charset requires a non-empty allow_chars class".to_string(),
                )),
            },
        }
    }

    pub fn latin() -> Self {
        Self::from_class(LATIN_CLASS).expect("latin class should compile")
    }

    pub fn latin_bengali() -> Self {
        Self::for_charset(Charset::LatinBengali, None).expect("bengali class should compile")
    }

    /// Clean text. Empty input yields an empty string.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let filtered = self.disallowed.replace_all(text, " ");
        let collapsed = self.whitespace.replace_all(&filtered, " ");
        collapsed.trim().to_string()
    }

    /// Clean optional text; `None` yields an empty string.
    pub fn clean_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.clean(t)).unwrap_or_default()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::latin()
    }
}
