//! Output language selection
//!
//! Every caller-visible string (previews, fallbacks, tab names, errors) is
//! rendered in the language the caller selected. Unrecognized codes fall
//! back to the default locale instead of failing the request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language used for user-facing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputLanguage {
    /// Hebrew (`he`), the default locale
    #[default]
    Hebrew,
    /// English (`en`)
    English,
}

impl OutputLanguage {
    /// Resolve a language code, falling back to the default locale
    ///
    /// Accepts bare codes and region-qualified tags (`en-US`, `he_IL`).
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => OutputLanguage::English,
            "he" | "iw" => OutputLanguage::Hebrew,
            _ => OutputLanguage::default(),
        }
    }

    /// Two-letter language code
    pub fn code(&self) -> &'static str {
        match self {
            OutputLanguage::Hebrew => "he",
            OutputLanguage::English => "en",
        }
    }
}

impl From<String> for OutputLanguage {
    fn from(code: String) -> Self {
        OutputLanguage::from_code(&code)
    }
}

impl From<OutputLanguage> for String {
    fn from(language: OutputLanguage) -> Self {
        language.code().to_string()
    }
}

impl fmt::Display for OutputLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
