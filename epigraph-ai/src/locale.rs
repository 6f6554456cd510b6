//! Localized user-facing text
//!
//! Every string a caller can see exists in both supported output languages.

use epigraph_common::OutputLanguage;

/// A string in every supported output language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localized {
    pub he: &'static str,
    pub en: &'static str,
}

impl Localized {
    pub const fn new(he: &'static str, en: &'static str) -> Self {
        Self { he, en }
    }

    /// Text in the requested language
    pub fn get(&self, language: OutputLanguage) -> &'static str {
        match language {
            OutputLanguage::Hebrew => self.he,
            OutputLanguage::English => self.en,
        }
    }
}

// Validation

pub const NO_TEXT: Localized = Localized::new("אין טקסט להעביר", "No text provided");

pub const INVALID_JSON: Localized =
    Localized::new("בקשה לא תקינה או חסרה", "Invalid or missing JSON");

pub const REQUEST_ID_IN_USE: Localized = Localized::new(
    "מזהה הבקשה כבר בשימוש",
    "Request id is already in use",
);

/// Empty or unreadable `file`/`camera` payload
pub fn file_empty(language: OutputLanguage, file_name: &str) -> String {
    match language {
        OutputLanguage::Hebrew => format!("הקובץ '{}' ריק או לא ניתן לקריאה", file_name),
        OutputLanguage::English => format!("File '{}' is empty or unreadable", file_name),
    }
}

/// Unknown input discriminator
pub fn unknown_input_type(language: OutputLanguage, kind: &str) -> String {
    match language {
        OutputLanguage::Hebrew => format!("סוג קלט לא ידוע: {}", kind),
        OutputLanguage::English => format!("Unknown input type: {}", kind),
    }
}

// Terminal outcomes

pub const REQUEST_CANCELLED: Localized = Localized::new("הבקשה בוטלה", "Request cancelled");

pub const UNEXPECTED_ERROR: Localized = Localized::new(
    "שגיאה לא צפויה בהכנת התוצאות",
    "Unexpected error while preparing the results",
);

// Stage fallbacks

pub const QUICK_PREVIEW_FALLBACK: Localized = Localized::new(
    "מתחיל עיבוד מפורט של הכתובת...",
    "Starting detailed processing of the inscription...",
);

pub const SUMMARY_FALLBACK: Localized =
    Localized::new("הסיכום אינו זמין כרגע", "Summary is not available at the moment");

pub const DETAILED_FALLBACK: Localized = Localized::new(
    "הניתוח המפורט אינו זמין כרגע",
    "Detailed analysis is not available at the moment",
);

// Result tabs

pub const TAB_GENRE: Localized = Localized::new("נושא", "Subject");
pub const TAB_PERIOD: Localized = Localized::new("תקופה", "Period");
pub const TAB_CONTENT: Localized = Localized::new("תוכן", "Content");

// Structured summary

pub const SUMMARY_HEADER: Localized =
    Localized::new("כתובת יתדות לניתוח:", "Cuneiform inscription for analysis:");
pub const SUMMARY_WORDS: Localized =
    Localized::new("מילים בכתב יתדות שזוהו:", "Identified cuneiform words:");
pub const SUMMARY_FACTS: Localized = Localized::new("מידע מובנה:", "Structured information:");
pub const SUMMARY_LANGUAGE: Localized = Localized::new("שפת הכתובת", "Inscription language");
pub const SUMMARY_WORD_SAMPLE: Localized = Localized::new("מילים שזוהו", "Identified words");
pub const SUMMARY_WORD_TOTAL: Localized = Localized::new("סה\"כ מילים", "Total words");
pub const SUMMARY_DOMAIN_TERMS: Localized = Localized::new("מונחים מקצועיים", "Domain terms");
pub const SUMMARY_CONTENT_TYPE: Localized = Localized::new("סוג התוכן", "Content type");
pub const SUMMARY_NUMBERS: Localized = Localized::new("מספרים", "Numbers");
pub const SUMMARY_TRANSLITERATION: Localized = Localized::new("תעתיק:", "Transliteration:");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_selects_language() {
        assert_eq!(TAB_GENRE.get(OutputLanguage::English), "Subject");
        assert_eq!(TAB_GENRE.get(OutputLanguage::Hebrew), "נושא");
    }

    #[test]
    fn test_formatted_messages_include_argument() {
        assert_eq!(
            unknown_input_type(OutputLanguage::English, "video"),
            "Unknown input type: video"
        );
        assert!(file_empty(OutputLanguage::Hebrew, "tablet.xml").contains("tablet.xml"));
    }
}
