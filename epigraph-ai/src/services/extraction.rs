//! Extraction engine
//!
//! Turns raw input text (plain transliteration or an XML/TEI document) into
//! a [`FeatureSet`]. Extraction never fails: malformed markup degrades to
//! "no words found".

use crate::models::{ContentType, DomainCategory, DomainHit, FeatureSet, SourceLanguage};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Language markers, first match wins; overrides word-level evidence
const LANGUAGE_MARKERS: &[(&str, SourceLanguage)] = &[
    ("%sux", SourceLanguage::Sumerian),
    ("%akk", SourceLanguage::Akkadian),
    ("neo-assyrian", SourceLanguage::Assyrian),
    ("assyrian", SourceLanguage::Assyrian),
    ("babylonian", SourceLanguage::Babylonian),
];

/// Assyrian/Akkadian sign names (case-sensitive, markup words only)
const ASSYRIAN_SIGNS: &[&str] = &["šu₂", "TUK", "KUR", "IGI", "DAM", "TUR₃", "UMUŠ"];

/// Sumerian sign names (case-sensitive, markup words only)
const SUMERIAN_SIGNS: &[&str] = &["NIG₂", "HA.LAM", "ME", "TI"];

/// Domain vocabulary, matched case-insensitively against the raw text
const DOMAIN_VOCABULARY: &[(DomainCategory, &[&str])] = &[
    (
        DomainCategory::Economic,
        &["gur", "še", "barley", "silver", "gold", "iku", "maš", "ha.lam"],
    ),
    (
        DomainCategory::Legal,
        &["ba-ti", "ib₂-ge-ne₂", "di-til-la", "witness", "contract"],
    ),
    (
        DomainCategory::Religious,
        &["dingir", "temple", "god", "offering", "e₂"],
    ),
    (
        DomainCategory::Administrative,
        &["kišib", "ugula", "seal", "ration", "official"],
    ),
];

/// Content-type families over the uppercased word list, in precedence order
const CONTENT_FAMILIES: &[(ContentType, &[&str])] = &[
    (ContentType::Legal, &["DAM", "TUK", "NU"]),
    (ContentType::Economic, &["HA.LAM", "NIG₂", "GUR"]),
    (ContentType::Religious, &["DINGIR", "AN", "EN"]),
];

/// Placeholders dropped from `<w>` content
const WORD_PLACEHOLDERS: &[&str] = &["...", "x"];

static WORD_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w(?:\s[^>]*)?>(.*?)</w>").unwrap());
static LINE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<l(?:\s[^>]*)?>(.*?)</l>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BRACKETS_AND_DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\].]+").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NUMERIC_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)*").unwrap());

/// Whether the input is an XML/TEI document
pub fn is_markup(text: &str) -> bool {
    text.trim_start().starts_with("<?xml") || text.contains("<TEI")
}

/// Extract the feature set of one input
pub fn extract(text: &str) -> FeatureSet {
    let markup = is_markup(text);
    let lowered = text.to_lowercase();

    let mut features = FeatureSet::empty(markup);

    if markup {
        features.words = extract_markup_words(text);
        features.language = language_from_words(&features.words);
    }

    if let Some(language) = language_from_markers(&lowered) {
        features.language = language;
    }

    features.domain_terms = domain_hits(&lowered);
    features.domain_categories = features
        .domain_terms
        .iter()
        .map(|hit| hit.category)
        .collect::<BTreeSet<_>>();

    features.numbers = numeric_literals(text);

    if !features.words.is_empty() {
        features.content_type = content_type_from_words(&features.words);
    }

    tracing::debug!(
        is_markup = features.is_markup,
        words = features.words.len(),
        numbers = features.numbers.len(),
        domain_terms = features.domain_terms.len(),
        language = ?features.language,
        content_type = ?features.content_type,
        "Features extracted"
    );

    features
}

/// Words from `<w>` elements, falling back to `<l>` line elements
pub fn extract_markup_words(text: &str) -> Vec<String> {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");

    let words = word_elements(&collapsed);
    if !words.is_empty() {
        return words;
    }

    line_elements(&collapsed)
}

fn word_elements(collapsed: &str) -> Vec<String> {
    WORD_ELEMENT
        .captures_iter(collapsed)
        .filter_map(|caps| caps.get(1))
        .map(|inner| clean_token(&strip_tags(inner.as_str(), "")))
        .filter(|word| {
            !word.is_empty() && !WORD_PLACEHOLDERS.contains(&word.as_str()) && !is_punctuation(word)
        })
        .collect()
}

fn line_elements(collapsed: &str) -> Vec<String> {
    LINE_ELEMENT
        .captures_iter(collapsed)
        .filter_map(|caps| caps.get(1))
        .flat_map(|inner| {
            strip_tags(inner.as_str(), " ")
                .split_whitespace()
                .map(clean_token)
                .collect::<Vec<_>>()
        })
        .filter(|word| word.chars().count() > 1 && !is_punctuation(word))
        .collect()
}

/// Break markers and query signs carry no reading
fn is_punctuation(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_punctuation() || c == '…')
}

fn strip_tags(fragment: &str, replacement: &str) -> String {
    ANY_TAG.replace_all(fragment, replacement).into_owned()
}

/// Trim and remove square brackets and dots
fn clean_token(token: &str) -> String {
    BRACKETS_AND_DOTS
        .replace_all(token.trim(), "")
        .trim()
        .to_string()
}

/// Sign-name evidence from markup words
fn language_from_words(words: &[String]) -> SourceLanguage {
    let mut language = SourceLanguage::Unknown;

    for word in words {
        if ASSYRIAN_SIGNS.iter().any(|sign| word.contains(sign)) {
            language = SourceLanguage::Assyrian;
        }
        if SUMERIAN_SIGNS.iter().any(|sign| word.contains(sign)) {
            language = match language {
                SourceLanguage::Unknown | SourceLanguage::Sumerian => SourceLanguage::Sumerian,
                _ => SourceLanguage::Mixed,
            };
        }
    }

    language
}

fn language_from_markers(lowered: &str) -> Option<SourceLanguage> {
    LANGUAGE_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, language)| *language)
}

fn domain_hits(lowered: &str) -> Vec<DomainHit> {
    DOMAIN_VOCABULARY
        .iter()
        .flat_map(|(category, terms)| {
            terms
                .iter()
                .filter(|term| lowered.contains(*term))
                .map(|term| DomainHit {
                    category: *category,
                    term,
                })
        })
        .collect()
}

/// Every maximal digit run with optional internal decimal points
pub fn numeric_literals(text: &str) -> Vec<String> {
    NUMERIC_LITERAL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Content type over the uppercased, space-joined words
pub fn content_type_from_words(words: &[String]) -> ContentType {
    let joined = words.join(" ").to_uppercase();

    CONTENT_FAMILIES
        .iter()
        .find(|(_, terms)| terms.iter().any(|term| joined.contains(term)))
        .map(|(content_type, _)| *content_type)
        .unwrap_or(ContentType::Administrative)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEI_WORDS: &str = r#"<?xml version="1.0"?>
<TEI><text><body>
  <l n="1"><w>lugal</w> <w type="logogram">é</w>
  <w>an</w></l>
</body></text></TEI>"#;

    #[test]
    fn test_markup_detection() {
        assert!(is_markup("  <?xml version=\"1.0\"?><root/>"));
        assert!(is_markup("header <TEI xmlns=\"x\">"));
        assert!(!is_markup("1(gur) še lugal"));
    }

    #[test]
    fn test_word_elements_in_document_order() {
        let features = extract(TEI_WORDS);

        assert!(features.is_markup);
        assert_eq!(features.words, vec!["lugal", "é", "an"]);
        assert_eq!(features.content_type, ContentType::Religious);
    }

    #[test]
    fn test_word_cleanup_drops_placeholders() {
        let words = extract_markup_words(
            "<TEI><w>[lu]gal</w><w>...</w><w>x</w><w>[.]</w><w><g>d</g>utu</w><w>lugal</w></TEI>",
        );
        assert_eq!(words, vec!["lugal", "dutu", "lugal"]);
    }

    #[test]
    fn test_word_cleanup_drops_pure_punctuation() {
        let words = extract_markup_words("<TEI><w>-</w><w>?</w><w>…</w><w>lugal-e</w><w>[?]</w></TEI>");
        assert_eq!(words, vec!["lugal-e"]);

        let words = extract_markup_words("<TEI><l>-- ku₃-babbar ?!</l></TEI>");
        assert_eq!(words, vec!["ku₃-babbar"]);
    }

    #[test]
    fn test_line_fallback_drops_single_characters() {
        let words = extract_markup_words(
            "<TEI><l n=\"1\">1 [ma]-na <g>x</g> ku₃-babbar</l><l>a e₂-gal</l></TEI>",
        );
        assert_eq!(words, vec!["ma-na", "ku₃-babbar", "e₂-gal"]);
    }

    #[test]
    fn test_lb_elements_are_not_lines() {
        assert!(extract_markup_words("<TEI><lb/>lugal-e</TEI>").is_empty());
    }

    #[test]
    fn test_malformed_markup_degrades_to_no_words() {
        let features = extract("<?xml version=\"1.0\"?><TEI><w>lugal</TEI");
        assert!(features.is_markup);
        assert!(features.words.is_empty());
        assert_eq!(features.content_type, ContentType::Unknown);
    }

    #[test]
    fn test_plain_text_has_no_words() {
        let features = extract("1(gur) še barley silver");
        assert!(!features.is_markup);
        assert!(features.words.is_empty());
        assert_eq!(features.content_type, ContentType::Unknown);
    }

    #[test]
    fn test_language_markers() {
        assert_eq!(extract("%sux lugal").language, SourceLanguage::Sumerian);
        assert_eq!(extract("%AKK šarru").language, SourceLanguage::Akkadian);
        assert_eq!(extract("Neo-Assyrian letter").language, SourceLanguage::Assyrian);
        assert_eq!(extract("Old Babylonian letter").language, SourceLanguage::Babylonian);
        assert_eq!(extract("lugal").language, SourceLanguage::Unknown);
        // First marker in table order wins
        assert_eq!(extract("babylonian %akk").language, SourceLanguage::Akkadian);
    }

    #[test]
    fn test_sign_evidence_from_words() {
        let assyrian = extract("<TEI><w>DAM</w><w>ša</w></TEI>");
        assert_eq!(assyrian.language, SourceLanguage::Assyrian);

        let sumerian = extract("<TEI><w>NIG₂</w><w>TI</w></TEI>");
        assert_eq!(sumerian.language, SourceLanguage::Sumerian);

        let mixed = extract("<TEI><w>KUR</w><w>ME</w></TEI>");
        assert_eq!(mixed.language, SourceLanguage::Mixed);
    }

    #[test]
    fn test_markers_override_word_evidence() {
        let features = extract("<TEI>%akk <w>NIG₂</w></TEI>");
        assert_eq!(features.language, SourceLanguage::Akkadian);
    }

    #[test]
    fn test_domain_terms_record_every_hit() {
        let features = extract("5 GUR še barley, silver for the temple");

        let economic: Vec<_> = features.terms_in(DomainCategory::Economic).collect();
        assert_eq!(economic, vec!["gur", "še", "barley", "silver"]);
        assert!(features.domain_categories.contains(&DomainCategory::Religious));
        assert!(!features.domain_categories.contains(&DomainCategory::Legal));
    }

    #[test]
    fn test_numeric_literals_verbatim() {
        assert_eq!(
            numeric_literals("1(gur) 2.1.3 še, 10 sila3; iti 12."),
            vec!["1", "2.1.3", "10", "3", "12"]
        );
        assert!(numeric_literals("lugal").is_empty());
    }

    #[test]
    fn test_content_type_precedence() {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect::<Vec<_>>();

        assert_eq!(content_type_from_words(&words(&["dam", "gur"])), ContentType::Legal);
        assert_eq!(content_type_from_words(&words(&["gur", "dingir"])), ContentType::Economic);
        assert_eq!(content_type_from_words(&words(&["dingir"])), ContentType::Religious);
        assert_eq!(content_type_from_words(&words(&["lugal"])), ContentType::Administrative);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        assert_eq!(extract(TEI_WORDS), extract(TEI_WORDS));
    }
}
