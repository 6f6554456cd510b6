//! Feature Set: normalized facts extracted from one input text

use crate::locale::Localized;
use epigraph_common::OutputLanguage;
use serde::Serialize;
use std::collections::BTreeSet;

/// Detected source language of the inscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLanguage {
    /// No marker or sign evidence found
    #[default]
    Unknown,
    Sumerian,
    Akkadian,
    /// Assyrian (also set by Assyrian/Akkadian sign names in markup)
    Assyrian,
    Babylonian,
    /// Sumerian signs mixed with another detected language
    Mixed,
}

impl SourceLanguage {
    /// Localized label
    pub fn label(&self, language: OutputLanguage) -> &'static str {
        let text = match self {
            SourceLanguage::Unknown => Localized::new("לא ידועה", "Unknown"),
            SourceLanguage::Sumerian => Localized::new("שומרית", "Sumerian"),
            SourceLanguage::Akkadian => Localized::new("אכדית", "Akkadian"),
            SourceLanguage::Assyrian => Localized::new("אשורית/אכדית", "Assyrian/Akkadian"),
            SourceLanguage::Babylonian => Localized::new("בבלית", "Babylonian"),
            SourceLanguage::Mixed => {
                Localized::new("אשורית-שומרית מעורבת", "Mixed Assyrian-Sumerian")
            }
        };
        text.get(language)
    }
}

/// Domain vocabulary families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainCategory {
    Economic,
    Legal,
    Religious,
    Administrative,
}

impl DomainCategory {
    /// Localized label
    pub fn label(&self, language: OutputLanguage) -> &'static str {
        let text = match self {
            DomainCategory::Economic => Localized::new("כלכלי", "economic"),
            DomainCategory::Legal => Localized::new("משפטי", "legal"),
            DomainCategory::Religious => Localized::new("דתי", "religious"),
            DomainCategory::Administrative => Localized::new("אדמיניסטרטיבי", "administrative"),
        };
        text.get(language)
    }
}

/// One domain-vocabulary match in the raw text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainHit {
    pub category: DomainCategory,
    pub term: &'static str,
}

/// Content type inferred from extracted markup words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// No structured words were extracted
    #[default]
    Unknown,
    /// Legal or family matters
    Legal,
    Economic,
    Religious,
    /// Default when words exist but no family matches
    Administrative,
}

impl ContentType {
    /// Localized label
    pub fn label(&self, language: OutputLanguage) -> &'static str {
        let text = match self {
            ContentType::Unknown => Localized::new("לא ידוע", "Unknown"),
            ContentType::Legal => Localized::new("משפטי/משפחתי", "Legal/family"),
            ContentType::Economic => Localized::new("כלכלי", "Economic"),
            ContentType::Religious => Localized::new("דתי", "Religious"),
            ContentType::Administrative => Localized::new("אדמיניסטרטיבי", "Administrative"),
        };
        text.get(language)
    }
}

/// Structured facts extracted from one input
///
/// Immutable once produced. `words` keeps document order and duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FeatureSet {
    /// Detected source language
    pub language: SourceLanguage,
    /// Input recognized as XML/TEI markup
    pub is_markup: bool,
    /// Words extracted from markup, in document order
    pub words: Vec<String>,
    /// Numeric literals, verbatim, in document order
    pub numbers: Vec<String>,
    /// Every domain-vocabulary match, in vocabulary order
    pub domain_terms: Vec<DomainHit>,
    /// Categories with at least one match
    pub domain_categories: BTreeSet<DomainCategory>,
    /// Content type inferred from `words`
    pub content_type: ContentType,
}

impl FeatureSet {
    /// Feature set with nothing detected
    pub fn empty(is_markup: bool) -> Self {
        Self {
            is_markup,
            ..Self::default()
        }
    }

    /// Matched terms of one category
    pub fn terms_in(&self, category: DomainCategory) -> impl Iterator<Item = &'static str> + '_ {
        self.domain_terms
            .iter()
            .filter(move |hit| hit.category == category)
            .map(|hit| hit.term)
    }
}
