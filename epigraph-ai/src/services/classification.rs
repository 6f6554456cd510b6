//! Classification engine
//!
//! Two independent ordered rule tables (genre, period) evaluated against the
//! lower-cased raw text. The first matching rule wins; every table ends in a
//! mandatory fallback, so classification is total.

use crate::models::{ClassificationResult, GenreLabel, PeriodLabel};

/// Keyword matcher over lower-cased text
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// At least one keyword present
    Any(&'static [&'static str]),
    /// Every keyword present
    All(&'static [&'static str]),
    /// Both sub-matchers hold
    Both(&'static Matcher, &'static Matcher),
}

impl Matcher {
    pub fn matches(&self, lowered: &str) -> bool {
        match self {
            Matcher::Any(keywords) => keywords.iter().any(|k| lowered.contains(k)),
            Matcher::All(keywords) => keywords.iter().all(|k| lowered.contains(k)),
            Matcher::Both(left, right) => left.matches(lowered) && right.matches(lowered),
        }
    }
}

/// Named (matcher, label) pair
#[derive(Debug, Clone, Copy)]
pub struct Rule<L: 'static> {
    pub name: &'static str,
    pub matcher: Matcher,
    pub label: L,
}

/// Ordered rule table with its fallback label
#[derive(Debug, Clone, Copy)]
pub struct RuleTable<L: 'static> {
    pub rules: &'static [Rule<L>],
    pub fallback: L,
}

/// Name reported when the fallback fires
pub const FALLBACK_RULE: &str = "default";

impl<L: Copy> RuleTable<L> {
    /// First matching rule's label and name, or the fallback
    pub fn evaluate(&self, lowered: &str) -> (L, &'static str) {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(lowered))
            .map(|rule| (rule.label, rule.name))
            .unwrap_or((self.fallback, FALLBACK_RULE))
    }
}

pub const GENRE_RULES: RuleTable<GenreLabel> = RuleTable {
    rules: &[
        Rule {
            name: "economic_transaction",
            matcher: Matcher::Any(&["gur", "barley", "še", "silver", "maš", "ĝa₂-ĝa₂", "interest"]),
            label: GenreLabel::EconomicTransaction,
        },
        Rule {
            name: "legal_confirmation",
            matcher: Matcher::Any(&["ba-ti", "šu", "ib₂-ge-ne₂", "confirm"]),
            label: GenreLabel::LegalConfirmation,
        },
        Rule {
            name: "royal_year_formula",
            matcher: Matcher::Both(&Matcher::All(&["mu"]), &Matcher::Any(&["us₂-sa", "year"])),
            label: GenreLabel::RoyalYearFormula,
        },
        Rule {
            name: "religious_cultic",
            matcher: Matcher::Any(&["dingir", "god", "temple", "e₂"]),
            label: GenreLabel::ReligiousCultic,
        },
    ],
    fallback: GenreLabel::GeneralAdministrative,
};

pub const PERIOD_RULES: RuleTable<PeriodLabel> = RuleTable {
    rules: &[
        Rule {
            name: "shulgi_year_35",
            matcher: Matcher::Any(&["š 35", "anshan"]),
            label: PeriodLabel::UrIiiShulgi35,
        },
        Rule {
            name: "ur_iii_grain_measure",
            matcher: Matcher::All(&["gur", "še"]),
            label: PeriodLabel::UrIii,
        },
        Rule {
            name: "old_babylonian_ruler",
            matcher: Matcher::Any(&["sin-muballit", "hammurabi", "rim-sin"]),
            label: PeriodLabel::OldBabylonian,
        },
        Rule {
            name: "neo_assyrian_city",
            matcher: Matcher::Any(&["aššur", "ninua", "kalhu"]),
            label: PeriodLabel::NeoAssyrian,
        },
        Rule {
            name: "sumerian_era_marker",
            matcher: Matcher::Any(&["%sux"]),
            label: PeriodLabel::UrIiiOrOldBabylonian,
        },
    ],
    fallback: PeriodLabel::Unidentified,
};

/// Rule-based classifier over fixed tables
#[derive(Debug, Clone, Copy)]
pub struct ClassificationEngine {
    genre_rules: RuleTable<GenreLabel>,
    period_rules: RuleTable<PeriodLabel>,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(GENRE_RULES, PERIOD_RULES)
    }
}

impl ClassificationEngine {
    pub fn new(genre_rules: RuleTable<GenreLabel>, period_rules: RuleTable<PeriodLabel>) -> Self {
        Self {
            genre_rules,
            period_rules,
        }
    }

    /// Classify raw input text
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lowered = text.to_lowercase();
        let (genre, genre_rule) = self.genre_rules.evaluate(&lowered);
        let (period, period_rule) = self.period_rules.evaluate(&lowered);

        tracing::debug!(genre_rule, period_rule, "Rule classification");

        ClassificationResult {
            genre,
            period,
            genre_rule,
            period_rule,
        }
    }
}
