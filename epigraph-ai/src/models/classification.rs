//! Classification labels
//!
//! Labels are closed enums so rule tables stay auditable; text is rendered
//! per output language only at the edges.

use crate::locale::Localized;
use epigraph_common::OutputLanguage;
use serde::Serialize;

/// Genre (inscription type) label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreLabel {
    /// Grain or silver transaction
    EconomicTransaction,
    /// Receipt or legal confirmation of a transaction
    LegalConfirmation,
    /// Royal year formula (dating idiom)
    RoyalYearFormula,
    ReligiousCultic,
    /// Default when no rule matches
    GeneralAdministrative,
}

impl GenreLabel {
    /// Localized label
    pub fn label(&self, language: OutputLanguage) -> &'static str {
        let text = match self {
            GenreLabel::EconomicTransaction => Localized::new(
                "מסמך כלכלי - עסקת שעורים",
                "Economic document - barley transaction",
            ),
            GenreLabel::LegalConfirmation => Localized::new(
                "מסמך משפטי - אישור עסקה",
                "Legal document - transaction confirmation",
            ),
            GenreLabel::RoyalYearFormula => {
                Localized::new("נוסחת תיארוך מלכותית", "Royal year formula")
            }
            GenreLabel::ReligiousCultic => {
                Localized::new("טקסט דתי או פולחני", "Religious or cultic text")
            }
            GenreLabel::GeneralAdministrative => Localized::new(
                "כתובת אדמיניסטרטיבית כללית",
                "General administrative inscription",
            ),
        };
        text.get(language)
    }
}

/// Historical period label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodLabel {
    /// Year 35 of Shulgi (named year formula)
    UrIiiShulgi35,
    /// Ur III, recognized by the gur/še measure system
    UrIii,
    OldBabylonian,
    NeoAssyrian,
    /// Sumerian marker only: Ur III or Old Babylonian
    UrIiiOrOldBabylonian,
    /// Default when no rule matches
    Unidentified,
}

impl PeriodLabel {
    /// Localized label
    pub fn label(&self, language: OutputLanguage) -> &'static str {
        let text = match self {
            PeriodLabel::UrIiiShulgi35 => Localized::new(
                "תקופת אור השלישית - שנת 35 לשולגי (כ-2059 לפנה״ס)",
                "Ur III period - year 35 of Shulgi (c. 2059 BCE)",
            ),
            PeriodLabel::UrIii => Localized::new(
                "תקופת אור השלישית (2112-2004 לפנה״ס)",
                "Ur III period (2112-2004 BCE)",
            ),
            PeriodLabel::OldBabylonian => Localized::new(
                "התקופה הבבלית העתיקה (1894-1594 לפנה״ס)",
                "Old Babylonian period (1894-1594 BCE)",
            ),
            PeriodLabel::NeoAssyrian => Localized::new(
                "התקופה האשורית החדשה (912-609 לפנה״ס)",
                "Neo-Assyrian period (912-609 BCE)",
            ),
            PeriodLabel::UrIiiOrOldBabylonian => Localized::new(
                "תקופת אור השלישית או תקופה פליאו-בבלית (2100-1600 לפנה״ס)",
                "Ur III or Old Babylonian period (2100-1600 BCE)",
            ),
            PeriodLabel::Unidentified => Localized::new(
                "תקופה לא מזוהה - דרושה בדיקה נוספת",
                "Unidentified period - needs further review",
            ),
        };
        text.get(language)
    }
}

/// Rule-based classification of one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub genre: GenreLabel,
    pub period: PeriodLabel,
    /// Name of the genre rule that fired
    pub genre_rule: &'static str,
    /// Name of the period rule that fired
    pub period_rule: &'static str,
}

impl ClassificationResult {
    /// Result when classification could not run at all
    pub fn unclassified() -> Self {
        Self {
            genre: GenreLabel::GeneralAdministrative,
            period: PeriodLabel::Unidentified,
            genre_rule: "default",
            period_rule: "default",
        }
    }
}
