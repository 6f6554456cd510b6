//! Prompt composer
//!
//! Builds model instructions from a fixed template table keyed by
//! (output language, stage), and renders the localized structured summary
//! of a feature set. Stateless apart from the configured budgets.

use crate::config::PipelineSettings;
use crate::locale;
use crate::models::{ContentType, FeatureSet, SourceLanguage};
use epigraph_common::OutputLanguage;

/// Placeholder replaced by the (truncated) content
const CONTENT_PLACEHOLDER: &str = "{content}";

/// Words listed in the fact line of the structured summary
const WORD_SAMPLE_SIZE: usize = 10;

/// Prompted pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptStage {
    QuickFilePreview,
    QuickTextPreview,
    ShortSummary,
    DetailedAnalysis,
    GenreClassification,
    PeriodClassification,
}

/// Character budgets of the bounded stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudgets {
    pub quick_file: usize,
    pub quick_text: usize,
    pub classification: usize,
}

impl Default for StageBudgets {
    fn default() -> Self {
        Self {
            quick_file: 800,
            quick_text: 400,
            classification: 1000,
        }
    }
}

impl StageBudgets {
    pub fn for_stage(&self, stage: PromptStage) -> Option<usize> {
        match stage {
            PromptStage::QuickFilePreview => Some(self.quick_file),
            PromptStage::QuickTextPreview => Some(self.quick_text),
            PromptStage::GenreClassification | PromptStage::PeriodClassification => {
                Some(self.classification)
            }
            PromptStage::ShortSummary | PromptStage::DetailedAnalysis => None,
        }
    }
}

/// Prefix of at most `limit` characters
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Instruction for one stage
///
/// Pure function of its arguments; content is truncated by characters.
pub fn compose(
    stage: PromptStage,
    language: OutputLanguage,
    content: &str,
    limit: Option<usize>,
) -> String {
    let content = match limit {
        Some(limit) => truncate_chars(content, limit),
        None => content,
    };
    template(stage, language).replace(CONTENT_PLACEHOLDER, content)
}

/// Prompt composer with configured budgets
#[derive(Debug, Clone, Copy)]
pub struct PromptComposer {
    budgets: StageBudgets,
    transliteration_budget: usize,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            budgets: StageBudgets::default(),
            transliteration_budget: 4000,
        }
    }
}

impl PromptComposer {
    pub fn new(budgets: StageBudgets, transliteration_budget: usize) -> Self {
        Self {
            budgets,
            transliteration_budget,
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(
            StageBudgets {
                quick_file: settings.quick_file_budget,
                quick_text: settings.quick_text_budget,
                classification: settings.classification_budget,
            },
            settings.transliteration_budget,
        )
    }

    /// Instruction for one stage within its configured budget
    pub fn prompt(&self, stage: PromptStage, language: OutputLanguage, content: &str) -> String {
        compose(stage, language, content, self.budgets.for_stage(stage))
    }

    /// Localized structured summary of a feature set
    ///
    /// Lists extracted words, then the structured facts, then the raw
    /// transliteration clipped to the configured budget.
    pub fn structured_summary(
        &self,
        features: &FeatureSet,
        raw_text: &str,
        language: OutputLanguage,
    ) -> String {
        let mut out = String::new();
        out.push_str(locale::SUMMARY_HEADER.get(language));
        out.push_str("\n\n");

        if !features.words.is_empty() {
            out.push_str(locale::SUMMARY_WORDS.get(language));
            out.push('\n');
            for word in &features.words {
                out.push_str("• ");
                out.push_str(word);
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(locale::SUMMARY_FACTS.get(language));
        out.push('\n');
        for fact in summary_facts(features, language) {
            out.push_str("• ");
            out.push_str(&fact);
            out.push('\n');
        }

        let transliteration = truncate_chars(raw_text.trim(), self.transliteration_budget);
        if !transliteration.is_empty() {
            out.push('\n');
            out.push_str(locale::SUMMARY_TRANSLITERATION.get(language));
            out.push('\n');
            out.push_str(transliteration);
            out.push('\n');
        }

        out
    }
}

fn summary_facts(features: &FeatureSet, language: OutputLanguage) -> Vec<String> {
    let mut facts = Vec::new();

    if features.language != SourceLanguage::Unknown {
        facts.push(format!(
            "{}: {}",
            locale::SUMMARY_LANGUAGE.get(language),
            features.language.label(language)
        ));
    }

    if !features.words.is_empty() {
        let sample: Vec<&str> = features
            .words
            .iter()
            .take(WORD_SAMPLE_SIZE)
            .map(String::as_str)
            .collect();
        facts.push(format!(
            "{}: {}",
            locale::SUMMARY_WORD_SAMPLE.get(language),
            sample.join(", ")
        ));

        if features.words.len() > WORD_SAMPLE_SIZE {
            facts.push(format!(
                "{}: {}",
                locale::SUMMARY_WORD_TOTAL.get(language),
                features.words.len()
            ));
        }
    }

    for category in &features.domain_categories {
        let terms: Vec<&str> = features.terms_in(*category).collect();
        facts.push(format!(
            "{} ({}): {}",
            locale::SUMMARY_DOMAIN_TERMS.get(language),
            category.label(language),
            terms.join(", ")
        ));
    }

    if features.content_type != ContentType::Unknown {
        facts.push(format!(
            "{}: {}",
            locale::SUMMARY_CONTENT_TYPE.get(language),
            features.content_type.label(language)
        ));
    }

    if !features.numbers.is_empty() {
        facts.push(format!(
            "{}: {}",
            locale::SUMMARY_NUMBERS.get(language),
            features.numbers.join(", ")
        ));
    }

    facts
}

fn template(stage: PromptStage, language: OutputLanguage) -> &'static str {
    match (language, stage) {
        (OutputLanguage::Hebrew, PromptStage::QuickFilePreview) => HE_QUICK_FILE,
        (OutputLanguage::Hebrew, PromptStage::QuickTextPreview) => HE_QUICK_TEXT,
        (OutputLanguage::Hebrew, PromptStage::ShortSummary) => HE_SHORT_SUMMARY,
        (OutputLanguage::Hebrew, PromptStage::DetailedAnalysis) => HE_DETAILED_ANALYSIS,
        (OutputLanguage::Hebrew, PromptStage::GenreClassification) => HE_GENRE,
        (OutputLanguage::Hebrew, PromptStage::PeriodClassification) => HE_PERIOD,
        (OutputLanguage::English, PromptStage::QuickFilePreview) => EN_QUICK_FILE,
        (OutputLanguage::English, PromptStage::QuickTextPreview) => EN_QUICK_TEXT,
        (OutputLanguage::English, PromptStage::ShortSummary) => EN_SHORT_SUMMARY,
        (OutputLanguage::English, PromptStage::DetailedAnalysis) => EN_DETAILED_ANALYSIS,
        (OutputLanguage::English, PromptStage::GenreClassification) => EN_GENRE,
        (OutputLanguage::English, PromptStage::PeriodClassification) => EN_PERIOD,
    }
}

// Hebrew templates

const HE_QUICK_FILE: &str = "אתה מומחה בכתובות יתדות עתיקות וארכיאולוגיה.
נתח במהירות את התוכן הבא ותן תשובה מיידית בעברית (1-2 משפטים):

{content}

זהה:
1. איזה סוג כתובת/תוכן זה
2. מה מעניין או חשוב בממצא הזה
3. איזו תקופה או תרבות (אם ניתן לזהות)

תשובה קצרה, מעניינת ומקצועית בעברית!
";

const HE_QUICK_TEXT: &str = "אתה מומחה בכתובות יתדות עתיקות וארכיאולוגיה.
נתח במהירות את הטקסט הבא: \"{content}\"

השב בעברית בקצרה (1-2 משפטים):
- מה זה (סוג כתובת/תוכן)?
- מה המשמעות או החשיבות שלו?

תשובה מקצועית וקצרה בעברית!
";

const HE_SHORT_SUMMARY: &str = "אתה מומחה בארכיאולוגיה ובכתובות יתדות עתיקות.
צור סיכום קצר ומעניין (1-2 משפטים) על הטקסט הבא:

{content}

השב בעברית בצורה נגישה וחוויתית.
";

const HE_DETAILED_ANALYSIS: &str = "אתה חוקר מוביל בתחום הארכיאולוגיה והאשורולוגיה.
נתח בפירוט את הטקסט הבא:

{content}

בתגובתך כלול:
• הקשר היסטורי מפורט
• משמעות התוכן והחשיבות שלו
• מידע על התקופה והתרבות
• פרטים מעניינים ורלוונטיים

השב בעברית ברמה אקדמית אך נגישה, באורך של כ-200-300 מילים.
";

const HE_GENRE: &str = "נתח את הטקסט הבא וסווג אותו לקטגוריה אחת:

{content}

השב בעברית במילה אחת או שתיים בלבד - סוג הכתובת:
למשל: \"כתובת מלכותית\", \"מסמך כלכלי\", \"טקסט דתי\", \"רשימה אדמיניסטרטיבית\"
";

const HE_PERIOD: &str = "נתח את הטקסט הבא וזהה את התקופה ההיסטורית:

{content}

השב בעברית במילים מעטות בלבד - התקופה:
למשל: \"תקופת אור השלישית\", \"התקופה הבבלית העתיקה\", \"התקופה האשורית\"
";

// English templates

const EN_QUICK_FILE: &str = "You are an expert in ancient cuneiform inscriptions and archaeology.
Quickly analyze the following content and provide an immediate response in English (1-2 sentences):

{content}

Identify:
1. What type of inscription/content is this
2. What is interesting or important about this finding
3. What period or culture (if identifiable)

Short, interesting and professional response in English!
";

const EN_QUICK_TEXT: &str = "You are an expert in ancient cuneiform inscriptions and archaeology.
Quickly analyze the following text: \"{content}\"

Respond in English briefly (1-2 sentences):
- What is this (type of inscription/content)?
- What is its meaning or significance?

Professional and concise response in English!
";

const EN_SHORT_SUMMARY: &str = "You are an expert in archaeology and ancient cuneiform inscriptions.
Create a short and interesting summary (1-2 sentences) about the following text:

{content}

Respond in English in an accessible and engaging manner.
";

const EN_DETAILED_ANALYSIS: &str = "You are a leading researcher in archaeology and Assyriology.
Analyze in detail the following text:

{content}

Include in your response:
• Detailed historical context
• Meaning of the content and its importance
• Information about the period and culture
• Interesting and relevant details

Respond in English at an academic but accessible level, approximately 200-300 words.
";

const EN_GENRE: &str = "Analyze the following text and classify it into one category:

{content}

Respond in English with only one or two words - the type of inscription:
For example: \"Royal inscription\", \"Economic document\", \"Religious text\", \"Administrative record\"
";

const EN_PERIOD: &str = "Analyze the following text and identify the historical period:

{content}

Respond in English with just a few words - the period:
For example: \"Ur III period\", \"Old Babylonian period\", \"Neo-Assyrian period\"
";
