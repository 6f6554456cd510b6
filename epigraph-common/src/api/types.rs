//! Shared API request/response types
//!
//! Field names follow the web client's camelCase JSON.

use crate::OutputLanguage;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ========================================
// Query Request
// ========================================

/// Body of `POST /api/query` and `POST /api/query/stream`
///
/// # Examples
///
/// ```
/// use epigraph_common::api::types::QueryRequest;
///
/// let request: QueryRequest = serde_json::from_str(r#"{
///     "inputData": { "type": "text", "data": "1(gur) še" },
///     "language": "en"
/// }"#).unwrap();
///
/// assert_eq!(request.input_data.kind, "text");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Input payload
    pub input_data: InputData,

    /// Interface language; default output language when no preference is set
    #[serde(default)]
    pub language: Option<String>,

    /// Optional preference overrides
    #[serde(default)]
    pub preferences: Preferences,

    /// Caller-proposed request identifier (used as the cancellation handle)
    #[serde(default)]
    pub request_id: Option<Uuid>,
}

/// Input payload with its discriminator
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputData {
    /// Discriminator: `text`, `file` or `camera` (validated by the service)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Raw text body (file contents for `file`/`camera`); non-string
    /// values count as missing
    #[serde(default, deserialize_with = "lenient_text")]
    pub data: Option<String>,

    /// Original file name for `file`/`camera` inputs
    #[serde(default)]
    pub file_name: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

/// Caller preference overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Output language override (wins over `language`)
    #[serde(default)]
    pub output_language: Option<String>,
}

impl QueryRequest {
    /// Effective output language: preference override, then interface
    /// language, then the default locale
    pub fn output_language(&self) -> OutputLanguage {
        self.preferences
            .output_language
            .as_deref()
            .or(self.language.as_deref())
            .map(OutputLanguage::from_code)
            .unwrap_or_default()
    }

    /// Output language read best-effort from a body that may not decode
    /// as a `QueryRequest`
    pub fn output_language_of(body: &Value) -> OutputLanguage {
        body.pointer("/preferences/outputLanguage")
            .and_then(Value::as_str)
            .or_else(|| body.get("language").and_then(Value::as_str))
            .map(OutputLanguage::from_code)
            .unwrap_or_default()
    }
}

// ========================================
// Analysis Result
// ========================================

/// Aggregate result returned by the synchronous endpoint and carried by
/// the `final_results` frame
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisResult {
    /// Short summary in the output language
    pub summary: String,

    /// Output language of every text field
    pub language: OutputLanguage,

    /// Labeled sections in fixed order: genre, period, full narrative
    pub tabs: Vec<ResultTab>,

    /// Quick preview produced before the main analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessing: Option<QuickPreview>,
}

/// One labeled content section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResultTab {
    /// Localized section name
    pub name: String,
    /// Section content
    pub content: String,
}

/// Quick preview outcome
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuickPreview {
    /// `success` when the model answered, `partial` for the fallback text
    pub status: PreviewStatus,
    /// Preview text
    pub preview: String,
    /// Output language of the preview
    pub language: OutputLanguage,
}

/// Whether a preview came from the model or from the fallback text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStatus {
    /// Model answered
    Success,
    /// Fallback text substituted
    Partial,
}

// ========================================
// Cancellation
// ========================================

/// Response of `POST /api/cancel/{request_id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CancelResponse {
    /// Outcome of the cancellation
    pub status: CancelStatus,
    /// Identifier the caller asked about
    pub request_id: String,
}

/// Cancellation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelStatus {
    /// Request marked inactive (also for repeated cancels)
    Cancelled,
    /// No live request with this identifier
    NotFound,
}
