//! Validated inbound query
//!
//! Validation runs before registration: a rejected query never creates a
//! registry entry and never reaches a pipeline stage.

use crate::error::ApiError;
use crate::locale;
use epigraph_common::api::types::QueryRequest;
use epigraph_common::OutputLanguage;
use uuid::Uuid;

/// Input discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Text typed by the user
    Text,
    /// Uploaded file (plain text or XML/TEI)
    File,
    /// Text recognized from a camera capture
    Camera,
}

impl InputKind {
    /// Parse the wire discriminator
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "text" => Some(InputKind::Text),
            "file" => Some(InputKind::File),
            "camera" => Some(InputKind::Camera),
            _ => None,
        }
    }
}

/// Query accepted for pipeline execution
#[derive(Debug, Clone)]
pub struct ValidatedQuery {
    pub kind: InputKind,
    /// Raw text body, never empty or whitespace-only
    pub text: String,
    pub file_name: Option<String>,
    pub output_language: OutputLanguage,
    /// Caller-proposed identifier
    pub request_id: Option<Uuid>,
}

impl ValidatedQuery {
    /// Validate a raw request
    ///
    /// Errors carry a message in the caller's output language.
    pub fn from_request(request: QueryRequest) -> Result<Self, ApiError> {
        let language = request.output_language();
        let input = request.input_data;

        let kind = InputKind::parse(&input.kind).ok_or_else(|| {
            ApiError::BadRequest(locale::unknown_input_type(language, &input.kind))
        })?;

        let text = input.data.unwrap_or_default();
        if text.trim().is_empty() {
            let message = match kind {
                InputKind::Text => locale::NO_TEXT.get(language).to_string(),
                InputKind::File | InputKind::Camera => locale::file_empty(
                    language,
                    input.file_name.as_deref().unwrap_or("unknown_file"),
                ),
            };
            return Err(ApiError::BadRequest(message));
        }

        Ok(Self {
            kind,
            text,
            file_name: input.file_name,
            output_language: language,
            request_id: request.request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> QueryRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_text_query() {
        let query = ValidatedQuery::from_request(request(
            r#"{ "inputData": { "type": "text", "data": "1(gur) še" }, "language": "en" }"#,
        ))
        .unwrap();

        assert_eq!(query.kind, InputKind::Text);
        assert_eq!(query.text, "1(gur) še");
        assert_eq!(query.output_language, OutputLanguage::English);
    }

    #[test]
    fn test_whitespace_text_rejected_with_localized_message() {
        let err = ValidatedQuery::from_request(request(
            r#"{ "inputData": { "type": "text", "data": "   \n\t" }, "language": "en" }"#,
        ))
        .unwrap_err();

        match err {
            ApiError::BadRequest(message) => assert_eq!(message, "No text provided"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_names_the_file() {
        let err = ValidatedQuery::from_request(request(
            r#"{ "inputData": { "type": "file", "data": "", "fileName": "tablet.xml" }, "language": "en" }"#,
        ))
        .unwrap_err();

        match err {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "File 'tablet.xml' is empty or unreadable")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = ValidatedQuery::from_request(request(
            r#"{ "inputData": { "type": "video", "data": "x" } }"#,
        ))
        .unwrap_err();

        match err {
            ApiError::BadRequest(message) => assert_eq!(message, "סוג קלט לא ידוע: video"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_camera_uses_file_message() {
        let err = ValidatedQuery::from_request(request(
            r#"{ "inputData": { "type": "camera", "data": " " }, "language": "en" }"#,
        ))
        .unwrap_err();

        match err {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "File 'unknown_file' is empty or unreadable")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
