//! Wire types for the RAG webhook and response classification.
//!
//! A response body is parsed strictly as JSON, then classified: no `code`
//! or `code == 200` is a success, anything else is an application error.
//! Successful responses are normalized so the rest of the crate never sees
//! a missing answer or an unaddressable citation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::error::ClientError;
use crate::navigation::LineSpan;

/// Answer text used when the server returns an empty answer.
pub const NO_ANSWER: &str = "No answer received";

/// Error message used when an error response carries none.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A supporting source-code citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Path relative to the workspace root.
    pub file: String,
    /// Advisory language label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    /// `"N"` or `"N-M"`, 1-based.
    pub lines: String,
    /// Relevance; higher is more relevant.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
}

impl SourceCitation {
    /// The parsed line span.
    ///
    /// # Errors
    ///
    /// Returns an error when `lines` has no numeric start line.
    pub fn span(&self) -> Result<LineSpan, crate::error::NavigationError> {
        LineSpan::parse(&self.lines)
    }

    /// The `file:lines` reference string.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.file, self.lines)
    }
}

/// A response body as sent by the webhook, success or error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RagResponse {
    /// Answer text.
    #[serde(default)]
    pub answer: Option<String>,
    /// Supporting citations, best first.
    #[serde(default)]
    pub sources: Option<Vec<SourceCitation>>,
    /// Total number of sources the server considered.
    #[serde(default)]
    pub sources_count: Option<Number>,
    /// Application status; absent, `null` or 200 means success.
    #[serde(default)]
    pub code: Option<Value>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error remediation hint.
    #[serde(default)]
    pub hint: Option<String>,
}

/// A classified successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    /// Answer text, never empty.
    pub answer: String,
    /// Citations in server order; possibly empty.
    pub sources: Vec<SourceCitation>,
    /// `sources_count` when the server sent it.
    pub sources_count: Option<u64>,
}

impl RagResponse {
    /// Parses a complete response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedResponse`] with the parser message
    /// when the body is not a JSON object of the expected shape.
    pub fn parse(body: &str) -> Result<Self, ClientError> {
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// Returns `true` when the response is an application error.
    pub fn is_error(&self) -> bool {
        self.code
            .as_ref()
            .is_some_and(|code| numeric_code(code) != Some(200))
    }

    /// Classifies the response and normalizes a success.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Application`] for a non-200 `code`, and
    /// [`ClientError::MalformedResponse`] when a citation's `lines` field
    /// cannot be parsed.
    pub fn classify(self) -> Result<NormalizedResponse, ClientError> {
        if self.is_error() {
            return Err(ClientError::Application {
                code: self.code.as_ref().and_then(numeric_code).unwrap_or_default(),
                message: self
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                hint: self.hint.filter(|h| !h.is_empty()),
            });
        }

        let sources = self.sources.unwrap_or_default();
        for (index, source) in sources.iter().enumerate() {
            if source.span().is_err() {
                return Err(ClientError::MalformedResponse(format!(
                    "source {} ({}) has invalid lines '{}'",
                    index + 1,
                    source.file,
                    source.lines
                )));
            }
        }

        Ok(NormalizedResponse {
            answer: self
                .answer
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| NO_ANSWER.to_string()),
            sources,
            sources_count: self.sources_count.as_ref().and_then(Number::as_u64),
        })
    }
}

/// Integral value of a `code` field; `404` and `404.0` both give 404.
#[allow(clippy::cast_possible_truncation)]
fn numeric_code(code: &Value) -> Option<i64> {
    let Value::Number(number) = code else {
        return None;
    };
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
            .map(|f| f as i64)
    })
}

/// Reads `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_without_code() {
        let body = r#"{
            "answer": "It is in auth.rs",
            "sources": [
                {"file": "src/auth.rs", "language": "rust", "lines": "10-20", "score": 0.91234},
                {"file": "src/db.rs", "language": "rust", "lines": "3", "score": 0.5}
            ],
            "sources_count": 2
        }"#;
        let normalized = RagResponse::parse(body).unwrap().classify().unwrap();
        assert_eq!(normalized.answer, "It is in auth.rs");
        assert_eq!(normalized.sources.len(), 2);
        assert_eq!(normalized.sources[0].reference(), "src/auth.rs:10-20");
        assert_eq!(normalized.sources_count, Some(2));
    }

    #[test]
    fn test_code_200_is_success() {
        let response = RagResponse::parse(r#"{"code": 200, "answer": "ok"}"#).unwrap();
        assert!(!response.is_error());
        assert_eq!(response.classify().unwrap().answer, "ok");
    }

    #[test]
    fn test_empty_answer_defaults() {
        let normalized = RagResponse::parse(r#"{"answer": "", "sources": []}"#)
            .unwrap()
            .classify()
            .unwrap();
        assert_eq!(normalized.answer, NO_ANSWER);
        assert!(normalized.sources.is_empty());

        let normalized = RagResponse::parse("{}").unwrap().classify().unwrap();
        assert_eq!(normalized.answer, NO_ANSWER);
    }

    #[test]
    fn test_error_with_hint() {
        let body = r#"{"code": 404, "message": "not found", "hint": "try again"}"#;
        let err = RagResponse::parse(body)
            .unwrap()
            .classify()
            .unwrap_err();
        assert_eq!(err.to_string(), "not found\n\ntry again");
    }

    #[test]
    fn test_error_without_message() {
        let err = RagResponse::parse(r#"{"code": 500}"#)
            .unwrap()
            .classify()
            .unwrap_err();
        assert!(matches!(err, ClientError::Application { code: 500, .. }));
        assert_eq!(err.to_string(), UNKNOWN_ERROR);
    }

    #[test]
    fn test_fractional_code_is_application_error() {
        let response = RagResponse::parse(r#"{"code": 404.0, "message": "not found"}"#).unwrap();
        assert!(response.is_error());
        let err = response.classify().unwrap_err();
        assert!(matches!(err, ClientError::Application { code: 404, .. }));
        assert_eq!(err.to_string(), "not found");

        let response = RagResponse::parse(r#"{"code": 200.0, "answer": "ok"}"#).unwrap();
        assert_eq!(response.classify().unwrap().answer, "ok");
    }

    #[test]
    fn test_null_code_and_non_numeric_code() {
        let response = RagResponse::parse(r#"{"code": null, "answer": "ok"}"#).unwrap();
        assert!(!response.is_error());

        let err = RagResponse::parse(r#"{"code": "E_QUOTA", "message": "quota exceeded"}"#)
            .unwrap()
            .classify()
            .unwrap_err();
        assert!(matches!(err, ClientError::Application { code: 0, .. }));
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn test_null_message_and_hint() {
        let err = RagResponse::parse(r#"{"code": 500, "message": null, "hint": null}"#)
            .unwrap()
            .classify()
            .unwrap_err();
        assert_eq!(err.to_string(), UNKNOWN_ERROR);
    }

    #[test]
    fn test_null_language_and_score_default() {
        let body = r#"{"answer": "ok", "sources": [
            {"file": "a.rs", "language": null, "lines": "3", "score": 0.5},
            {"file": "b.rs", "language": "rust", "lines": "4-6", "score": null}
        ], "sources_count": null}"#;
        let normalized = RagResponse::parse(body).unwrap().classify().unwrap();
        assert_eq!(normalized.answer, "ok");
        assert_eq!(normalized.sources[0].language, "");
        assert!((normalized.sources[0].score - 0.5).abs() < f64::EPSILON);
        assert!(normalized.sources[1].score.abs() < f64::EPSILON);
        assert_eq!(normalized.sources_count, None);
    }

    #[test]
    fn test_float_sources_count_is_dropped() {
        let normalized = RagResponse::parse(r#"{"answer": "ok", "sources_count": 2.5}"#)
            .unwrap()
            .classify()
            .unwrap();
        assert_eq!(normalized.sources_count, None);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = RagResponse::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
        assert!(err.to_string().starts_with("failed to parse response: "));
    }

    #[test]
    fn test_unparseable_lines_is_malformed() {
        let body = r#"{"answer": "x", "sources": [
            {"file": "a.rs", "language": "rust", "lines": "top", "score": 1.0}
        ]}"#;
        let err = RagResponse::parse(body).unwrap().classify().unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
        assert!(err.to_string().contains("'top'"));
    }
}
