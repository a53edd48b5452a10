//! Event payload records.
//!
//! Every field is optional: a payload that lacks `choices`, `delta` or
//! `content` is still a valid record, it just carries no text.

use serde::Deserialize;

/// One `data:` payload of the chat stream.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Option<Vec<ChunkChoice>>,
}

/// A choice entry; only the first one is read.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
}

/// Incremental delta of a choice.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// The primary choice's delta content, if the record carries one.
    ///
    /// `Some("")` is a present-but-empty fragment and is distinct from `None`.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .as_deref()?
            .first()?
            .delta
            .as_ref()?
            .content
            .as_deref()
    }
}

/// Why a payload did not yield a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Syntactically broken or cut short; may parse once recombined.
    Malformed(String),
    /// Complete JSON of the wrong shape (e.g. a bare number).
    NotARecord(String),
}

/// Parse a `data:` payload into a [`ChatChunk`].
pub fn parse_chunk(payload: &str) -> Result<ChatChunk, PayloadError> {
    serde_json::from_str(payload).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => PayloadError::NotARecord(e.to_string()),
        _ => PayloadError::Malformed(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_from_first_choice() {
        let chunk = parse_chunk(
            r#"{"choices":[{"delta":{"content":"Hel"}},{"delta":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.content(), Some("Hel"));
    }

    #[test]
    fn test_missing_fields_are_not_errors() {
        for payload in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":null}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"delta":{}}]}"#,
            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"delta":{"content":null}}]}"#,
        ] {
            let chunk = parse_chunk(payload).unwrap();
            assert_eq!(chunk.content(), None, "payload: {}", payload);
        }
    }

    #[test]
    fn test_empty_content_is_present() {
        let chunk = parse_chunk(r#"{"choices":[{"delta":{"content":""}}]}"#).unwrap();
        assert_eq!(chunk.content(), Some(""));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let chunk = parse_chunk(
            r#"{"id":"c-1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"x"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.content(), Some("x"));
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let err = parse_chunk(r#"{"choices":[{"delta":{"con"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_syntax_error_is_malformed() {
        let err = parse_chunk(r#"{"choices": oops}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_wrong_shape_is_not_a_record() {
        assert!(matches!(parse_chunk("42"), Err(PayloadError::NotARecord(_))));
        assert!(matches!(
            parse_chunk(r#"{"choices":"nope"}"#),
            Err(PayloadError::NotARecord(_))
        ));
    }

    #[test]
    fn test_pretty_printed_payload_parses() {
        let chunk = parse_chunk("{\"choices\":\n[{\"delta\":{\"content\":\"X\"}}]}").unwrap();
        assert_eq!(chunk.content(), Some("X"));
    }
}
