//! Line classification for the chat event stream.
//!
//! The stream format is a subset of Server-Sent Events:
//! - `data: <json>` - data payload line
//! - `data: [DONE]` - normal end of stream
//! - Lines starting with `:` - comments / keep-alives (ignored)
//! - Blank lines and any other line - ignored

/// Literal marker preceding a JSON payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload signalling normal end of stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A classified stream line. Borrowed from the line it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Empty or whitespace-only
    Blank,
    /// Comment or keep-alive (`:` prefix), marker stripped
    Comment(&'a str),
    /// `data: [DONE]`
    Done,
    /// Data payload, prefix and surrounding whitespace stripped
    Data(&'a str),
    /// Anything else (e.g. `event:` or `id:` fields)
    Other(&'a str),
}

impl SseLine<'_> {
    /// Whether this line begins a new data frame.
    pub fn starts_frame(&self) -> bool {
        matches!(self, SseLine::Data(_) | SseLine::Done)
    }
}

/// Classify one line. Rules are checked in order; the first match wins.
pub fn classify_line(line: &str) -> SseLine<'_> {
    if line.trim().is_empty() {
        return SseLine::Blank;
    }

    if let Some(comment) = line.strip_prefix(':') {
        return SseLine::Comment(comment);
    }

    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return SseLine::Other(line);
    };

    let payload = rest.trim();
    if payload == DONE_SENTINEL {
        SseLine::Done
    } else {
        SseLine::Data(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines() {
        assert_eq!(classify_line(""), SseLine::Blank);
        assert_eq!(classify_line("   "), SseLine::Blank);
        assert_eq!(classify_line("\t"), SseLine::Blank);
    }

    #[test]
    fn test_comment_line() {
        assert_eq!(classify_line(": keep-alive"), SseLine::Comment(" keep-alive"));
        assert_eq!(classify_line(":"), SseLine::Comment(""));
    }

    #[test]
    fn test_comment_takes_precedence_over_data() {
        assert_eq!(
            classify_line(":data: {}"),
            SseLine::Comment("data: {}")
        );
    }

    #[test]
    fn test_data_line() {
        assert_eq!(
            classify_line(r#"data: {"choices":[]}"#),
            SseLine::Data(r#"{"choices":[]}"#)
        );
        assert_eq!(classify_line("data:   {}  "), SseLine::Data("{}"));
    }

    #[test]
    fn test_prefix_requires_space() {
        assert_eq!(classify_line("data:{}"), SseLine::Other("data:{}"));
    }

    #[test]
    fn test_done_sentinel() {
        assert_eq!(classify_line("data: [DONE]"), SseLine::Done);
        assert_eq!(classify_line("data: [DONE]  "), SseLine::Done);
        assert!(classify_line("data: [DONE]").starts_frame());
    }

    #[test]
    fn test_other_lines() {
        assert_eq!(classify_line("event: message"), SseLine::Other("event: message"));
        assert_eq!(classify_line("id: 7"), SseLine::Other("id: 7"));
        assert!(!classify_line("id: 7").starts_frame());
    }
}
