//! # Token Span Indexing
//!
//! Recomputes where every token of a buffer lies so a display can highlight
//! them. Indexing drains its own copy of a [`Tokenizer`], so the live
//! scanner's cursor is never touched, and starts from scratch on every call.
//! Buffers shown to a learner are small; no incremental state is kept.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    config::ScannerConfig,
    scanner::{ProbeKind, Tokenizer},
    StepError, StepResult,
};

/// Byte offset and length of one token within a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub length: usize,
}

impl TokenSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn text<'a>(&self, buffer: &'a str) -> Option<&'a str> {
        buffer.get(self.range())
    }
}

impl From<(usize, usize)> for TokenSpan {
    fn from((start, length): (usize, usize)) -> Self {
        Self { start, length }
    }
}

/// Lists the spans of all tokens `buffer` would yield under `config`, in order.
#[tracing::instrument(level = "debug", skip(buffer, config), fields(len = buffer.len()))]
pub fn index_spans(buffer: &str, config: &ScannerConfig) -> StepResult<Vec<TokenSpan>> {
    spans_ahead(Tokenizer::new(buffer, config.clone())?)
}

/// Lists the spans of the tokens `tokenizer` has yet to return, relative to
/// [`Tokenizer::remaining`].
///
/// A clone of the tokenizer is drained, so input before the cursor still takes
/// part in delimiter matching (`^`, `\b`) exactly as it does for the live one.
#[tracing::instrument(level = "debug", skip(tokenizer), fields(position = tokenizer.position()))]
pub fn index_remaining(tokenizer: &Tokenizer) -> StepResult<Vec<TokenSpan>> {
    spans_ahead(tokenizer.clone())
}

fn spans_ahead(mut scan: Tokenizer) -> StepResult<Vec<TokenSpan>> {
    let base = scan.position();
    let mut spans = Vec::new();
    let mut cursor = base;

    while scan.probe(ProbeKind::Generic) {
        let token = scan.consume_next()?;
        let end = scan.position();
        if token.is_empty() || end <= cursor {
            return Err(StepError::MalformedDelimiter {
                pattern: scan.delimiter().to_string(),
                offset: cursor - base,
            });
        }
        let span = TokenSpan::new(end - token.len() - base, token.len());
        trace!(start = span.start, length = span.length, token = %token, "indexed token");
        spans.push(span);
        cursor = end;
    }

    Ok(spans)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Delimiter text before a token.
    Gap,
    Token,
    /// Text after the last token.
    Trail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn new(kind: SegmentKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Splits `buffer` into gap/token pieces followed by the trailing text.
///
/// Empty gaps and an empty trail are left out; concatenating the texts always
/// gives back `buffer`.
pub fn segments(buffer: &str, spans: &[TokenSpan]) -> StepResult<Vec<Segment>> {
    let mut pieces = Vec::with_capacity(spans.len() * 2 + 1);
    let mut gap_start = 0;

    for span in spans {
        let invalid = || StepError::InvalidSpan {
            start: span.start,
            length: span.length,
        };
        if span.length == 0 || span.start < gap_start {
            return Err(invalid());
        }
        let gap = buffer.get(gap_start..span.start).ok_or_else(invalid)?;
        let token = span.text(buffer).ok_or_else(invalid)?;
        if !gap.is_empty() {
            pieces.push(Segment::new(SegmentKind::Gap, gap));
        }
        pieces.push(Segment::new(SegmentKind::Token, token));
        gap_start = span.end();
    }

    let trail = &buffer[gap_start..];
    if !trail.is_empty() {
        pieces.push(Segment::new(SegmentKind::Trail, trail));
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(delimiter: &str) -> ScannerConfig {
        ScannerConfig::default().with_delimiter(delimiter)
    }

    fn spans(list: &[(usize, usize)]) -> Vec<TokenSpan> {
        list.iter().copied().map(TokenSpan::from).collect()
    }

    #[test]
    fn test_tab_delimited_spans() {
        let result = index_spans("12\t34\tabc", &config("\t")).unwrap();
        assert_eq!(result, spans(&[(0, 2), (3, 2), (6, 3)]));
    }

    #[test]
    fn test_empty_buffer_has_no_spans() {
        assert!(index_spans("", &config("\t")).unwrap().is_empty());
        assert!(segments("", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_leading_and_trailing_delimiters() {
        let result = index_spans("  ab   c ", &ScannerConfig::default()).unwrap();
        assert_eq!(result, spans(&[(2, 2), (7, 1)]));
    }

    #[test]
    fn test_token_text_inside_delimiter_gap() {
        // "x" occurs inside the delimiter "xy" before the token itself.
        let result = index_spans("xyx", &config("xy")).unwrap();
        assert_eq!(result, spans(&[(2, 1)]));
    }

    #[test]
    fn test_zero_length_delimiter_makes_progress() {
        let result = index_spans("abc", &config("")).unwrap();
        assert_eq!(result, spans(&[(0, 1), (1, 1), (2, 1)]));
    }

    #[test]
    fn test_remaining_spans_see_consumed_text() {
        // `^` only matches at the very start of the input, not of the remainder.
        let mut live = Tokenizer::new("x,y,z", config("^|,")).unwrap();
        assert_eq!(live.consume_next().unwrap(), "x");

        let result = index_remaining(&live).unwrap();
        assert_eq!(result, spans(&[(1, 1), (3, 1)]));
        let texts: Vec<_> = result.iter().map(|s| s.text(live.remaining())).collect();
        assert_eq!(texts, vec![Some("y"), Some("z")]);
        assert_eq!(live.position(), 1);
    }

    #[test]
    fn test_remaining_spans_at_word_boundaries() {
        let mut live = Tokenizer::new("ab cd", config(r"\b")).unwrap();
        live.consume_next().unwrap();
        let result = index_remaining(&live).unwrap();
        let texts: Vec<_> = result
            .iter()
            .map(|s| s.text(live.remaining()).unwrap().to_string())
            .collect();

        let mut expected = Vec::new();
        while live.probe(ProbeKind::Generic) {
            expected.push(live.consume_next().unwrap());
        }
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_multibyte_offsets() {
        let buffer = "čaj,kávu";
        let result = index_spans(buffer, &config(",")).unwrap();
        assert_eq!(result[0].text(buffer), Some("čaj"));
        assert_eq!(result[1].text(buffer), Some("kávu"));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        assert!(matches!(
            index_spans("a", &config("(")),
            Err(StepError::InvalidDelimiter { .. })
        ));
    }

    #[test]
    fn test_segments() {
        let buffer = " 12\t34\t";
        let result = segments(buffer, &spans(&[(1, 2), (4, 2)])).unwrap();
        let kinds: Vec<_> = result.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Gap,
                SegmentKind::Token,
                SegmentKind::Gap,
                SegmentKind::Token,
                SegmentKind::Trail
            ]
        );
        let joined: String = result.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, buffer);
    }

    #[test]
    fn test_segments_reject_bad_spans() {
        assert!(matches!(
            segments("abc", &spans(&[(1, 5)])),
            Err(StepError::InvalidSpan { start: 1, length: 5 })
        ));
        assert!(segments("abcd", &spans(&[(2, 1), (1, 1)])).is_err());
        assert!(segments("abc", &spans(&[(0, 0)])).is_err());
        // Splits a multi-byte character.
        assert!(segments("č", &spans(&[(1, 1)])).is_err());
    }
}
