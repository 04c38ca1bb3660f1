use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    config::ScannerConfig,
    scanner::{ProbeKind, ProbeResults, Tokenizer},
    span::{index_remaining, segments, Segment, TokenSpan},
    StepResult,
};

/// A guarded scanner call waiting for permission to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Probe(ProbeKind),
    Next,
    NextLine,
    NextInt,
    NextLong,
    NextDouble,
    NextBoolean,
}

impl Operation {
    pub fn is_probe(&self) -> bool {
        matches!(self, Operation::Probe(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Probe(kind) => write!(f, "{}", kind.method_name()),
            Operation::Next => write!(f, "next"),
            Operation::NextLine => write!(f, "nextLine"),
            Operation::NextInt => write!(f, "nextInt"),
            Operation::NextLong => write!(f, "nextLong"),
            Operation::NextDouble => write!(f, "nextDouble"),
            Operation::NextBoolean => write!(f, "nextBoolean"),
        }
    }
}

/// Scanner state at one pause point.
///
/// Built in full before it is published and never changed afterwards; the
/// observer owns its copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Number of the pause this snapshot belongs to, counting from 1. The final
    /// snapshot of a finished session repeats the last number.
    pub step: u64,
    pub source_description: String,
    /// `None` once nothing is pending.
    pub current_operation: Option<Operation>,
    pub next_token: Option<String>,
    /// The unconsumed part of the input.
    pub buffer: String,
    pub config: ScannerConfig,
    pub probe_results: ProbeResults,
    /// Present only when the observer asked for highlighting.
    pub spans: Option<Vec<TokenSpan>>,
}

impl SessionSnapshot {
    #[tracing::instrument(level = "debug", skip(tokenizer, source_description))]
    pub fn capture(
        tokenizer: &Tokenizer,
        step: u64,
        source_description: &str,
        current_operation: Option<Operation>,
        highlight: bool,
    ) -> StepResult<Self> {
        let probe_results = ProbeResults::collect(|kind| tokenizer.probe(kind));
        let buffer = tokenizer.remaining().to_string();
        let spans = if highlight {
            Some(index_remaining(tokenizer)?)
        } else {
            None
        };

        Ok(Self {
            step,
            source_description: source_description.to_string(),
            current_operation,
            next_token: tokenizer.peek_token().map(str::to_string),
            buffer,
            config: tokenizer.config().clone(),
            probe_results,
            spans,
        })
    }

    pub fn probe(&self, kind: ProbeKind) -> bool {
        self.probe_results.get(kind)
    }

    pub fn is_pending(&self) -> bool {
        self.current_operation.is_some()
    }

    /// Gap/token pieces of the buffer, if spans were computed.
    pub fn segments(&self) -> Option<StepResult<Vec<Segment>>> {
        self.spans
            .as_ref()
            .map(|spans| segments(&self.buffer, spans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use strum::IntoEnumIterator;

    fn tab_tokenizer(input: &str) -> Tokenizer {
        Tokenizer::new(input, ScannerConfig::default().with_delimiter("\t")).unwrap()
    }

    #[test]
    fn test_capture_without_highlighting() {
        let t = tab_tokenizer("12\t34\tabc");
        let snapshot =
            SessionSnapshot::capture(&t, 1, "String", Some(Operation::Probe(ProbeKind::Int)), false)
                .unwrap();
        assert_eq!(snapshot.step, 1);
        assert_eq!(snapshot.next_token.as_deref(), Some("12"));
        assert_eq!(snapshot.buffer, "12\t34\tabc");
        assert!(snapshot.spans.is_none());
        assert!(snapshot.segments().is_none());
        assert!(snapshot.probe_results.is_complete());
        assert_eq!(
            snapshot.current_operation.map(|op| op.to_string()),
            Some("hasNextInt".to_string())
        );
    }

    #[test]
    fn test_probe_results_match_tokenizer() {
        let mut t = Tokenizer::new(
            "3,5 true 12",
            ScannerConfig::default().with_locale(Locale::parse("sk").unwrap()),
        )
        .unwrap();
        for _ in 0..3 {
            let snapshot = SessionSnapshot::capture(&t, 0, "", None, false).unwrap();
            for kind in ProbeKind::iter() {
                assert_eq!(snapshot.probe(kind), t.probe(kind), "{kind}");
            }
            t.consume_next().unwrap();
        }
    }

    #[test]
    fn test_capture_with_highlighting_uses_remaining_buffer() {
        let mut t = tab_tokenizer("12\t34\tabc");
        t.consume_next().unwrap();
        let snapshot = SessionSnapshot::capture(&t, 2, "String", Some(Operation::Next), true).unwrap();
        assert_eq!(snapshot.buffer, "\t34\tabc");
        assert_eq!(
            snapshot.spans,
            Some(vec![TokenSpan::new(1, 2), TokenSpan::new(4, 3)])
        );
        let pieces = snapshot.segments().unwrap().unwrap();
        assert_eq!(pieces.len(), 4);
    }

    #[test]
    fn test_spans_agree_with_next_token_after_consume() {
        let mut t = Tokenizer::new("x,y", ScannerConfig::default().with_delimiter("^|,")).unwrap();
        t.consume_next().unwrap();
        let snapshot = SessionSnapshot::capture(&t, 2, "String", Some(Operation::Next), true).unwrap();
        assert_eq!(snapshot.buffer, ",y");
        assert_eq!(snapshot.next_token.as_deref(), Some("y"));
        let first = snapshot.spans.as_ref().unwrap()[0];
        assert_eq!(first.text(&snapshot.buffer), snapshot.next_token.as_deref());
        assert_eq!(t.consume_next().unwrap(), "y");
    }

    #[test]
    fn test_empty_buffer_snapshot() {
        let t = tab_tokenizer("");
        let snapshot = SessionSnapshot::capture(&t, 1, "String", None, true).unwrap();
        assert!(ProbeKind::iter().all(|kind| !snapshot.probe(kind)));
        assert_eq!(snapshot.spans, Some(vec![]));
        assert_eq!(snapshot.next_token, None);
        assert!(!snapshot.is_pending());
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::Next.to_string(), "next");
        assert_eq!(Operation::NextLine.to_string(), "nextLine");
        assert_eq!(Operation::Probe(ProbeKind::Generic).to_string(), "hasNext");
        assert!(Operation::Probe(ProbeKind::Line).is_probe());
    }

    #[test]
    fn test_snapshot_serializes() {
        let t = tab_tokenizer("1");
        let snapshot = SessionSnapshot::capture(&t, 1, "String", Some(Operation::Next), true).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["current_operation"], "next");
        assert_eq!(json["probe_results"]["int"], true);
        assert_eq!(json["spans"][0]["length"], 1);
    }
}
