use std::ops::Range;

use regex::Regex;
use tracing::{debug, trace};

use super::{grammar::Grammar, ProbeKind};
use crate::{
    config::{Locale, ScannerConfig, SessionConfig},
    StepError, StepResult,
};

/// A cursor over an input text that splits it into tokens by a delimiter
/// pattern and answers value-grammar probes about the next token.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    input: String,
    position: usize,
    config: ScannerConfig,
    grammar: Grammar,
}

impl Tokenizer {
    pub fn new(input: impl Into<String>, config: ScannerConfig) -> StepResult<Self> {
        let grammar = Grammar::compile(&config)?;
        Ok(Self {
            input: input.into(),
            position: 0,
            config,
            grammar,
        })
    }

    pub fn from_session_config(
        input: impl Into<String>,
        config: &SessionConfig,
    ) -> StepResult<Self> {
        Self::new(input, config.scanner.clone())
    }

    /// True iff the next token satisfies the grammar of `kind`. Never consumes input.
    pub fn probe(&self, kind: ProbeKind) -> bool {
        match kind {
            ProbeKind::Line => self.position < self.input.len(),
            kind => self
                .peek_token()
                .is_some_and(|token| self.grammar.matches(kind, token)),
        }
    }

    pub fn peek_token(&self) -> Option<&str> {
        self.next_range().map(|range| &self.input[range])
    }

    /// Returns the next token and advances past it.
    pub fn consume_next(&mut self) -> StepResult<String> {
        let range = self.next_range().ok_or(StepError::NoMoreInput)?;
        let token = self.input[range.clone()].to_string();
        trace!(token = %token, start = range.start, "consumed token");
        self.position = range.end;
        Ok(token)
    }

    /// Returns the rest of the current line and advances past its terminator.
    pub fn consume_line(&mut self) -> StepResult<String> {
        if self.position >= self.input.len() {
            return Err(StepError::NoMoreInput);
        }
        let rest = &self.input[self.position..];
        let (line, advance) = match rest.find(['\n', '\r', '\u{2028}', '\u{2029}', '\u{85}']) {
            Some(at) if rest[at..].starts_with("\r\n") => (&rest[..at], at + 2),
            Some(at) => {
                let terminator = rest[at..].chars().next().map_or(1, char::len_utf8);
                (&rest[..at], at + terminator)
            }
            None => (rest, rest.len()),
        };
        let line = line.to_string();
        trace!(line = %line, "consumed line");
        self.position += advance;
        Ok(line)
    }

    pub fn consume_int(&mut self) -> StepResult<i32> {
        self.consume_integer(ProbeKind::Int)
    }

    pub fn consume_long(&mut self) -> StepResult<i64> {
        self.consume_integer(ProbeKind::Long)
    }

    pub fn consume_double(&mut self) -> StepResult<f64> {
        self.consume_typed(ProbeKind::Double, |grammar, token| {
            grammar.parse_decimal(token)
        })
    }

    pub fn consume_boolean(&mut self) -> StepResult<bool> {
        self.consume_typed(ProbeKind::Boolean, |grammar, token| {
            grammar.parse_boolean(token)
        })
    }

    fn consume_integer<T: TryFrom<i128>>(&mut self, kind: ProbeKind) -> StepResult<T> {
        self.consume_typed(kind, |grammar, token| {
            grammar
                .parse_integer(token)
                .and_then(|value| T::try_from(value).ok())
        })
    }

    /// Converts the next token with `parse`; on mismatch nothing is consumed.
    fn consume_typed<T, F>(&mut self, expected: ProbeKind, parse: F) -> StepResult<T>
    where
        F: FnOnce(&Grammar, &str) -> Option<T>,
    {
        let range = self.next_range().ok_or(StepError::NoMoreInput)?;
        let token = &self.input[range.clone()];
        let value = parse(&self.grammar, token).ok_or_else(|| StepError::InputMismatch {
            expected,
            found: token.to_string(),
        })?;
        trace!(token = %token, kind = %expected, "consumed typed token");
        self.position = range.end;
        Ok(value)
    }

    fn next_range(&self) -> Option<Range<usize>> {
        locate_token(&self.input, self.position, self.grammar.delimiter())
    }

    pub fn delimiter(&self) -> &str {
        &self.config.delimiter
    }

    pub fn radix(&self) -> u32 {
        self.config.radix
    }

    pub fn locale(&self) -> &Locale {
        &self.config.locale
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The unconsumed part of the input.
    pub fn remaining(&self) -> &str {
        &self.input[self.position..]
    }

    /// Byte offset of the cursor in the original input.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn use_delimiter(&mut self, delimiter: &str) -> StepResult<()> {
        self.use_config(self.config.clone().with_delimiter(delimiter))
    }

    pub fn use_radix(&mut self, radix: u32) -> StepResult<()> {
        self.use_config(self.config.clone().with_radix(radix))
    }

    pub fn use_locale(&mut self, locale: Locale) -> StepResult<()> {
        self.use_config(self.config.clone().with_locale(locale))
    }

    /// Replaces the configuration; the old one stays in effect if the new one is invalid.
    pub fn use_config(&mut self, config: ScannerConfig) -> StepResult<()> {
        let grammar = Grammar::compile(&config)?;
        debug!(
            delimiter = %config.delimiter,
            radix = config.radix,
            locale = %config.locale,
            "scanner reconfigured"
        );
        self.grammar = grammar;
        self.config = config;
        Ok(())
    }
}

/// Finds the byte range of the first token at or after `from`.
///
/// Every non-empty delimiter match directly at the cursor is skipped first, so
/// tokens are never empty. A zero-length delimiter match at the token start does
/// not end the token; the next match after it does.
pub(crate) fn locate_token(text: &str, from: usize, delimiter: &Regex) -> Option<Range<usize>> {
    let mut start = from;
    while let Some(m) = delimiter.find_at(text, start) {
        if m.start() != start || m.is_empty() {
            break;
        }
        start = m.end();
    }
    if start >= text.len() {
        return None;
    }

    let mut search = start;
    let end = loop {
        match delimiter.find_at(text, search) {
            Some(m) if m.end() == start => {
                search = start + text[start..].chars().next().map_or(1, char::len_utf8);
            }
            Some(m) => break m.start(),
            None => break text.len(),
        }
    };
    Some(start..end)
}
