//! # Value Grammar
//!
//! Compiled regular expressions describing what each probe accepts for one
//! [`ScannerConfig`]. A grammar is rebuilt whenever the scanner is
//! reconfigured and never changes afterwards.
//!
//! * Integers: optional sign, digits of the configured radix. The locale's
//!   grouping separator may split the numeral into groups of three after a
//!   first group that does not start with zero (`1,000,000` for `en`,
//!   `1.000.000` for `de`, `7,fff` in radix 16).
//! * Decimals: decimal digits only, the locale's decimal separator, optional
//!   grouping and exponent (`-1,5e3` for `sk`).
//! * Non-numbers: `NaN` and `Infinity`, accepted by float/double probes only.
//! * Booleans: `true`/`false`, case-insensitive.

use regex::Regex;

use super::ProbeKind;
use crate::{config::ScannerConfig, StepError, StepResult};

#[derive(Debug, Clone)]
pub struct Grammar {
    delimiter: Regex,
    integer: Regex,
    decimal: Regex,
    non_number: Regex,
    boolean: Regex,
    radix: u32,
    grouping_separator: char,
    decimal_separator: char,
}

impl Grammar {
    #[tracing::instrument(level = "debug", skip(config), fields(delimiter = %config.delimiter, radix = config.radix))]
    pub fn compile(config: &ScannerConfig) -> StepResult<Self> {
        if !(crate::config::MIN_RADIX..=crate::config::MAX_RADIX).contains(&config.radix) {
            return Err(StepError::InvalidRadix(config.radix));
        }
        let delimiter =
            Regex::new(&config.delimiter).map_err(|source| StepError::InvalidDelimiter {
                pattern: config.delimiter.clone(),
                source,
            })?;

        let grouping_separator = config.locale.grouping_separator();
        let decimal_separator = config.locale.decimal_separator();
        let group = regex::escape(&grouping_separator.to_string());
        let point = regex::escape(&decimal_separator.to_string());

        let digit = radix_digit_class(config.radix, 0);
        let leading = radix_digit_class(config.radix, 1);
        let radix_numeral =
            format!("(?:{digit}+|{leading}{digit}{{0,2}}(?:{group}{digit}{{3}})+)");
        let decimal_grouped = format!("[1-9][0-9]{{0,2}}(?:{group}[0-9]{{3}})+");
        let decimal_numeral =
            format!("(?:(?:[0-9]+|{decimal_grouped})(?:{point}[0-9]*)?|{point}[0-9]+)");
        let exponent = "(?:[eE][-+]?[0-9]+)?";

        Ok(Self {
            delimiter,
            integer: compiled(&format!("^[-+]?{radix_numeral}$"))?,
            decimal: compiled(&format!("^[-+]?{decimal_numeral}{exponent}$"))?,
            non_number: compiled("^[-+]?(?:NaN|Infinity)$")?,
            boolean: compiled("(?i)^(?:true|false)$")?,
            radix: config.radix,
            grouping_separator,
            decimal_separator,
        })
    }

    pub fn delimiter(&self) -> &Regex {
        &self.delimiter
    }

    /// Whether `token` satisfies the grammar of `kind`.
    ///
    /// `Generic` and `Line` accept any token; whether a token or a line exists
    /// at all is decided by the tokenizer.
    pub fn matches(&self, kind: ProbeKind, token: &str) -> bool {
        match kind {
            ProbeKind::Generic | ProbeKind::Line => true,
            ProbeKind::Byte => self.integer_fits::<i8>(token),
            ProbeKind::Short => self.integer_fits::<i16>(token),
            ProbeKind::Int => self.integer_fits::<i32>(token),
            ProbeKind::Long => self.integer_fits::<i64>(token),
            ProbeKind::BigInteger => self.integer.is_match(token),
            ProbeKind::Float | ProbeKind::Double => self.parse_decimal(token).is_some(),
            ProbeKind::BigDecimal => self.decimal.is_match(token),
            ProbeKind::Boolean => self.boolean.is_match(token),
        }
    }

    /// Value of an integer token in the configured radix, if it fits in `i128`.
    pub fn parse_integer(&self, token: &str) -> Option<i128> {
        if !self.integer.is_match(token) {
            return None;
        }
        let (negative, body) = split_sign(token);
        let digits: String = body
            .chars()
            .filter(|c| *c != self.grouping_separator)
            .collect();
        let value = i128::from_str_radix(&digits, self.radix).ok()?;
        Some(if negative { -value } else { value })
    }

    pub fn parse_decimal(&self, token: &str) -> Option<f64> {
        if self.non_number.is_match(token) {
            let (negative, body) = split_sign(token);
            let value = if body == "NaN" {
                f64::NAN
            } else {
                f64::INFINITY
            };
            return Some(if negative { -value } else { value });
        }
        if !self.decimal.is_match(token) {
            return None;
        }
        let normalized: String = token
            .chars()
            .filter(|c| *c != self.grouping_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        normalized.parse::<f64>().ok()
    }

    pub fn parse_boolean(&self, token: &str) -> Option<bool> {
        if !self.boolean.is_match(token) {
            return None;
        }
        Some(token.eq_ignore_ascii_case("true"))
    }

    fn integer_fits<T: TryFrom<i128>>(&self, token: &str) -> bool {
        self.parse_integer(token)
            .is_some_and(|value| T::try_from(value).is_ok())
    }
}

fn compiled(pattern: &str) -> StepResult<Regex> {
    Regex::new(pattern).map_err(|source| StepError::InvalidDelimiter {
        pattern: pattern.to_string(),
        source,
    })
}

/// Character class of the digits `lowest..radix`; `lowest` is 0 or 1.
fn radix_digit_class(radix: u32, lowest: u32) -> String {
    match char::from_digit(radix - 1, radix) {
        Some(last) if radix <= 10 => format!("[{lowest}-{last}]"),
        Some(last) => format!("[{lowest}-9a-{last}A-{}]", last.to_ascii_uppercase()),
        None => "[0-9]".to_string(),
    }
}

fn split_sign(token: &str) -> (bool, &str) {
    match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    }
}
