use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io::BufReader, path::Path};

use crate::{scanner::Grammar, StepError, StepResult};

pub const MIN_RADIX: u32 = 2;
pub const MAX_RADIX: u32 = 36;

/// Tokenizer settings observed by the display and used to rebuild token spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Regular expression separating tokens.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    #[serde(default = "default_radix")]
    pub radix: u32,

    #[serde(default)]
    pub locale: Locale,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            radix: default_radix(),
            locale: Locale::default(),
        }
    }
}

impl ScannerConfig {
    pub fn new(delimiter: &str, radix: u32, locale: Locale) -> StepResult<Self> {
        let config = Self {
            delimiter: delimiter.to_string(),
            radix,
            locale,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn with_radix(mut self, radix: u32) -> Self {
        self.radix = radix;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Checks run on configs that arrive from outside the type system (JSON, builders).
pub trait Validate {
    fn validate(&self) -> StepResult<()>;
}

impl Validate for ScannerConfig {
    fn validate(&self) -> StepResult<()> {
        Grammar::compile(self).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Human readable origin of the scanned text, e.g. `File("data.txt")`.
    #[serde(default = "default_source_description")]
    pub source_description: String,

    #[serde(default)]
    pub scanner: ScannerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_description: default_source_description(),
            scanner: ScannerConfig::default(),
        }
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> StepResult<()> {
        self.scanner.validate()
    }
}

/// A language/region pair deciding which separators appear in decimal numerals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            region: Some("US".to_string()),
        }
    }
}

impl Locale {
    /// Parses identifiers such as `sk`, `sk_SK` or `en-US`.
    pub fn parse(identifier: &str) -> StepResult<Self> {
        let mut parts = identifier.trim().split(['_', '-']);
        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(StepError::config(format!("Invalid locale: {identifier:?}")));
        }
        let region = match parts.next() {
            Some(region)
                if (2..=3).contains(&region.len())
                    && region.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Some(region.to_ascii_uppercase())
            }
            Some(_) => return Err(StepError::config(format!("Invalid locale: {identifier:?}"))),
            None => None,
        };
        if parts.next().is_some() {
            return Err(StepError::config(format!("Invalid locale: {identifier:?}")));
        }
        Ok(Self {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn decimal_separator(&self) -> char {
        match self.language.as_str() {
            "sk" | "cs" | "pl" | "ru" | "fr" | "uk" | "hu" | "fi" | "sv" | "nb" | "de" | "es"
            | "it" | "nl" | "pt" | "da" | "tr" | "id" => ',',
            _ => '.',
        }
    }

    pub fn grouping_separator(&self) -> char {
        match self.language.as_str() {
            "sk" | "cs" | "pl" | "ru" | "fr" | "uk" | "hu" | "fi" | "sv" | "nb" => '\u{a0}',
            "de" | "es" | "it" | "nl" | "pt" | "da" | "tr" | "id" => '.',
            _ => ',',
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}_{}", self.language, region),
            None => write!(f, "{}", self.language),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = StepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl std::str::FromStr for Locale {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

pub fn from_file<T: for<'de> Deserialize<'de> + Validate, P: AsRef<Path>>(
    path: P,
) -> StepResult<T> {
    let file = File::open(path)
        .map_err(|e| StepError::config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config: T = serde_json::from_reader(reader)
        .map_err(|e| StepError::config(format!("Failed to parse config file: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de> + Validate>(s: &str) -> StepResult<T> {
    let config: T = serde_json::from_str(s)
        .map_err(|e| StepError::config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

// Defaults
fn default_delimiter() -> String {
    r"\p{White_Space}+".to_string()
}
fn default_radix() -> u32 {
    10
}
fn default_source_description() -> String {
    "String".to_string()
}
