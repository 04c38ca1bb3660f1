//! # Scanner Component
//!
//! The scanner is the tokenizing primitive the learner's code drives: it keeps a
//! cursor over the input text, splits it into tokens with a configurable
//! delimiter pattern and answers `hasNext…`-style probes about the next token.
//!
//! ## Component Structure
//!
//! * [`probe`]: the closed set of probe kinds and their collected results
//! * [`grammar`]: value grammars compiled from a [`ScannerConfig`](crate::config::ScannerConfig)
//! * [`tokenizer`]: the cursor, probes, consumes and reconfiguration
//!
//! The scanner knows nothing about pausing; [`StepScanner`](crate::session::StepScanner)
//! wraps it for that.

pub mod grammar;
pub mod probe;
pub mod tokenizer;

pub use grammar::Grammar;
pub use probe::{ProbeKind, ProbeResults};
pub use tokenizer::Tokenizer;
