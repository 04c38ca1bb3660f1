//! # stepscan: Step-by-Step Scanner Visualization
//!
//! stepscan lets a learner watch how a text scanner answers successive
//! "is there another token of type X?" probes and "give me the next token"
//! calls. The learner's code drives the scanner as usual; every call is
//! paused, the scanner's state is published to an observer, and the call only
//! runs once the observer says so.
//!
//! ## Processing Pipeline
//!
//! ```text
//! learner code → StepScanner → SessionSnapshot → StepGate → Observer
//!                     ↑                                        │
//!                     └──────────── ObserverHandle::release ◀──┘
//! ```
//!
//! ### Scanner
//!
//! The [`scanner`] module holds the tokenizing primitive: a cursor over the
//! input, a delimiter pattern, a radix and a locale, plus the value grammars
//! behind the eleven probes.
//!
//! ### Span Indexing
//!
//! The [`span`] module recomputes the position of every token in the
//! remaining buffer so a display can highlight them.
//!
//! ### Snapshots and the Gate
//!
//! A [`snapshot::SessionSnapshot`] is an immutable picture of the scanner
//! taken before each call. The [`gate::StepGate`] publishes it and blocks the
//! worker thread until released or cancelled.
//!
//! ### Observer Port
//!
//! The [`observer`] module is the only surface a display needs: snapshots come
//! in through [`observer::Observer`], release and cancel go out through
//! [`observer::ObserverHandle`].
//!
//! ## Threads
//!
//! One worker thread runs the learner's code and is the only thread that ever
//! blocks. Observers run on any thread and never wait on the gate.

pub mod config;
pub mod display;
pub mod error;
pub mod gate;
pub mod observer;
pub mod scanner;
pub mod session;
pub mod snapshot;
pub mod span;

// Re-exports
pub use config::{Locale, ScannerConfig, SessionConfig};
pub use error::*;
pub use gate::{GateState, StepGate};
pub use observer::{ChannelObserver, Observer, ObserverHandle};
pub use scanner::{ProbeKind, ProbeResults, Tokenizer};
pub use session::StepScanner;
pub use snapshot::{Operation, SessionSnapshot};
pub use span::{index_remaining, index_spans, segments, Segment, SegmentKind, TokenSpan};
