//! # Step Session
//!
//! [`StepScanner`] is what the learner's code holds. It looks like an ordinary
//! scanner, but every probe and every consume first captures a
//! [`SessionSnapshot`] of the state *before* the call, publishes it through the
//! [`StepGate`] and waits for the observer's permission. Only then does the
//! call reach the underlying [`Tokenizer`].
//!
//! ```text
//! learner code ─▶ StepScanner::has_next_int
//!                   ├─ SessionSnapshot::capture   (probes, optional spans)
//!                   ├─ StepGate::pause_and_publish ─▶ Observer::on_snapshot
//!                   │        … blocked until ObserverHandle::release …
//!                   └─ Tokenizer::probe            ─▶ result to learner code
//! ```
//!
//! Errors from the tokenizer (e.g. [`StepError::NoMoreInput`]) reach the
//! learner unchanged. Reconfiguration calls do not pause.

use std::sync::Arc;

use tracing::debug;

use crate::{
    config::{Locale, ScannerConfig, SessionConfig},
    gate::StepGate,
    observer::{Observer, ObserverHandle},
    scanner::{ProbeKind, Tokenizer},
    snapshot::{Operation, SessionSnapshot},
    StepError, StepResult,
};

pub struct StepScanner {
    tokenizer: Tokenizer,
    source_description: String,
    gate: Arc<StepGate>,
    observer: Arc<dyn Observer>,
}

impl std::fmt::Debug for StepScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepScanner")
            .field("tokenizer", &self.tokenizer)
            .field("source_description", &self.source_description)
            .field("gate", &self.gate)
            .field("steps", &self.steps())
            .finish_non_exhaustive()
    }
}

impl StepScanner {
    pub fn new(
        tokenizer: Tokenizer,
        source_description: impl Into<String>,
        observer: Arc<dyn Observer>,
    ) -> (Self, ObserverHandle) {
        let gate = Arc::new(StepGate::new());
        let handle = ObserverHandle::new(gate.clone());
        let scanner = Self {
            tokenizer,
            source_description: source_description.into(),
            gate,
            observer,
        };
        (scanner, handle)
    }

    pub fn from_config(
        input: impl Into<String>,
        config: &SessionConfig,
        observer: Arc<dyn Observer>,
    ) -> StepResult<(Self, ObserverHandle)> {
        let tokenizer = Tokenizer::from_session_config(input, config)?;
        Ok(Self::new(
            tokenizer,
            config.source_description.clone(),
            observer,
        ))
    }

    /// Another handle on this session's gate.
    pub fn handle(&self) -> ObserverHandle {
        ObserverHandle::new(self.gate.clone())
    }

    /// Read-only view of the wrapped tokenizer; reading it never pauses.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Number of guarded calls whose snapshot reached the observer.
    pub fn steps(&self) -> u64 {
        self.gate.pause_count()
    }

    /// Publishes the pre-call state and waits for the observer.
    fn pause(&mut self, operation: Operation) -> StepResult<()> {
        if self.gate.is_cancelled() {
            return Err(StepError::SessionCancelled);
        }
        let step = self.steps() + 1;
        let snapshot = SessionSnapshot::capture(
            &self.tokenizer,
            step,
            &self.source_description,
            Some(operation),
            self.observer.wants_highlighting(),
        )?;
        debug!(step, %operation, "pausing before operation");
        self.gate.pause_and_publish(snapshot, self.observer.as_ref())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn probe(&mut self, kind: ProbeKind) -> StepResult<bool> {
        self.pause(Operation::Probe(kind))?;
        Ok(self.tokenizer.probe(kind))
    }

    pub fn has_next(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Generic)
    }

    pub fn has_next_byte(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Byte)
    }

    pub fn has_next_short(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Short)
    }

    pub fn has_next_int(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Int)
    }

    pub fn has_next_long(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Long)
    }

    pub fn has_next_float(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Float)
    }

    pub fn has_next_double(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Double)
    }

    pub fn has_next_big_integer(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::BigInteger)
    }

    pub fn has_next_big_decimal(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::BigDecimal)
    }

    pub fn has_next_boolean(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Boolean)
    }

    pub fn has_next_line(&mut self) -> StepResult<bool> {
        self.probe(ProbeKind::Line)
    }

    #[allow(clippy::should_implement_trait)]
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn next(&mut self) -> StepResult<String> {
        self.pause(Operation::Next)?;
        self.tokenizer.consume_next()
    }

    pub fn next_line(&mut self) -> StepResult<String> {
        self.pause(Operation::NextLine)?;
        self.tokenizer.consume_line()
    }

    pub fn next_int(&mut self) -> StepResult<i32> {
        self.pause(Operation::NextInt)?;
        self.tokenizer.consume_int()
    }

    pub fn next_long(&mut self) -> StepResult<i64> {
        self.pause(Operation::NextLong)?;
        self.tokenizer.consume_long()
    }

    pub fn next_double(&mut self) -> StepResult<f64> {
        self.pause(Operation::NextDouble)?;
        self.tokenizer.consume_double()
    }

    pub fn next_boolean(&mut self) -> StepResult<bool> {
        self.pause(Operation::NextBoolean)?;
        self.tokenizer.consume_boolean()
    }

    pub fn use_delimiter(&mut self, delimiter: &str) -> StepResult<()> {
        self.tokenizer.use_delimiter(delimiter)
    }

    pub fn use_radix(&mut self, radix: u32) -> StepResult<()> {
        self.tokenizer.use_radix(radix)
    }

    pub fn use_locale(&mut self, locale: Locale) -> StepResult<()> {
        self.tokenizer.use_locale(locale)
    }

    pub fn use_config(&mut self, config: ScannerConfig) -> StepResult<()> {
        self.tokenizer.use_config(config)
    }

    /// Publishes a last snapshot with nothing pending. Does not block.
    pub fn finish(&self) -> StepResult<()> {
        if self.gate.is_cancelled() {
            return Err(StepError::SessionCancelled);
        }
        let steps = self.steps();
        let snapshot = SessionSnapshot::capture(
            &self.tokenizer,
            steps,
            &self.source_description,
            None,
            self.observer.wants_highlighting(),
        )?;
        debug!(steps, "session finished");
        self.observer.on_snapshot(snapshot);
        Ok(())
    }

    /// Runs `learner` on tokio's blocking pool and publishes the final snapshot
    /// once it returns successfully.
    pub fn spawn<T, F>(mut self, learner: F) -> tokio::task::JoinHandle<StepResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut StepScanner) -> StepResult<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(move || {
            let value = learner(&mut self)?;
            self.finish()?;
            Ok(value)
        })
    }
}
