//! Interceptor chain execution

use crate::{LogRecord, Result};
use std::sync::Arc;

/// Result of running (part of) a chain: `Some` when the record made it past
/// the last interceptor, `None` when an interceptor halted the chain.
pub type Outcome = Result<Option<LogRecord>>;

/// A unit of logic invoked for every record that reaches its phase.
///
/// An interceptor may read or change the subject, continue with
/// [`Chain::proceed`], substitute the subject with [`Chain::proceed_with`],
/// or return without proceeding, which halts the remaining chain.
pub trait Interceptor: Send + Sync + 'static {
    /// Handles one record.
    fn intercept(&self, chain: Chain<'_>) -> Outcome;
}

impl<F> Interceptor for F
where
    F: Fn(Chain<'_>) -> Outcome + Send + Sync + 'static,
{
    fn intercept(&self, chain: Chain<'_>) -> Outcome {
        self(chain)
    }
}

/// The subject plus the interceptors that have not run yet.
pub struct Chain<'a> {
    subject: LogRecord,
    rest: &'a [Arc<dyn Interceptor>],
}

impl<'a> Chain<'a> {
    pub(crate) const fn new(subject: LogRecord, rest: &'a [Arc<dyn Interceptor>]) -> Self {
        Self { subject, rest }
    }

    /// The record being processed.
    #[must_use]
    pub const fn subject(&self) -> &LogRecord {
        &self.subject
    }

    /// Mutable access to the record being processed.
    pub fn subject_mut(&mut self) -> &mut LogRecord {
        &mut self.subject
    }

    /// Number of interceptors after the current one.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Runs the next interceptor with the current subject.
    pub fn proceed(self) -> Outcome {
        let Self { subject, rest } = self;
        match rest.split_first() {
            Some((next, rest)) => next.intercept(Chain::new(subject, rest)),
            None => Ok(Some(subject)),
        }
    }

    /// Replaces the subject and runs the next interceptor with it.
    pub fn proceed_with(mut self, subject: LogRecord) -> Outcome {
        self.subject = subject;
        self.proceed()
    }

    /// Stops the chain; no later interceptor sees the record.
    #[allow(clippy::unnecessary_wraps)]
    pub fn finish(self) -> Outcome {
        Ok(None)
    }
}
