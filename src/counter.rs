//! Infinite counter
//!
//! The same counter used two ways: as a plain generator (`Iterator`) that
//! only produces values, and as a workflow that can also be told where to
//! continue from each time it is resumed.

use std::convert::Infallible;

use crate::error::{Error, Result};
use crate::workflow::{Phase, Step, Workflow};

/// Counts upward from a starting value, one at a time, forever.
#[derive(Debug, Clone)]
pub struct Counter {
    /// Next value to hand out; `None` once `u64::MAX` has been produced
    next: Option<u64>,
    phase: Phase,
}

impl Counter {
    /// Create a counter whose first value is `start`
    pub fn new(start: u64) -> Self {
        Self {
            next: Some(start),
            phase: Phase::Fresh,
        }
    }

    fn advance(&mut self) {
        self.next = self.next.and_then(|n| n.checked_add(1));
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Iterator for Counter {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let value = self.next?;
        self.advance();
        Some(value)
    }
}

impl Workflow for Counter {
    /// The count the counter is paused on
    type Request = u64;

    /// `None` advances by one, `Some(n)` continues from `n`
    type Value = Option<u64>;

    type Output = Infallible;

    fn name(&self) -> &'static str {
        "counter"
    }

    fn start(&mut self) -> Result<Step<u64, Infallible>> {
        self.phase.begin(self.name())?;
        self.suspend_on_current()
    }

    fn resume(&mut self, value: Option<u64>) -> Result<Step<u64, Infallible>> {
        self.phase.ensure_suspended(self.name())?;
        match value {
            Some(jump) => self.next = Some(jump),
            None => self.advance(),
        }
        self.suspend_on_current()
    }

    fn is_finished(&self) -> bool {
        false
    }
}

impl Counter {
    fn suspend_on_current(&self) -> Result<Step<u64, Infallible>> {
        self.next
            .map(Step::Suspend)
            .ok_or_else(|| Error::Internal("counter overflowed u64".to_string()))
    }
}
