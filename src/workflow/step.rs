//! Workflow steps and lifecycle tracking

use crate::error::{Error, Result};

/// Value returned each time a workflow is started or resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step<Request, Output> {
    /// The workflow is paused and needs a value for this request.
    Suspend(Request),

    /// The workflow ran to completion.
    Complete(Output),
}

/// A computation that pauses whenever it needs an externally supplied value.
///
/// `start` must be called exactly once, then `resume` once per
/// `Step::Suspend` until a `Step::Complete` is returned. Calling them out
/// of order yields a workflow error instead of a panic.
pub trait Workflow {
    /// What the workflow asks for when it suspends
    type Request;

    /// What a driver hands back on resume
    type Value;

    /// The finished result
    type Output;

    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Run until the first suspension point.
    fn start(&mut self) -> Result<Step<Self::Request, Self::Output>>;

    /// Supply the value for the pending request and run to the next step.
    fn resume(&mut self, value: Self::Value) -> Result<Step<Self::Request, Self::Output>>;

    /// Whether the workflow has returned its output
    fn is_finished(&self) -> bool;
}

/// Lifecycle of a workflow instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Created but never started
    #[default]
    Fresh,
    /// Waiting for a value
    Suspended,
    /// Output has been handed out
    Finished,
}

impl Phase {
    /// Transition for `Workflow::start`
    pub fn begin(&mut self, workflow: &'static str) -> Result<()> {
        match self {
            Phase::Fresh => {
                *self = Phase::Suspended;
                Ok(())
            }
            Phase::Suspended | Phase::Finished => Err(Error::WorkflowAlreadyStarted { workflow }),
        }
    }

    /// Check performed at the top of `Workflow::resume`
    pub fn ensure_suspended(&self, workflow: &'static str) -> Result<()> {
        match self {
            Phase::Suspended => Ok(()),
            Phase::Fresh => Err(Error::WorkflowNotStarted { workflow }),
            Phase::Finished => Err(Error::WorkflowFinished { workflow }),
        }
    }

    /// Mark the output as delivered
    pub fn finish(&mut self) {
        *self = Phase::Finished;
    }

    /// Whether the workflow is finished
    pub fn is_finished(&self) -> bool {
        *self == Phase::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_phase_lifecycle() {
        let mut phase = Phase::default();
        assert_eq!(
            phase.ensure_suspended("demo").unwrap_err().code(),
            ErrorCode::WorkflowNotStarted
        );

        phase.begin("demo").unwrap();
        assert!(phase.ensure_suspended("demo").is_ok());
        assert_eq!(
            phase.begin("demo").unwrap_err().code(),
            ErrorCode::WorkflowAlreadyStarted
        );

        phase.finish();
        assert!(phase.is_finished());
        assert_eq!(
            phase.ensure_suspended("demo").unwrap_err().code(),
            ErrorCode::WorkflowFinished
        );
    }
}
