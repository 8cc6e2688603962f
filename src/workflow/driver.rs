//! Drivers resume suspended workflows with values from some source

use tracing::{debug, trace};

use super::{Step, Workflow};
use crate::error::Result;

/// Source of the values a workflow asks for.
pub trait Driver<Request, Value> {
    /// Obtain the value for one request.
    fn supply(&mut self, request: &Request) -> Result<Value>;
}

/// Run a workflow to completion, asking `driver` for every requested value.
///
/// A driver error aborts the run and is returned unchanged. Workflows that
/// never complete (like the counter) must not be passed here.
pub fn drive<W, D>(workflow: &mut W, driver: &mut D) -> Result<W::Output>
where
    W: Workflow,
    D: Driver<W::Request, W::Value> + ?Sized,
{
    let mut step = workflow.start()?;
    let mut resumes: u64 = 0;

    loop {
        match step {
            Step::Suspend(request) => {
                let value = driver.supply(&request)?;
                step = workflow.resume(value)?;
                resumes += 1;
                trace!(workflow = workflow.name(), resumes, "Workflow resumed");
            }
            Step::Complete(output) => {
                debug!(workflow = workflow.name(), resumes, "Workflow completed");
                return Ok(output);
            }
        }
    }
}

/// Driver that hands out a fixed sequence of values in order.
///
/// Running out of values before the workflow completes is `InputClosed`.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct Scripted<I> {
    values: I,
}

#[cfg(test)]
impl<I> Scripted<I> {
    /// Create a driver over the given values
    pub fn new<T>(values: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            values: values.into_iter(),
        }
    }
}

#[cfg(test)]
impl<R, V, I> Driver<R, V> for Scripted<I>
where
    R: std::fmt::Display,
    I: Iterator<Item = V>,
{
    fn supply(&mut self, request: &R) -> Result<V> {
        self.values.next().ok_or_else(|| crate::error::Error::InputClosed {
            waiting_for: request.to_string(),
        })
    }
}
