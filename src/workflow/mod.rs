//! Suspend/resume workflow protocol
//!
//! A workflow is an explicit state machine that either asks for a value
//! (`Step::Suspend`) or hands back its finished output (`Step::Complete`).
//! It never performs input/output itself; a `Driver` decides where each
//! requested value comes from.

mod driver;
mod step;

pub use driver::*;
pub use step::*;
