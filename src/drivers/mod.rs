//! Drivers for the enrollment workflow
//!
//! The same `Enrollment` is resumed by a person at a console or by the
//! cells of a CSV row.

mod console;
mod import;
mod row;

pub use import::*;
pub use row::*;
