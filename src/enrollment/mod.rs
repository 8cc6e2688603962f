//! Enrollment workflow
//!
//! Collects the fields of a new user in a fixed order and hands back a
//! validated `User`. What is asked for, and in which order, lives here;
//! how the answers are obtained is up to the driver.

mod field;
mod flow;
mod user;

pub use field::*;
pub use flow::*;
pub use user::*;
