//! Blocking interactive prompt
//!
//! `Console` asks a person a question and blocks until a line comes back.
//! `Greeting` is the smallest workflow that needs one: ask for a name,
//! answer with a greeting.

mod console;
mod greeting;

pub use console::*;
pub use greeting::*;
