//! Definition, collection and reporting of diagnostic messages.
//!
//! Diagnostics are messages to the user about the formulas they have written.
//! They are reported against locations within the formulas, with supporting
//! notes such as the expected and actual types.
//!
//! A message is created using the [DiagnosticBuilder] and then emitted to the
//! [DiagnosticCollector] which renders it against the formula sources.

mod builder;
mod code;
mod collector;

pub use builder::*;
pub use code::*;
pub use collector::*;
