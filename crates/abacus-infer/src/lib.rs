#![warn(
    rust_2018_idioms,
    nonstandard_style,
    future_incompatible,
    clippy::mod_module_files,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::undocumented_unsafe_blocks
)]

//! Unification-based type inference for Abacus formulas.
//!
//! Each inference pass owns a [TypeGraph]. Sub-expressions are assigned type
//! expressions (often fresh variables) which are unified as the expression
//! tree is walked. Once the tree has been visited, every type expression is
//! pruned and converted to the concrete [abacus_types::ValueType] used by the
//! evaluation engine, or reported as a diagnostic.
//!
//! The graph supports:
//!
//! - applied constructors (`Number[m/s]`, `List<T>`, tagged types),
//! - structural records which may be incomplete (row polymorphism),
//! - fixed-arity tuples,
//! - capability ("type class") requirements on variables, and
//! - units of measure with unit variables.

mod builtins;
mod check;
mod diagnostics;
mod error;
mod graph;
mod instantiate;
mod location;
mod nearest_matches;
mod options;
mod units;

pub use builtins::*;
pub use check::*;
pub use diagnostics::*;
pub use error::*;
pub use graph::*;
pub use instantiate::*;
pub use location::*;
pub use nearest_matches::*;
pub use options::*;
pub use units::*;
