#![warn(
    rust_2018_idioms,
    nonstandard_style,
    future_incompatible,
    clippy::mod_module_files,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::undocumented_unsafe_blocks
)]

//! Concrete types, units of measure and type templates for Abacus formulas.
//!
//! The concrete [ValueType] is what the evaluation engine consumes once
//! inference has resolved every variable. Templates ([TypeTemplate]) describe
//! types that still mention parameters, and are used by tagged-type
//! definitions and function signatures. Inference itself lives in
//! `abacus-infer`.

mod error;
mod signature;
mod tagged;
mod template;
mod type_class;
mod unit;
mod value_type;

pub use error::*;
pub use signature::*;
pub use tagged::*;
pub use template::*;
pub use type_class::*;
pub use unit::*;
pub use value_type::*;
