//! Signatures of the built-in functions.

mod builtin;
mod collection;
mod comparison;
mod general;
mod logical;
mod math;
mod registry;

pub use builtin::*;
pub use registry::*;

/// Register all the built-in functions.
fn register_builtins(registry: &mut Registry) {
    collection::register(registry);
    comparison::register(registry);
    general::register(registry);
    logical::register(registry);
    math::register(registry);
}
