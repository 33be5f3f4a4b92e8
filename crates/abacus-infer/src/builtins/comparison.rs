use crate::builtins::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.register("eq<T: equatable>(lhs: T, rhs: T) -> boolean");
    registry.register("neq<T: equatable>(lhs: T, rhs: T) -> boolean");
    registry.register("lt<T: comparable>(lhs: T, rhs: T) -> boolean");
    registry.register("gt<T: comparable>(lhs: T, rhs: T) -> boolean");
    registry.register("lte<T: comparable>(lhs: T, rhs: T) -> boolean");
    registry.register("gte<T: comparable>(lhs: T, rhs: T) -> boolean");
    registry.register("min<T: comparable>(lhs: T, rhs: T) -> T");
    registry.register("max<T: comparable>(lhs: T, rhs: T) -> T");
}
