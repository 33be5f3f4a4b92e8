use crate::builtins::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.register("and(lhs: boolean, rhs: boolean) -> boolean");
    registry.register("or(lhs: boolean, rhs: boolean) -> boolean");
    registry.register("not(value: boolean) -> boolean");
    registry.register("if<T>(condition: boolean, then: T, otherwise: T) -> T");
}
