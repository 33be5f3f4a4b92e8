use crate::builtins::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.register("add<'u>(lhs: number['u], rhs: number['u]) -> number['u]");
    registry.register("sub<'u>(lhs: number['u], rhs: number['u]) -> number['u]");
    registry.register("mul<'u, 'v>(lhs: number['u], rhs: number['v]) -> number['u*'v]");
    registry.register("div<'u, 'v>(lhs: number['u], rhs: number['v]) -> number['u/'v]");
    registry
        .register("neg<'u>(value: number['u]) -> number['u]")
        .set_operator();
    registry.register("abs<'u>(value: number['u]) -> number['u]");
    registry.register("sqrt<'u>(value: number['u^2]) -> number['u]");
    registry.register("round<'u>(value: number['u]) -> number['u]");
}
