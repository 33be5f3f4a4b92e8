use crate::builtins::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.register("count<T>(list: list<T>) -> number");
    registry.register("first<T>(list: list<T>) -> T");
    registry.register("map<A, B>(list: list<A>, f: function<A, B>) -> list<B>");
    registry.register("filter<T>(list: list<T>, predicate: function<T, boolean>) -> list<T>");
    registry.register("contains<T: equatable>(list: list<T>, value: T) -> boolean");
    registry.register("sum<'u>(list: list<number['u]>) -> number['u]");
}
