use crate::builtins::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.register("show<T: showable>(value: T) -> text");
    registry.register("read<T: readable>(value: text) -> T");
    registry.register("concat(first: text, rest: text...) -> text");
    registry.register("length(value: text) -> number");
    registry.register("apply<A, B>(f: function<A, B>, argument: A) -> B");
    registry.register("duration_between(start: datetime, end: datetime) -> duration");
    registry.register("date_of(value: datetime) -> date");
    registry.register("time_of(value: datetime) -> time");
}
