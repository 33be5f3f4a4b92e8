#[derive(derive_more::Display, Debug, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "invalid syntax: '{input}' at position {position}: {reason}")]
    InvalidSyntax {
        input: String,
        position: usize,
        reason: String,
    },
    #[display(fmt = "not enough arguments: expected {expected} but got {actual}")]
    NotEnoughArguments { expected: usize, actual: usize },
    #[display(fmt = "incorrect argument count: expected {expected} but got {actual}")]
    IncorrectArgumentCount { expected: usize, actual: usize },
    #[display(fmt = "duplicate field '{_0}' in record")]
    DuplicateField(String),
    #[display(fmt = "tagged type '{_0}' is already defined")]
    DuplicateTaggedType(String),
    #[display(fmt = "unit '{_0}' is not concrete")]
    UnitNotConcrete(String),
}

impl error_stack::Context for Error {}
