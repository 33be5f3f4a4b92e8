use std::borrow::Cow;

use abacus_types::TypeClasses;

use crate::{DiagnosticBuilder, DiagnosticCode, Location, NearestMatches};

/// Errors produced while unifying, instantiating or concretizing types.
///
/// Types are rendered to text when the error is created, since the graph
/// they were drawn from may change (or be dropped) before it is reported.
#[derive(derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[display(fmt = "type mismatch: expected {expected} but got {actual}")]
    Mismatch { expected: String, actual: String },
    #[display(fmt = "cyclic type: {variable} occurs in {ty}")]
    CyclicType { variable: String, ty: String },
    #[display(fmt = "field '{field}' occurs in one record but not the complete record {record}")]
    MissingField { field: String, record: String },
    #[display(fmt = "type {ty} is not {missing}")]
    MissingCapability { ty: String, missing: TypeClasses },
    #[display(fmt = "cannot determine type {ty}")]
    FreeVariable { ty: String },
    #[display(fmt = "unknown type constructor '{name}'")]
    UnknownConstructor { name: String },
    #[display(fmt = "tagged type '{tagged}' has no constructor '{constructor}'")]
    UnknownVariant { tagged: String, constructor: String },
    #[display(fmt = "type '{name}' expects {expected} type arguments but got {actual}")]
    WrongArity {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[display(
        fmt = "not enough arguments to '{function}': expected at least {expected} but got {actual}"
    )]
    NotEnoughArguments {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[display(fmt = "'{function}' expects {expected} arguments but got {actual}")]
    IncorrectArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[display(fmt = "expected a {expected} but got a {actual} in {context}")]
    KindMismatch {
        context: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[display(fmt = "unit mismatch: expected {expected} but got {actual}")]
    UnitMismatch { expected: String, actual: String },
    #[display(fmt = "unit unspecified: {unit}")]
    FreeUnitVariable { unit: String },
    #[display(fmt = "duplicate field '{field}' in record")]
    DuplicateField { field: String },
    #[display(fmt = "unbound reference '{name}'")]
    UnboundReference {
        name: String,
        candidates: NearestMatches<String>,
    },
    #[display(fmt = "undefined function '{name}'")]
    UndefinedFunction {
        name: String,
        candidates: NearestMatches<String>,
    },
    #[display(fmt = "internal error: {_0}")]
    Internal(Cow<'static, str>),
}

impl error_stack::Context for TypeError {}

impl TypeError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            TypeError::Mismatch { .. } => DiagnosticCode::TypeMismatch,
            TypeError::CyclicType { .. } => DiagnosticCode::CyclicType,
            TypeError::MissingField { .. } => DiagnosticCode::MissingField,
            TypeError::MissingCapability { .. } => DiagnosticCode::MissingCapability,
            TypeError::FreeVariable { .. } => DiagnosticCode::UndeterminedType,
            TypeError::UnknownConstructor { .. } => DiagnosticCode::UnknownTypeConstructor,
            TypeError::UnknownVariant { .. } => DiagnosticCode::UnknownVariant,
            TypeError::WrongArity { .. } => DiagnosticCode::WrongTypeArgumentCount,
            TypeError::NotEnoughArguments { .. } | TypeError::IncorrectArgumentCount { .. } => {
                DiagnosticCode::InvalidArguments
            }
            TypeError::KindMismatch { .. } => DiagnosticCode::KindMismatch,
            TypeError::UnitMismatch { .. } => DiagnosticCode::UnitMismatch,
            TypeError::FreeUnitVariable { .. } => DiagnosticCode::UnspecifiedUnit,
            TypeError::DuplicateField { .. } => DiagnosticCode::DuplicateFieldNames,
            TypeError::UnboundReference { .. } => DiagnosticCode::UnboundReference,
            TypeError::UndefinedFunction { .. } => DiagnosticCode::UndefinedFunction,
            TypeError::Internal(_) => DiagnosticCode::InternalError,
        }
    }

    /// Create a diagnostic reporting this error at the given location.
    pub fn diagnostic(&self, location: Location) -> DiagnosticBuilder {
        let builder = self
            .code()
            .builder()
            .with_label(location.primary_label().with_message(self.to_string()));

        match self {
            TypeError::UnboundReference { candidates, .. }
            | TypeError::UndefinedFunction { candidates, .. }
                if !candidates.is_empty() =>
            {
                builder.with_note(format!("Nearest matches: {candidates}"))
            }
            _ => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use abacus_types::TypeClass;

    use super::*;

    #[test]
    fn test_display() {
        insta::assert_display_snapshot!(TypeError::MissingCapability {
            ty: "(Number -> Text)".to_owned(),
            missing: [TypeClass::Equatable, TypeClass::Comparable].into_iter().collect(),
        }, @"type (Number -> Text) is not equatable + comparable");
        insta::assert_display_snapshot!(TypeError::KindMismatch {
            context: "argument 1 of 'Measured'".to_owned(),
            expected: "unit",
            actual: "type",
        }, @"expected a unit but got a type in argument 1 of 'Measured'");
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            TypeError::Internal("oops".into()).code(),
            DiagnosticCode::InternalError
        );
        assert_eq!(
            TypeError::IncorrectArgumentCount {
                function: "eq".to_owned(),
                expected: 2,
                actual: 3
            }
            .code()
            .code_str(),
            "E0109"
        );
    }
}
