//! Define the diagnostic codes and associated messages.
//!
//! Each diagnostic code is associated with a code string, a severity and a
//! message. The specific problem is described by the labels and notes added
//! through the [super::DiagnosticBuilder].

use crate::diagnostics::DiagnosticBuilder;

/// Macro for registering the diagnostic codes.
macro_rules! register_diagnostics {
    ( $($name:ident ( $code:ident, $severity:ident, $message:expr ), )* ) => (
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DiagnosticCode {
            $( $name ),*
        }

        impl DiagnosticCode {
            pub fn code_str(&self) -> &'static str {
                match &self {
                    $( Self::$name => stringify!($code) ),*
                }
            }

            pub fn message(&self) -> &'static str {
                match &self {
                    $( Self::$name => $message ),*
                }
            }

            pub fn severity(&self) -> codespan_reporting::diagnostic::Severity {
                match &self {
                    $( Self::$name => codespan_reporting::diagnostic::Severity::$severity ),*
                }
            }
        }
    );
}

register_diagnostics! {
// Errors: 0100 - 0199
TypeMismatch(E0101, Error, "Type mismatch"),
CyclicType(E0102, Error, "Cyclic type"),
MissingField(E0103, Error, "Field missing from complete record"),
MissingCapability(E0104, Error, "Missing capability"),
UndeterminedType(E0105, Error, "Cannot determine type"),
UnknownTypeConstructor(E0106, Error, "Unknown type constructor"),
UnknownVariant(E0107, Error, "Unknown constructor of tagged type"),
WrongTypeArgumentCount(E0108, Error, "Wrong number of type arguments"),
InvalidArguments(E0109, Error, "Invalid arguments"),
KindMismatch(E0110, Error, "Unit and type arguments confused"),
UnitMismatch(E0111, Error, "Incompatible units"),
UnspecifiedUnit(E0112, Error, "Unit unspecified"),
DuplicateFieldNames(E0113, Error, "Duplicate field names in record expression"),
UnboundReference(E0114, Error, "Unbound reference"),
UndefinedFunction(E0115, Error, "Undefined function"),

// Bugs: 1000 - 1999
InternalError(B1000, Bug, "Internal error"),
FailedToReport(B1001, Bug, "Failed to report diagnostic"),
}

impl DiagnosticCode {
    pub fn builder(self) -> DiagnosticBuilder {
        DiagnosticBuilder::new(self, self.severity())
    }
}

#[test]
fn test_code() {
    assert_eq!(DiagnosticCode::UnitMismatch.code_str(), "E0111");
    assert_eq!(DiagnosticCode::UnitMismatch.message(), "Incompatible units");
    assert_eq!(
        DiagnosticCode::FailedToReport.severity(),
        codespan_reporting::diagnostic::Severity::Bug
    );
}
