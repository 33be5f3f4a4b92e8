use itertools::Itertools;

use crate::{Error, TypeClass, TypeClasses, Unit};

pub const NUMBER: &str = "Number";
pub const TEXT: &str = "Text";
pub const BOOLEAN: &str = "Boolean";
pub const LIST: &str = "List";
pub const FUNCTION: &str = "Function";

/// The closed set of date and time types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Temporal {
    Date,
    Time,
    DateTime,
    Duration,
}

impl Temporal {
    pub const ALL: [Temporal; 4] = [
        Temporal::Date,
        Temporal::Time,
        Temporal::DateTime,
        Temporal::Duration,
    ];

    /// The constructor name used for this temporal type.
    pub fn name(&self) -> &'static str {
        match self {
            Temporal::Date => "Date",
            Temporal::Time => "Time",
            Temporal::DateTime => "DateTime",
            Temporal::Duration => "Duration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|temporal| temporal.name() == name)
    }
}

/// The concrete runtime type of a value.
///
/// These contain no variables. They are produced by concretizing the result
/// of inference and consumed by the evaluation engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number(Unit),
    Text,
    Boolean,
    Temporal(Temporal),
    List(Box<ValueType>),
    /// A function from the argument type to the result type.
    Function(Box<ValueType>, Box<ValueType>),
    Record(RecordType),
    Tuple(Vec<ValueType>),
    /// An instance of a user-defined tagged type.
    Tagged { name: String, args: Vec<TypeArg> },
}

/// An argument to a tagged type, which is either a unit or a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeArg {
    Unit(Unit),
    Type(ValueType),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: ValueType,
}

/// The fields of a record, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordType {
    fields: Vec<Field>,
}

impl RecordType {
    /// Create a record type from the given fields.
    ///
    /// # Errors
    /// Fails if a field name appears more than once.
    pub fn try_new(
        fields: impl IntoIterator<Item = (String, ValueType)>,
    ) -> error_stack::Result<Self, Error> {
        let mut fields: Vec<_> = fields
            .into_iter()
            .map(|(name, ty)| Field { name, ty })
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(duplicate) = fields.iter().map(|field| &field.name).duplicates().next() {
            error_stack::bail!(Error::DuplicateField(duplicate.clone()));
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ValueType> {
        self.fields
            .binary_search_by(|field| field.name.as_str().cmp(name))
            .ok()
            .map(|index| &self.fields[index].ty)
    }
}

impl ValueType {
    pub fn dimensionless() -> Self {
        ValueType::Number(Unit::dimensionless())
    }

    pub fn list(item: ValueType) -> Self {
        ValueType::List(Box::new(item))
    }

    pub fn function(argument: ValueType, result: ValueType) -> Self {
        ValueType::Function(Box::new(argument), Box::new(result))
    }

    /// Create a record type from name, type pairs.
    ///
    /// # Errors
    /// Fails if a field name is repeated.
    pub fn record<'a>(
        fields: impl IntoIterator<Item = (&'a str, ValueType)>,
    ) -> error_stack::Result<Self, Error> {
        let record = RecordType::try_new(
            fields
                .into_iter()
                .map(|(name, ty)| (name.to_owned(), ty)),
        )?;
        Ok(ValueType::Record(record))
    }
}

/// The capabilities provided by a built-in constructor.
///
/// Returns `None` if the name is not a built-in constructor. Constructors with
/// type operands provide these capabilities only if their operands do.
pub fn builtin_type_classes(name: &str) -> Option<TypeClasses> {
    match name {
        NUMBER | TEXT | LIST => Some(TypeClasses::all()),
        BOOLEAN => Some(
            [
                TypeClass::Equatable,
                TypeClass::Readable,
                TypeClass::Showable,
            ]
            .into_iter()
            .collect(),
        ),
        FUNCTION => Some(TypeClasses::none()),
        other => Temporal::from_name(other).map(|_| TypeClasses::all()),
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Number(unit) if unit.is_dimensionless() => f.write_str(NUMBER),
            ValueType::Number(unit) => write!(f, "{NUMBER}[{unit}]"),
            ValueType::Text => f.write_str(TEXT),
            ValueType::Boolean => f.write_str(BOOLEAN),
            ValueType::Temporal(temporal) => f.write_str(temporal.name()),
            ValueType::List(item) => write!(f, "{LIST}<{item}>"),
            ValueType::Function(argument, result) => write!(f, "({argument} -> {result})"),
            ValueType::Record(record) => write!(
                f,
                "{{{}}}",
                record.fields().iter().format_with(", ", |field, f| {
                    f(&format_args!("{}: {}", field.name, field.ty))
                })
            ),
            ValueType::Tuple(elements) => write!(f, "({})", elements.iter().format(", ")),
            ValueType::Tagged { name, args } if args.is_empty() => f.write_str(name),
            ValueType::Tagged { name, args } => {
                write!(f, "{name}<{}>", args.iter().format(", "))
            }
        }
    }
}

impl std::fmt::Display for TypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeArg::Unit(unit) => write!(f, "[{unit}]"),
            TypeArg::Type(ty) => write!(f, "{ty}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let speed = Unit::base("m").multiply(&Unit::base("s").reciprocal());
        let record = ValueType::record([
            ("speed", ValueType::Number(speed.clone())),
            ("label", ValueType::Text),
        ])
        .unwrap();

        assert_eq!(record.to_string(), "{label: Text, speed: Number[m/s]}");
        assert_eq!(
            ValueType::list(ValueType::function(
                ValueType::dimensionless(),
                ValueType::Boolean
            ))
            .to_string(),
            "List<(Number -> Boolean)>"
        );
        assert_eq!(
            ValueType::Tagged {
                name: "Measured".to_owned(),
                args: vec![TypeArg::Unit(speed), TypeArg::Type(ValueType::Text)],
            }
            .to_string(),
            "Measured<[m/s], Text>"
        );
        assert_eq!(
            ValueType::Tuple(vec![ValueType::Temporal(Temporal::Date), ValueType::Text])
                .to_string(),
            "(Date, Text)"
        );
    }

    #[test]
    fn test_record_duplicate_fields() {
        let error = ValueType::record([("a", ValueType::Text), ("a", ValueType::Boolean)])
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &Error::DuplicateField("a".to_owned())
        );
    }

    #[test]
    fn test_record_get() {
        let record = RecordType::try_new([
            ("b".to_owned(), ValueType::Text),
            ("a".to_owned(), ValueType::Boolean),
        ])
        .unwrap();
        assert_eq!(record.get("a"), Some(&ValueType::Boolean));
        assert_eq!(record.get("c"), None);
        assert_eq!(record.fields()[0].name, "a");
    }

    #[test]
    fn test_builtin_type_classes() {
        assert_eq!(builtin_type_classes(FUNCTION), Some(TypeClasses::none()));
        assert_eq!(builtin_type_classes("DateTime"), Some(TypeClasses::all()));
        assert!(!builtin_type_classes(BOOLEAN)
            .unwrap()
            .contains(TypeClass::Comparable));
        assert_eq!(builtin_type_classes("Maybe"), None);
    }
}
