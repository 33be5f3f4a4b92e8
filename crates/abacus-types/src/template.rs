use hashbrown::HashSet;
use itertools::Itertools;

use crate::signature::parser;
use crate::{write_unit_factors, Error, Temporal, TypeClasses, Unit};

/// Types that may mention type and unit parameters.
///
/// Templates appear in tagged-type definitions and function signatures. They
/// are instantiated into fresh type expressions at each use site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeTemplate {
    Number(UnitTemplate),
    Text,
    Boolean,
    Temporal(Temporal),
    List(Box<TypeTemplate>),
    Function(Box<TypeTemplate>, Box<TypeTemplate>),
    Record {
        fields: Vec<(String, TypeTemplate)>,
        /// If false, the record may contain additional fields.
        complete: bool,
    },
    Tuple(Vec<TypeTemplate>),
    /// A type parameter (if `args` is empty and the name is a parameter in
    /// scope) or a tagged type applied to `args`.
    Named {
        name: String,
        args: Vec<TemplateArg>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateArg {
    Unit(UnitTemplate),
    Type(TypeTemplate),
}

/// A product of base units and unit parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitTemplate(Vec<(UnitAtomTemplate, i32)>);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitAtomTemplate {
    Base(String),
    Param(String),
}

/// Whether a parameter ranges over types or units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Type,
    Unit,
}

/// A type or unit parameter of a signature or tagged type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub kind: ParameterKind,
    /// Capabilities required of the argument. Always empty for units.
    pub type_classes: TypeClasses,
}

impl TypeParameter {
    pub fn new_type(name: impl Into<String>, type_classes: TypeClasses) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Type,
            type_classes,
        }
    }

    pub fn new_unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Unit,
            type_classes: TypeClasses::none(),
        }
    }
}

impl std::fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ParameterKind::Unit => write!(f, "'{}", self.name),
            ParameterKind::Type if self.type_classes.is_empty() => f.write_str(&self.name),
            ParameterKind::Type => write!(f, "{}: {}", self.name, self.type_classes),
        }
    }
}

impl TypeTemplate {
    /// Parse a single type, such as `list<{x: number[m], ..}>`.
    pub fn parse(input: &str) -> error_stack::Result<Self, Error> {
        parser::parse_type(input)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeTemplate::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn dimensionless() -> Self {
        TypeTemplate::Number(UnitTemplate::default())
    }

    pub fn list(item: TypeTemplate) -> Self {
        TypeTemplate::List(Box::new(item))
    }

    pub fn function(argument: TypeTemplate, result: TypeTemplate) -> Self {
        TypeTemplate::Function(Box::new(argument), Box::new(result))
    }

    /// Collect the names this template refers to.
    ///
    /// This includes bare names (which may be type parameters) and unit
    /// parameters (prefixed with `'`).
    pub(crate) fn add_names(&self, names: &mut HashSet<String>) {
        match self {
            TypeTemplate::Number(unit) => unit.add_params(names),
            TypeTemplate::Text | TypeTemplate::Boolean | TypeTemplate::Temporal(_) => {}
            TypeTemplate::List(item) => item.add_names(names),
            TypeTemplate::Function(argument, result) => {
                argument.add_names(names);
                result.add_names(names);
            }
            TypeTemplate::Record { fields, .. } => {
                for (_, field) in fields {
                    field.add_names(names);
                }
            }
            TypeTemplate::Tuple(elements) => {
                for element in elements {
                    element.add_names(names);
                }
            }
            TypeTemplate::Named { name, args } => {
                if args.is_empty() {
                    names.insert(name.clone());
                }
                for arg in args {
                    match arg {
                        TemplateArg::Unit(unit) => unit.add_params(names),
                        TemplateArg::Type(ty) => ty.add_names(names),
                    }
                }
            }
        }
    }
}

impl UnitTemplate {
    /// Parse a unit expression such as `kg*m/s^2` or `'u/s`.
    pub fn parse(input: &str) -> error_stack::Result<Self, Error> {
        parser::parse_unit(input)
    }

    pub fn new(factors: Vec<(UnitAtomTemplate, i32)>) -> Self {
        Self(factors)
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self(vec![(UnitAtomTemplate::Param(name.into()), 1)])
    }

    pub fn factors(&self) -> &[(UnitAtomTemplate, i32)] {
        &self.0
    }

    /// Convert to a concrete unit.
    ///
    /// # Errors
    /// Fails if the template mentions unit parameters.
    pub fn to_concrete(&self) -> error_stack::Result<Unit, Error> {
        let mut unit = Unit::dimensionless();
        for (atom, exponent) in &self.0 {
            match atom {
                UnitAtomTemplate::Base(name) => unit.add_factor(name, *exponent),
                UnitAtomTemplate::Param(_) => {
                    error_stack::bail!(Error::UnitNotConcrete(self.to_string()))
                }
            }
        }
        Ok(unit)
    }

    fn add_params(&self, names: &mut HashSet<String>) {
        for (atom, _) in &self.0 {
            if let UnitAtomTemplate::Param(name) = atom {
                names.insert(format!("'{name}"));
            }
        }
    }
}

impl std::fmt::Display for UnitAtomTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitAtomTemplate::Base(name) => f.write_str(name),
            UnitAtomTemplate::Param(name) => write!(f, "'{name}"),
        }
    }
}

impl std::fmt::Display for UnitTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_unit_factors(f, self.0.iter().map(|(atom, exponent)| (atom, *exponent)))
    }
}

impl std::fmt::Display for TypeTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTemplate::Number(unit) if unit.0.is_empty() => f.write_str("number"),
            TypeTemplate::Number(unit) => write!(f, "number[{unit}]"),
            TypeTemplate::Text => f.write_str("text"),
            TypeTemplate::Boolean => f.write_str("boolean"),
            TypeTemplate::Temporal(temporal) => {
                f.write_str(&temporal.name().to_ascii_lowercase())
            }
            TypeTemplate::List(item) => write!(f, "list<{item}>"),
            TypeTemplate::Function(argument, result) => {
                write!(f, "function<{argument}, {result}>")
            }
            TypeTemplate::Record { fields, complete } => {
                let fields = fields.iter().format_with(", ", |(name, ty), f| {
                    f(&format_args!("{name}: {ty}"))
                });
                match (complete, self.is_empty_record()) {
                    (true, _) => write!(f, "{{{fields}}}"),
                    (false, true) => f.write_str("{..}"),
                    (false, false) => write!(f, "{{{fields}, ..}}"),
                }
            }
            TypeTemplate::Tuple(elements) => write!(f, "({})", elements.iter().format(", ")),
            TypeTemplate::Named { name, args } if args.is_empty() => f.write_str(name),
            TypeTemplate::Named { name, args } => write!(
                f,
                "{name}<{}>",
                args.iter().format_with(", ", |arg, f| match arg {
                    TemplateArg::Unit(unit) => f(&format_args!("[{unit}]")),
                    TemplateArg::Type(ty) => f(ty),
                })
            ),
        }
    }
}

impl TypeTemplate {
    fn is_empty_record(&self) -> bool {
        matches!(self, TypeTemplate::Record { fields, .. } if fields.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_parse() {
        for input in [
            "number",
            "number[kg*m/s^2]",
            "list<{x: number['u], ..}>",
            "function<(text, boolean), date>",
            "Measured<['u], T>",
            "{..}",
            "{a: datetime}",
        ] {
            let template = TypeTemplate::parse(input).unwrap();
            assert_eq!(template.to_string(), input);
        }
    }

    #[test]
    fn test_add_names() {
        let template = TypeTemplate::parse("function<T, Measured<['u], list<V>>>").unwrap();
        let mut names = HashSet::new();
        template.add_names(&mut names);

        let mut names: Vec<_> = names.into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["'u", "T", "V"]);
    }

    #[test]
    fn test_unit_to_concrete() {
        let unit = UnitTemplate::parse("m/s").unwrap();
        assert_eq!(unit.to_concrete().unwrap().to_string(), "m/s");

        let error = UnitTemplate::parse("'u/s")
            .unwrap()
            .to_concrete()
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &Error::UnitNotConcrete("'u/s".to_owned())
        );
    }
}
