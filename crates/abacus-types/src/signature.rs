pub(crate) mod parser;

use itertools::Itertools;

use crate::{Error, TypeParameter, TypeTemplate};

/// Type signature for a function or operator.
#[derive(Debug, PartialEq, Eq)]
pub struct Signature {
    /// The name of the function.
    pub(super) name: String,
    /// Type and unit parameters to the function, if any.
    pub(super) type_parameters: Vec<TypeParameter>,
    /// Parameters to the function.
    pub parameters: Vec<Parameter>,
    pub result: TypeTemplate,
    /// If true, the last argument may be repeated 1 or more times.
    pub(super) variadic: bool,
}

impl<'a> serde::de::Deserialize<'a> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        deserializer.deserialize_str(SignatureDeserializer)
    }
}

struct SignatureDeserializer;

impl<'a> serde::de::Visitor<'a> for SignatureDeserializer {
    type Value = Signature;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a function signature")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Signature::parse(v).map_err(|e| E::custom(format!("{:?}", e)))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeTemplate,
}

impl Signature {
    pub fn parse(input: &str) -> error_stack::Result<Self, Error> {
        let signature = parser::parse_signature(input)?;
        signature.validate();
        Ok(signature)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        &self.type_parameters
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Panics if the signature is invalid.
    pub(crate) fn validate(&self) {
        // Unit parameters must be declared before they are used.
        #[cfg(debug_assertions)]
        {
            let declared: hashbrown::HashSet<String> = self
                .type_parameters
                .iter()
                .filter(|p| p.kind == crate::ParameterKind::Unit)
                .map(|p| format!("'{}", p.name))
                .collect();

            let mut mentioned = hashbrown::HashSet::new();
            self.parameters.iter().for_each(|p| {
                p.ty.add_names(&mut mentioned);
            });
            self.result.add_names(&mut mentioned);

            let mut undeclared: Vec<_> = mentioned
                .iter()
                .filter(|name| name.starts_with('\''))
                .filter(|name| !declared.contains(*name))
                .collect();
            undeclared.sort();
            assert!(
                undeclared.is_empty(),
                "Illegal signature '{}': undeclared unit parameters {undeclared:?}",
                self.name
            );
        }

        // The names must be unique within the signature.
        {
            let mut duplicate_names = self
                .parameters
                .iter()
                .map(|p| &p.name)
                .duplicates()
                .peekable();
            debug_assert!(
                duplicate_names.peek().is_none(),
                "Duplicate parameter names: {}",
                duplicate_names.format_with(", ", |n, f| f(&format_args!("'{n}'")))
            )
        }
    }

    /// Return an iterator over the parameters for a call with `length` arguments.
    ///
    /// This will repeat the last parameter if there are extra arguments and
    /// the signature is variadic.
    ///
    /// # Errors
    /// Fails if the number of arguments doesn't match the signature.
    pub fn iter_parameters(
        &self,
        length: usize,
    ) -> error_stack::Result<impl Iterator<Item = &'_ Parameter> + '_, Error> {
        let repetition = if self.variadic {
            error_stack::ensure!(
                self.parameters.len() <= length,
                Error::NotEnoughArguments {
                    expected: self.parameters.len(),
                    actual: length,
                }
            );
            length - self.parameters.len()
        } else {
            error_stack::ensure!(
                self.parameters.len() == length,
                Error::IncorrectArgumentCount {
                    expected: self.parameters.len(),
                    actual: length,
                }
            );
            0
        };

        let repetition = self
            .parameters
            .last()
            .into_iter()
            .cycle()
            .take(repetition);
        Ok(self.parameters.iter().chain(repetition))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.type_parameters.is_empty() {
            write!(f, "<{}>", self.type_parameters.iter().format(", "))?;
        }
        write!(
            f,
            "({}{}) -> {}",
            self.parameters
                .iter()
                .format_with(", ", |p, f| f(&format_args!("{}: {}", p.name, p.ty))),
            if self.variadic { "..." } else { "" },
            self.result
        )
    }
}
