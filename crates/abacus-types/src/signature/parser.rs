use std::str::FromStr;

use crate::signature::{Parameter, Signature};
use crate::{
    ConstructorDef, Error, TaggedTypeDef, Temporal, TemplateArg, TypeClass, TypeClasses,
    TypeParameter, TypeTemplate, UnitAtomTemplate, UnitTemplate,
};

pub(crate) fn parse_signature(input: &str) -> error_stack::Result<Signature, Error> {
    let mut parser = Parser::new(input);
    let signature = parser.parse_signature()?;
    parser.finish(true)?;
    Ok(signature)
}

pub(crate) fn parse_type(input: &str) -> error_stack::Result<TypeTemplate, Error> {
    let mut parser = Parser::new(input);
    let ty = parser.parse_type()?;
    parser.finish(true)?;
    Ok(ty)
}

pub(crate) fn parse_unit(input: &str) -> error_stack::Result<UnitTemplate, Error> {
    let mut parser = Parser::new(input);
    let unit = parser.parse_unit()?;
    parser.finish(true)?;
    Ok(unit)
}

pub(crate) fn parse_tagged_type(input: &str) -> error_stack::Result<TaggedTypeDef, Error> {
    let mut parser = Parser::new(input);
    let definition = parser.parse_tagged_type()?;
    parser.finish(true)?;
    Ok(definition)
}

struct Parser<'a> {
    str: &'a str,
    location: usize,
}

#[static_init::dynamic]
static IDENTIFIER: regex::Regex = regex::Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*").unwrap();

#[static_init::dynamic]
static INTEGER: regex::Regex = regex::Regex::new(r"^-?[0-9]+").unwrap();

#[static_init::dynamic]
static WHITESPACE: regex::Regex = regex::Regex::new(r"^\s+").unwrap();

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        let mut parser = Self {
            str: s,
            location: 0,
        };
        parser.consume_white_space();
        parser
    }

    fn is_eof(&self) -> bool {
        self.location == self.str.len()
    }

    fn finish(self, require_eof: bool) -> error_stack::Result<(), Error> {
        error_stack::ensure!(
            !require_eof || self.is_eof(),
            self.error("unexpected characters at end of input")
        );
        Ok(())
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::InvalidSyntax {
            input: self.str.to_string(),
            position: self.location,
            reason: reason.into(),
        }
    }

    fn identifier(&mut self) -> error_stack::Result<&'a str, Error> {
        let input = self.str;
        let identifier = IDENTIFIER
            .find(&input[self.location..])
            .map(|m| {
                self.location += m.len();
                m.as_str()
            })
            .ok_or_else(|| error_stack::report!(self.error("missing identifier")))?;
        self.consume_white_space();
        Ok(identifier)
    }

    fn integer(&mut self) -> error_stack::Result<i32, Error> {
        let input = self.str;
        let Some(m) = INTEGER.find(&input[self.location..]) else {
            error_stack::bail!(self.error("missing integer"))
        };
        let Ok(value) = m.as_str().parse::<i32>() else {
            error_stack::bail!(self.error("integer out of range"))
        };
        self.location += m.len();
        self.consume_white_space();
        Ok(value)
    }

    fn consume_white_space(&mut self) -> bool {
        let whitespace = WHITESPACE.find(&self.str[self.location..]);
        match whitespace {
            Some(m) => {
                self.location += m.len();
                true
            }
            None => false,
        }
    }

    fn consume(&mut self, p: &'static str) -> error_stack::Result<(), Error> {
        error_stack::ensure!(self.try_consume(p), self.error(format!("expected '{}'", p)));
        Ok(())
    }

    /// Tries to consume `p` and returns true if successful.
    #[must_use]
    fn try_consume(&mut self, p: &'static str) -> bool {
        if self.peek().starts_with(p) {
            self.location += p.len();
            self.consume_white_space();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> &str {
        &self.str[self.location..]
    }

    fn parse_signature(&mut self) -> error_stack::Result<Signature, Error> {
        let name = self.identifier()?.to_owned();
        let type_parameters = self.parse_type_parameters()?;
        let (parameters, variadic) = self.parse_parameters()?;
        self.consume("->")?;
        let result = self.parse_type()?;

        Ok(Signature {
            name,
            type_parameters,
            parameters,
            result,
            variadic,
        })
    }

    fn parse_tagged_type(&mut self) -> error_stack::Result<TaggedTypeDef, Error> {
        let name = self.identifier()?.to_owned();
        let parameters = self.parse_type_parameters()?;
        let derives = if self.try_consume("deriving") {
            self.parse_type_class_list()?
        } else {
            TypeClasses::none()
        };
        self.consume("=")?;

        let mut constructors = Vec::new();
        loop {
            let constructor = self.identifier()?.to_owned();
            let mut arguments = Vec::new();
            if self.try_consume("(") {
                loop {
                    arguments.push(self.parse_type()?);
                    if self.try_consume(")") {
                        break;
                    }
                    self.consume(",")?;
                }
            }
            constructors.push(ConstructorDef {
                name: constructor,
                arguments,
            });

            if !self.try_consume("|") {
                break;
            }
        }

        Ok(TaggedTypeDef::from_parts(
            name,
            parameters,
            derives,
            constructors,
        ))
    }

    fn parse_parameters(&mut self) -> error_stack::Result<(Vec<Parameter>, bool), Error> {
        self.consume("(")?;
        let mut parameters = Vec::new();
        let mut variadic = false;
        if self.try_consume(")") {
            return Ok((parameters, variadic));
        }
        loop {
            let name = self.identifier()?;
            self.consume(":")?;
            let ty = self.parse_type()?;
            parameters.push(Parameter {
                name: name.to_string(),
                ty,
            });

            if self.try_consume(")") {
                break;
            }
            if self.try_consume("...") {
                variadic = true;
                self.consume(")")?;
                break;
            }
            self.consume(",")?;
        }
        Ok((parameters, variadic))
    }

    fn parse_type_parameters(&mut self) -> error_stack::Result<Vec<TypeParameter>, Error> {
        if !self.try_consume("<") {
            return Ok(Vec::new());
        }

        let mut type_parameters = Vec::new();
        loop {
            if self.try_consume("'") {
                let name = self.identifier()?;
                type_parameters.push(TypeParameter::new_unit(name));
            } else {
                let name = self.identifier()?;
                let type_classes = if self.try_consume(":") {
                    self.parse_type_class_list()?
                } else {
                    TypeClasses::none()
                };
                type_parameters.push(TypeParameter::new_type(name, type_classes));
            }

            if self.try_consume(">") {
                break;
            }
            self.consume(",")?;
        }

        Ok(type_parameters)
    }

    fn parse_type_class(&mut self) -> error_stack::Result<TypeClass, Error> {
        let position = self.location;
        let type_class = self.identifier()?;
        let type_class = TypeClass::from_str(type_class).map_err(|_| Error::InvalidSyntax {
            input: self.str.to_owned(),
            position,
            reason: format!("invalid type class '{type_class}'"),
        })?;
        Ok(type_class)
    }

    fn parse_type_class_list(&mut self) -> error_stack::Result<TypeClasses, Error> {
        let mut type_classes = TypeClasses::from(self.parse_type_class()?);
        while self.try_consume("+") {
            type_classes = type_classes.with(self.parse_type_class()?);
        }
        Ok(type_classes)
    }

    fn parse_type(&mut self) -> error_stack::Result<TypeTemplate, Error> {
        if self.try_consume("{") {
            return self.parse_record();
        }
        if self.try_consume("(") {
            return self.parse_tuple();
        }

        let ident = self.identifier()?;
        match ident {
            "number" => {
                if self.try_consume("[") {
                    let unit = self.parse_unit()?;
                    self.consume("]")?;
                    Ok(TypeTemplate::Number(unit))
                } else {
                    Ok(TypeTemplate::dimensionless())
                }
            }
            "text" => Ok(TypeTemplate::Text),
            "boolean" => Ok(TypeTemplate::Boolean),
            "date" => Ok(TypeTemplate::Temporal(Temporal::Date)),
            "time" => Ok(TypeTemplate::Temporal(Temporal::Time)),
            "datetime" => Ok(TypeTemplate::Temporal(Temporal::DateTime)),
            "duration" => Ok(TypeTemplate::Temporal(Temporal::Duration)),
            "list" => {
                self.consume("<")?;
                let item = self.parse_type()?;
                self.consume(">")?;
                Ok(TypeTemplate::list(item))
            }
            "function" => {
                self.consume("<")?;
                let argument = self.parse_type()?;
                self.consume(",")?;
                let result = self.parse_type()?;
                self.consume(">")?;
                Ok(TypeTemplate::function(argument, result))
            }
            name => {
                let args = if self.try_consume("<") {
                    self.parse_template_args()?
                } else {
                    Vec::new()
                };
                Ok(TypeTemplate::Named {
                    name: name.to_owned(),
                    args,
                })
            }
        }
    }

    fn parse_record(&mut self) -> error_stack::Result<TypeTemplate, Error> {
        let mut fields = Vec::new();
        let mut complete = true;
        loop {
            if self.try_consume("..") {
                complete = false;
                self.consume("}")?;
                break;
            }
            if self.try_consume("}") {
                break;
            }

            let name = self.identifier()?;
            self.consume(":")?;
            let ty = self.parse_type()?;
            fields.push((name.to_owned(), ty));

            if self.try_consume("}") {
                break;
            }
            self.consume(",")?;
        }
        Ok(TypeTemplate::Record { fields, complete })
    }

    fn parse_tuple(&mut self) -> error_stack::Result<TypeTemplate, Error> {
        let mut elements = Vec::new();
        if self.try_consume(")") {
            return Ok(TypeTemplate::Tuple(elements));
        }
        loop {
            elements.push(self.parse_type()?);
            if self.try_consume(")") {
                break;
            }
            self.consume(",")?;
        }

        // A single parenthesized type is just grouping.
        if elements.len() == 1 {
            Ok(elements.remove(0))
        } else {
            Ok(TypeTemplate::Tuple(elements))
        }
    }

    fn parse_template_args(&mut self) -> error_stack::Result<Vec<TemplateArg>, Error> {
        let mut args = Vec::new();
        loop {
            if self.try_consume("[") {
                let unit = self.parse_unit()?;
                self.consume("]")?;
                args.push(TemplateArg::Unit(unit));
            } else {
                args.push(TemplateArg::Type(self.parse_type()?));
            }

            if self.try_consume(">") {
                break;
            }
            self.consume(",")?;
        }
        Ok(args)
    }

    fn parse_unit(&mut self) -> error_stack::Result<UnitTemplate, Error> {
        let mut factors = Vec::new();
        // `1` is only meaningful as the numerator of a quotient, such as `1/s`.
        if !self.try_consume("1") {
            factors.push(self.parse_unit_factor(1)?);
        }
        loop {
            if self.try_consume("*") {
                factors.push(self.parse_unit_factor(1)?);
            } else if self.try_consume("/") {
                factors.push(self.parse_unit_factor(-1)?);
            } else {
                break;
            }
        }
        Ok(UnitTemplate::new(factors))
    }

    fn parse_unit_factor(
        &mut self,
        sign: i32,
    ) -> error_stack::Result<(UnitAtomTemplate, i32), Error> {
        let atom = if self.try_consume("'") {
            UnitAtomTemplate::Param(self.identifier()?.to_owned())
        } else {
            UnitAtomTemplate::Base(self.identifier()?.to_owned())
        };
        let exponent = if self.try_consume("^") {
            self.integer()?
        } else {
            1
        };
        Ok((atom, sign * exponent))
    }
}

#[cfg(test)]
mod tests {
    use crate::signature::parser;
    use crate::{
        Error, Parameter, Signature, TemplateArg, TypeClass, TypeClasses, TypeParameter,
        TypeTemplate, UnitAtomTemplate, UnitTemplate,
    };

    #[test]
    fn test_identifier() {
        let mut parser = super::Parser::new("foo  bar baz number list");
        assert_eq!(parser.identifier().unwrap(), "foo");
        assert_eq!(parser.location, 5);

        assert_eq!(parser.identifier().unwrap(), "bar");
        assert_eq!(parser.location, 9);

        assert_eq!(parser.identifier().unwrap(), "baz");
        assert_eq!(parser.identifier().unwrap(), "number");
        assert_eq!(parser.identifier().unwrap(), "list");
    }

    #[test]
    fn test_identifier_fail() {
        let mut parser = super::Parser::new("+  foo");
        assert!(parser.identifier().is_err());
    }

    #[test]
    fn test_parse_signature_simple() {
        assert_eq!(
            parser::parse_signature("length(a: text) -> number").unwrap(),
            Signature {
                name: "length".to_owned(),
                type_parameters: vec![],
                parameters: vec![Parameter {
                    name: "a".to_string(),
                    ty: TypeTemplate::Text,
                }],
                result: TypeTemplate::dimensionless(),
                variadic: false,
            }
        );
    }

    #[test]
    fn test_parse_signature_constrained_generic() {
        assert_eq!(
            parser::parse_signature("lt<T: comparable + equatable>(a: T, b: T) -> boolean")
                .unwrap(),
            Signature {
                name: "lt".to_owned(),
                type_parameters: vec![TypeParameter::new_type(
                    "T",
                    [TypeClass::Comparable, TypeClass::Equatable]
                        .into_iter()
                        .collect()
                )],
                parameters: vec![
                    Parameter {
                        name: "a".to_string(),
                        ty: TypeTemplate::named("T"),
                    },
                    Parameter {
                        name: "b".to_string(),
                        ty: TypeTemplate::named("T")
                    }
                ],
                result: TypeTemplate::Boolean,
                variadic: false,
            }
        );
    }

    #[test]
    fn test_parse_signature_unconstrained_generic() {
        let signature = parser::parse_signature("if<T>(c: boolean, a: T, b: T) -> T").unwrap();
        assert_eq!(
            signature.type_parameters,
            vec![TypeParameter::new_type("T", TypeClasses::none())]
        );
    }

    #[test]
    fn test_parse_signature_generic_variadic() {
        let signature =
            parser::parse_signature("sum<'u>(a: number['u], b: number['u]...) -> number['u]")
                .unwrap();
        assert_eq!(
            signature.type_parameters,
            vec![TypeParameter::new_unit("u")]
        );
        assert!(signature.variadic);
        assert_eq!(
            signature.result,
            TypeTemplate::Number(UnitTemplate::param("u"))
        );
    }

    #[test]
    fn test_parse_no_parameters() {
        let signature = parser::parse_signature("today() -> date").unwrap();
        assert!(signature.parameters.is_empty());
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(
            parser::parse_unit("kg*m/s^2").unwrap(),
            UnitTemplate::new(vec![
                (UnitAtomTemplate::Base("kg".to_owned()), 1),
                (UnitAtomTemplate::Base("m".to_owned()), 1),
                (UnitAtomTemplate::Base("s".to_owned()), -2),
            ])
        );
        assert_eq!(
            parser::parse_unit("1/'u^-1").unwrap(),
            UnitTemplate::new(vec![(UnitAtomTemplate::Param("u".to_owned()), 1)])
        );
    }

    #[test]
    fn test_parse_record_and_tuple() {
        assert_eq!(
            parser::parse_type("{a: text, ..}").unwrap(),
            TypeTemplate::Record {
                fields: vec![("a".to_owned(), TypeTemplate::Text)],
                complete: false,
            }
        );
        assert_eq!(
            parser::parse_type("(text, (boolean))").unwrap(),
            TypeTemplate::Tuple(vec![TypeTemplate::Text, TypeTemplate::Boolean])
        );
        assert_eq!(
            parser::parse_type("Pair<[m], list<T>>").unwrap(),
            TypeTemplate::Named {
                name: "Pair".to_owned(),
                args: vec![
                    TemplateArg::Unit(UnitTemplate::new(vec![(
                        UnitAtomTemplate::Base("m".to_owned()),
                        1
                    )])),
                    TemplateArg::Type(TypeTemplate::list(TypeTemplate::named("T"))),
                ],
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let error = parser::parse_type("list<text").unwrap_err();
        assert_eq!(
            error.current_context(),
            &Error::InvalidSyntax {
                input: "list<text".to_owned(),
                position: 9,
                reason: "expected '>'".to_owned(),
            }
        );
        insta::assert_display_snapshot!(
            error.current_context(),
            @"invalid syntax: 'list<text' at position 9: expected '>'");

        let error = parser::parse_signature("eq<T: hashable>(a: T) -> T").unwrap_err();
        assert_eq!(
            error.current_context(),
            &Error::InvalidSyntax {
                input: "eq<T: hashable>(a: T) -> T".to_owned(),
                position: 6,
                reason: "invalid type class 'hashable'".to_owned(),
            }
        );

        assert!(parser::parse_type("text text").is_err());
    }
}
