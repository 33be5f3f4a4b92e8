use std::collections::BTreeMap;

use abacus_types::{
    ParameterKind, Signature, TaggedTypes, TemplateArg, TypeParameter, TypeTemplate,
    UnitAtomTemplate, UnitTemplate,
};
use error_stack::{IntoReport, ResultExt};
use hashbrown::HashMap;
use itertools::Itertools;

use crate::graph::Operand;
use crate::{TypeError, TypeExpId, TypeGraph, UnitExp, UnitVarId};

/// A tagged type instantiated for one use site.
#[derive(Debug)]
pub struct TaggedInstance {
    /// The tagged type applied to fresh variables.
    pub ty: TypeExpId,
    /// The argument types of each constructor, sharing those variables.
    pub constructors: HashMap<String, Vec<TypeExpId>>,
}

impl TaggedInstance {
    pub fn constructor(&self, name: &str) -> Option<&[TypeExpId]> {
        self.constructors.get(name).map(Vec::as_slice)
    }
}

/// A function signature instantiated for one call site.
#[derive(Debug)]
pub struct SignatureInstance {
    /// The type expected for each argument of the call.
    pub parameters: Vec<TypeExpId>,
    pub result: TypeExpId,
}

/// The variables standing in for parameters at one use site.
#[derive(Default)]
struct Bindings {
    types: HashMap<String, TypeExpId>,
    units: HashMap<String, UnitVarId>,
}

impl TypeGraph {
    /// Instantiate the tagged type `name` with fresh variables.
    pub fn instantiate_tagged(
        &mut self,
        name: &str,
        env: &dyn TaggedTypes,
    ) -> error_stack::Result<TaggedInstance, TypeError> {
        let Some(definition) = env.get(name) else {
            error_stack::bail!(TypeError::UnknownConstructor {
                name: name.to_owned()
            })
        };

        let (bindings, operands) = self.bind_parameters(definition.parameters());
        let ty = self.tagged(name, operands, definition.derives());

        let mut constructors = HashMap::with_capacity(definition.constructors().len());
        for constructor in definition.constructors() {
            let arguments: Vec<_> = constructor
                .arguments
                .iter()
                .map(|argument| self.instantiate_template(argument, &bindings, env))
                .try_collect::<_, Vec<_>, _>()
                .attach_printable_lazy(|| {
                    format!("instantiating constructor '{}'", constructor.name)
                })?;
            constructors.insert(constructor.name.clone(), arguments);
        }

        tracing::debug!("Instantiated tagged type {}", self.render(ty));
        Ok(TaggedInstance { ty, constructors })
    }

    /// Instantiate `signature` for a call with `argument_count` arguments.
    ///
    /// Each type parameter becomes a fresh variable requiring the
    /// parameter's capabilities. Repeated variadic parameters share them.
    pub fn instantiate_signature(
        &mut self,
        signature: &Signature,
        argument_count: usize,
        env: &dyn TaggedTypes,
    ) -> error_stack::Result<SignatureInstance, TypeError> {
        let parameters = signature
            .iter_parameters(argument_count)
            .map_err(|report| {
                let function = signature.name().to_owned();
                let context = match report.current_context() {
                    abacus_types::Error::NotEnoughArguments { expected, actual } => {
                        TypeError::NotEnoughArguments {
                            function,
                            expected: *expected,
                            actual: *actual,
                        }
                    }
                    abacus_types::Error::IncorrectArgumentCount { expected, actual } => {
                        TypeError::IncorrectArgumentCount {
                            function,
                            expected: *expected,
                            actual: *actual,
                        }
                    }
                    other => TypeError::Internal(other.to_string().into()),
                };
                report.change_context(context)
            })?;

        let (bindings, _) = self.bind_parameters(signature.type_parameters());
        let parameters: Vec<_> = parameters
            .map(|parameter| self.instantiate_template(&parameter.ty, &bindings, env))
            .try_collect()?;
        let result = self.instantiate_template(&signature.result, &bindings, env)?;

        tracing::debug!(
            "Instantiated '{}' as ({}) -> {}",
            signature.name(),
            parameters.iter().map(|p| self.render(*p)).format(", "),
            self.render(result)
        );
        Ok(SignatureInstance { parameters, result })
    }

    fn bind_parameters(&mut self, parameters: &[TypeParameter]) -> (Bindings, Vec<Operand>) {
        let mut bindings = Bindings::default();
        let mut operands = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            match parameter.kind {
                ParameterKind::Type => {
                    let var = self.fresh_var_requiring(parameter.type_classes);
                    bindings.types.insert(parameter.name.clone(), var);
                    operands.push(Operand::Type(var));
                }
                ParameterKind::Unit => {
                    let var = self.fresh_unit_var();
                    bindings.units.insert(parameter.name.clone(), var);
                    operands.push(Operand::Unit(UnitExp::var(var)));
                }
            }
        }
        (bindings, operands)
    }

    fn instantiate_template(
        &mut self,
        template: &TypeTemplate,
        bindings: &Bindings,
        env: &dyn TaggedTypes,
    ) -> error_stack::Result<TypeExpId, TypeError> {
        let id = match template {
            TypeTemplate::Number(unit) => {
                let unit = instantiate_unit(unit, bindings)?;
                self.number(unit)
            }
            TypeTemplate::Text => self.text(),
            TypeTemplate::Boolean => self.boolean(),
            TypeTemplate::Temporal(temporal) => self.temporal(*temporal),
            TypeTemplate::List(item) => {
                let item = self.instantiate_template(item, bindings, env)?;
                self.list(item)
            }
            TypeTemplate::Function(argument, result) => {
                let argument = self.instantiate_template(argument, bindings, env)?;
                let result = self.instantiate_template(result, bindings, env)?;
                self.function(argument, result)
            }
            TypeTemplate::Record { fields, complete } => {
                let mut members = BTreeMap::new();
                for (name, field) in fields {
                    let ty = self.instantiate_template(field, bindings, env)?;
                    error_stack::ensure!(
                        members.insert(name.clone(), ty).is_none(),
                        TypeError::DuplicateField {
                            field: name.clone()
                        }
                    );
                }
                self.record(members, *complete)
            }
            TypeTemplate::Tuple(elements) => {
                let elements: Vec<_> = elements
                    .iter()
                    .map(|element| self.instantiate_template(element, bindings, env))
                    .try_collect()?;
                self.tuple(elements)
            }
            TypeTemplate::Named { name, args } => match bindings.types.get(name) {
                Some(var) if args.is_empty() => *var,
                _ => self.instantiate_named(name, args, bindings, env)?,
            },
        };
        Ok(id)
    }

    /// Apply the tagged type `name` to template arguments.
    fn instantiate_named(
        &mut self,
        name: &str,
        args: &[TemplateArg],
        bindings: &Bindings,
        env: &dyn TaggedTypes,
    ) -> error_stack::Result<TypeExpId, TypeError> {
        let Some(definition) = env.get(name) else {
            error_stack::bail!(TypeError::UnknownConstructor {
                name: name.to_owned()
            })
        };
        error_stack::ensure!(
            args.len() == definition.parameters().len(),
            TypeError::WrongArity {
                name: name.to_owned(),
                expected: definition.parameters().len(),
                actual: args.len(),
            }
        );

        let mut operands = Vec::with_capacity(args.len());
        for (index, (arg, parameter)) in args.iter().zip(definition.parameters()).enumerate() {
            let operand = match (arg, parameter.kind) {
                (TemplateArg::Type(ty), ParameterKind::Type) => {
                    let ty = self.instantiate_template(ty, bindings, env)?;
                    self.require_type_classes(ty, parameter.type_classes)
                        .into_report()?;
                    Operand::Type(ty)
                }
                (TemplateArg::Unit(unit), ParameterKind::Unit) => {
                    Operand::Unit(instantiate_unit(unit, bindings)?)
                }
                (TemplateArg::Type(_), ParameterKind::Unit) => {
                    error_stack::bail!(TypeError::KindMismatch {
                        context: format!("argument {index} of '{name}'"),
                        expected: "unit",
                        actual: "type",
                    })
                }
                (TemplateArg::Unit(_), ParameterKind::Type) => {
                    error_stack::bail!(TypeError::KindMismatch {
                        context: format!("argument {index} of '{name}'"),
                        expected: "type",
                        actual: "unit",
                    })
                }
            };
            operands.push(operand);
        }
        Ok(self.tagged(name, operands, definition.derives()))
    }
}

fn instantiate_unit(
    unit: &UnitTemplate,
    bindings: &Bindings,
) -> error_stack::Result<UnitExp, TypeError> {
    let mut result = UnitExp::dimensionless();
    for (atom, exponent) in unit.factors() {
        let atom = match atom {
            UnitAtomTemplate::Base(name) => UnitExp::base(name.as_str()),
            UnitAtomTemplate::Param(name) => match bindings.units.get(name) {
                Some(var) => UnitExp::var(*var),
                None => error_stack::bail!(TypeError::Internal(
                    format!("unbound unit parameter '{name}'").into()
                )),
            },
        };
        result = result.multiply(&atom.pow(*exponent));
    }
    Ok(result)
}
