use abacus_types::{
    ParameterKind, RecordType, TaggedTypes, Temporal, TypeArg, ValueType, BOOLEAN, FUNCTION, LIST,
    NUMBER, TEXT,
};

use crate::graph::{MutVar, Operand, TypeCons, TypeExp};
use crate::{TypeError, TypeExpId, TypeGraph, UnitExp};

impl TypeGraph {
    /// Convert a type expression to the concrete type used at runtime.
    ///
    /// # Errors
    /// Fails if a variable (or unit variable) remains unassigned, or if a
    /// constructor doesn't match its definition.
    pub fn to_concrete_type(
        &mut self,
        id: TypeExpId,
        env: &dyn TaggedTypes,
    ) -> Result<ValueType, TypeError> {
        let id = self.prune(id);
        match self.exp(id).clone() {
            TypeExp::Var(MutVar::Free(_)) => Err(TypeError::FreeVariable {
                ty: self.render(id),
            }),
            TypeExp::Var(MutVar::Bound(_)) => Err(TypeError::Internal(
                "bound variable after pruning".into(),
            )),
            TypeExp::Cons(cons) => self.concrete_cons(cons, env),
            TypeExp::Record(record) => {
                // Known members of an incomplete record become its fields.
                let mut fields = Vec::with_capacity(record.members.len());
                for (name, member) in record.members {
                    let ty = self.to_concrete_type(member, env)?;
                    fields.push((name, ty));
                }
                let record = RecordType::try_new(fields).map_err(|report| {
                    match report.current_context() {
                        abacus_types::Error::DuplicateField(field) => TypeError::DuplicateField {
                            field: field.clone(),
                        },
                        other => TypeError::Internal(other.to_string().into()),
                    }
                })?;
                Ok(ValueType::Record(record))
            }
            TypeExp::Tuple(tuple) => {
                let mut elements = Vec::with_capacity(tuple.elements.len());
                for element in tuple.elements {
                    elements.push(self.to_concrete_type(element, env)?);
                }
                Ok(ValueType::Tuple(elements))
            }
        }
    }

    fn concrete_cons(
        &mut self,
        cons: TypeCons,
        env: &dyn TaggedTypes,
    ) -> Result<ValueType, TypeError> {
        if let Some(kinds) = builtin_operand_kinds(&cons.name) {
            check_operands(&cons.name, &cons.operands, kinds)?;
            if let Some(temporal) = Temporal::from_name(&cons.name) {
                return Ok(ValueType::Temporal(temporal));
            }
            return match (cons.name.as_str(), cons.operands.as_slice()) {
                (NUMBER, [Operand::Unit(unit)]) => Ok(ValueType::Number(self.concrete_unit(unit)?)),
                (TEXT, []) => Ok(ValueType::Text),
                (BOOLEAN, []) => Ok(ValueType::Boolean),
                (LIST, [Operand::Type(item)]) => {
                    Ok(ValueType::list(self.to_concrete_type(*item, env)?))
                }
                (FUNCTION, [Operand::Type(argument), Operand::Type(result)]) => {
                    let argument = self.to_concrete_type(*argument, env)?;
                    let result = self.to_concrete_type(*result, env)?;
                    Ok(ValueType::function(argument, result))
                }
                (name, _) => Err(TypeError::Internal(
                    format!("unhandled built-in constructor '{name}'").into(),
                )),
            };
        }

        let Some(definition) = env.get(&cons.name) else {
            return Err(TypeError::UnknownConstructor { name: cons.name });
        };
        let kinds: Vec<_> = definition.parameters().iter().map(|p| p.kind).collect();
        check_operands(&cons.name, &cons.operands, &kinds)?;

        let mut args = Vec::with_capacity(cons.operands.len());
        for operand in &cons.operands {
            args.push(match operand {
                Operand::Unit(unit) => TypeArg::Unit(self.concrete_unit(unit)?),
                Operand::Type(ty) => TypeArg::Type(self.to_concrete_type(*ty, env)?),
            });
        }
        Ok(ValueType::Tagged {
            name: cons.name,
            args,
        })
    }

    /// Embed a concrete type in the graph.
    ///
    /// This is a left inverse of [Self::to_concrete_type]. Records are
    /// embedded as complete records.
    pub fn from_concrete(
        &mut self,
        ty: &ValueType,
        env: &dyn TaggedTypes,
    ) -> Result<TypeExpId, TypeError> {
        let id = match ty {
            ValueType::Number(unit) => self.number(UnitExp::from_unit(unit)),
            ValueType::Text => self.text(),
            ValueType::Boolean => self.boolean(),
            ValueType::Temporal(temporal) => self.temporal(*temporal),
            ValueType::List(item) => {
                let item = self.from_concrete(item, env)?;
                self.list(item)
            }
            ValueType::Function(argument, result) => {
                let argument = self.from_concrete(argument, env)?;
                let result = self.from_concrete(result, env)?;
                self.function(argument, result)
            }
            ValueType::Record(record) => {
                let mut members = Vec::with_capacity(record.fields().len());
                for field in record.fields() {
                    members.push((field.name.clone(), self.from_concrete(&field.ty, env)?));
                }
                self.record(members, true)
            }
            ValueType::Tuple(elements) => {
                let mut ids = Vec::with_capacity(elements.len());
                for element in elements {
                    ids.push(self.from_concrete(element, env)?);
                }
                self.tuple(ids)
            }
            ValueType::Tagged { name, args } => {
                let Some(definition) = env.get(name) else {
                    return Err(TypeError::UnknownConstructor { name: name.clone() });
                };
                let mut operands = Vec::with_capacity(args.len());
                for arg in args {
                    operands.push(match arg {
                        TypeArg::Unit(unit) => Operand::Unit(UnitExp::from_unit(unit)),
                        TypeArg::Type(ty) => Operand::Type(self.from_concrete(ty, env)?),
                    });
                }
                let kinds: Vec<_> = definition.parameters().iter().map(|p| p.kind).collect();
                check_operands(name, &operands, &kinds)?;
                self.tagged(name, operands, definition.derives())
            }
        };
        Ok(id)
    }
}

fn builtin_operand_kinds(name: &str) -> Option<&'static [ParameterKind]> {
    match name {
        NUMBER => Some(&[ParameterKind::Unit]),
        TEXT | BOOLEAN => Some(&[]),
        LIST => Some(&[ParameterKind::Type]),
        FUNCTION => Some(&[ParameterKind::Type, ParameterKind::Type]),
        name if Temporal::from_name(name).is_some() => Some(&[]),
        _ => None,
    }
}

fn kind_name(kind: ParameterKind) -> &'static str {
    match kind {
        ParameterKind::Type => "type",
        ParameterKind::Unit => "unit",
    }
}

fn check_operands(
    name: &str,
    operands: &[Operand],
    kinds: &[ParameterKind],
) -> Result<(), TypeError> {
    if operands.len() != kinds.len() {
        return Err(TypeError::WrongArity {
            name: name.to_owned(),
            expected: kinds.len(),
            actual: operands.len(),
        });
    }
    for (index, (operand, kind)) in operands.iter().zip(kinds).enumerate() {
        let actual = match operand {
            Operand::Unit(_) => ParameterKind::Unit,
            Operand::Type(_) => ParameterKind::Type,
        };
        if actual != *kind {
            return Err(TypeError::KindMismatch {
                context: format!("operand {index} of '{name}'"),
                expected: kind_name(*kind),
                actual: kind_name(actual),
            });
        }
    }
    Ok(())
}
