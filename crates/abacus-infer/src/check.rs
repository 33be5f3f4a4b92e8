//! Inference of the types of an expression tree.

mod environment;
mod expr;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use abacus_types::ValueType;
use itertools::Itertools;
use tracing::{debug, info_span};

pub use environment::*;
pub use expr::*;

use crate::{
    get_builtin, DiagnosticBuilder, InferenceOptions, Location, NearestMatches, TypeError,
    TypeExpId, TypeGraph, UnitExp,
};

/// The result of checking an expression tree.
#[derive(Debug)]
pub struct Checked {
    /// The type of the whole expression, if it could be determined.
    pub result: Option<ValueType>,
    /// The type of every node, in post-order.
    pub node_types: Vec<NodeType>,
    pub diagnostics: Vec<DiagnosticBuilder>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeType {
    pub location: Location,
    /// None if the type of the node couldn't be determined.
    pub ty: Option<ValueType>,
}

impl Checked {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(DiagnosticBuilder::is_error)
    }
}

/// Infer the type of every node of `expr`.
///
/// Type errors are reported as diagnostics. The node where an error is
/// detected is given a fresh type so the rest of the tree is still checked,
/// unless [InferenceOptions::stop_at_first_error] is set.
pub fn check(expr: &Expr, env: &Environment, options: &InferenceOptions) -> Checked {
    let _span = info_span!("Checking formula", location = %expr.location).entered();

    let mut checker = Checker {
        env,
        options,
        graph: TypeGraph::with_render_depth(options.render_depth),
        scopes: Vec::new(),
        nodes: Vec::with_capacity(expr.num_nodes()),
        diagnostics: Vec::new(),
    };
    let root = checker.check_expr(expr).ok();
    let checked = checker.finish(root, expr.location);

    debug!(
        "Checked {} nodes with {} diagnostics",
        checked.node_types.len(),
        checked.diagnostics.len()
    );
    checked
}

/// Why checking of a node was interrupted.
enum Interrupt {
    /// Checking stopped at the first error.
    Stopped,
    /// The node itself is ill-typed.
    Type(TypeError),
}

impl From<TypeError> for Interrupt {
    fn from(error: TypeError) -> Self {
        Interrupt::Type(error)
    }
}

struct Checker<'a> {
    env: &'a Environment,
    options: &'a InferenceOptions,
    graph: TypeGraph,
    /// Lambda parameters in scope, innermost last.
    scopes: Vec<(String, TypeExpId)>,
    nodes: Vec<(Location, TypeExpId)>,
    diagnostics: Vec<DiagnosticBuilder>,
}

impl<'a> Checker<'a> {
    /// Check `expr` and record the type of the node.
    ///
    /// Only returns [Interrupt::Stopped]. Errors with the node itself are
    /// reported here.
    fn check_expr(&mut self, expr: &Expr) -> Result<TypeExpId, Interrupt> {
        let id = match self.infer(expr) {
            Ok(id) => id,
            Err(Interrupt::Stopped) => return Err(Interrupt::Stopped),
            Err(Interrupt::Type(error)) => {
                self.report(error.diagnostic(expr.location))?;
                self.graph.fresh_var()
            }
        };
        self.graph.locate(id, expr.location);
        self.nodes.push((expr.location, id));
        Ok(id)
    }

    fn infer(&mut self, expr: &Expr) -> Result<TypeExpId, Interrupt> {
        let id = match &expr.kind {
            ExprKind::Number(unit) => self.graph.number(UnitExp::from_unit(unit)),
            ExprKind::Text => self.graph.text(),
            ExprKind::Boolean => self.graph.boolean(),
            ExprKind::Temporal(temporal) => self.graph.temporal(*temporal),
            ExprKind::Reference(name) => self.infer_reference(name)?,
            ExprKind::Record(fields) => {
                let mut members = BTreeMap::new();
                for (name, field) in fields {
                    let ty = self.check_expr(field)?;
                    if members.insert(name.clone(), ty).is_some() {
                        let error = TypeError::DuplicateField {
                            field: name.clone(),
                        };
                        self.report(error.diagnostic(field.location))?;
                    }
                }
                self.graph.record(members, true)
            }
            ExprKind::Field { record, field } => {
                let target = self.check_expr(record)?;
                let member = self.graph.fresh_var();
                let shape = self.graph.record([(field.clone(), member)], false);
                self.graph.unify(shape, target)?;
                member
            }
            ExprKind::List(elements) => {
                let item = self.graph.fresh_var();
                for element in elements {
                    let ty = self.check_expr(element)?;
                    if let Err(error) = self.graph.unify(item, ty) {
                        self.report(
                            error
                                .diagnostic(element.location)
                                .with_note("List elements must have the same type".to_owned()),
                        )?;
                    }
                }
                self.graph.list(item)
            }
            ExprKind::Tuple(elements) => {
                let elements: Vec<_> = elements
                    .iter()
                    .map(|element| self.check_expr(element))
                    .try_collect()?;
                self.graph.tuple(elements)
            }
            ExprKind::Call { function, args } => {
                let arguments: Vec<_> = args
                    .iter()
                    .map(|arg| self.check_expr(arg))
                    .try_collect()?;

                let builtin = get_builtin(function).map_err(|candidates| {
                    TypeError::UndefinedFunction {
                        name: function.clone(),
                        candidates: self.suggest(candidates.map(str::to_owned)),
                    }
                })?;
                let instance = builtin
                    .instantiate(&mut self.graph, args.len(), self.env.tagged_types())
                    .map_err(|report| report.current_context().clone())?;

                let context = format!("in call to '{function}'");
                self.unify_arguments(&instance.parameters, &arguments, args, expr, &context)?;
                instance.result
            }
            ExprKind::Construct {
                tagged,
                constructor,
                args,
            } => {
                let arguments: Vec<_> = args
                    .iter()
                    .map(|arg| self.check_expr(arg))
                    .try_collect()?;

                let instance = self
                    .graph
                    .instantiate_tagged(tagged, self.env.tagged_types())
                    .map_err(|report| report.current_context().clone())?;
                let Some(parameters) = instance.constructor(constructor) else {
                    return Err(TypeError::UnknownVariant {
                        tagged: tagged.clone(),
                        constructor: constructor.clone(),
                    }
                    .into());
                };
                if parameters.len() != args.len() {
                    return Err(TypeError::IncorrectArgumentCount {
                        function: constructor.clone(),
                        expected: parameters.len(),
                        actual: args.len(),
                    }
                    .into());
                }

                let context = format!("in constructor '{constructor}' of '{tagged}'");
                self.unify_arguments(parameters, &arguments, args, expr, &context)?;
                instance.ty
            }
            ExprKind::Lambda { parameter, body } => {
                let argument = self.graph.fresh_var();
                self.scopes.push((parameter.clone(), argument));
                let body = self.check_expr(body);
                self.scopes.pop();
                let body = body?;
                self.graph.function(argument, body)
            }
            ExprKind::Apply { function, argument } => {
                let function = self.check_expr(function)?;
                let argument = self.check_expr(argument)?;
                let result = self.graph.fresh_var();
                let expected = self.graph.function(argument, result);
                self.graph.unify(expected, function)?;
                result
            }
        };
        Ok(id)
    }

    fn infer_reference(&mut self, name: &str) -> Result<TypeExpId, Interrupt> {
        if let Some((_, id)) = self.scopes.iter().rev().find(|(bound, _)| bound == name) {
            return Ok(*id);
        }

        let Some(ty) = self.env.reference(name) else {
            let candidates = if self.options.no_nearest_matches {
                NearestMatches::default()
            } else {
                NearestMatches::new_nearest_strs(
                    name,
                    self.scopes
                        .iter()
                        .map(|(bound, _)| bound.as_str())
                        .chain(self.env.reference_names())
                        .unique(),
                )
                .map(str::to_owned)
            };
            return Err(TypeError::UnboundReference {
                name: name.to_owned(),
                candidates,
            }
            .into());
        };
        Ok(self.graph.from_concrete(ty, self.env.tagged_types())?)
    }

    /// Unify each argument with the corresponding parameter.
    ///
    /// Mismatches are reported at the argument, so the call itself keeps
    /// the type of its result.
    fn unify_arguments(
        &mut self,
        parameters: &[TypeExpId],
        arguments: &[TypeExpId],
        args: &[Expr],
        call: &Expr,
        context: &str,
    ) -> Result<(), Interrupt> {
        for ((parameter, argument), arg) in parameters.iter().zip(arguments).zip(args) {
            if let Err(error) = self.graph.unify(*parameter, *argument) {
                self.report(
                    error
                        .diagnostic(arg.location)
                        .with_label(call.location.secondary_label().with_message(context)),
                )?;
            }
        }
        Ok(())
    }

    fn suggest(&self, candidates: NearestMatches<String>) -> NearestMatches<String> {
        if self.options.no_nearest_matches {
            NearestMatches::default()
        } else {
            candidates
        }
    }

    fn report(&mut self, diagnostic: DiagnosticBuilder) -> Result<(), Interrupt> {
        self.diagnostics.push(diagnostic);
        if self.options.stop_at_first_error {
            Err(Interrupt::Stopped)
        } else {
            Ok(())
        }
    }

    /// Concretize the recorded nodes.
    ///
    /// Only the root reports a type that couldn't be determined, and only if
    /// nothing else went wrong first. Inner nodes are left without a type.
    fn finish(mut self, root: Option<TypeExpId>, location: Location) -> Checked {
        let env = self.env.tagged_types();
        let node_types = self
            .nodes
            .iter()
            .map(|(location, id)| NodeType {
                location: *location,
                ty: self.graph.to_concrete_type(*id, env).ok(),
            })
            .collect();

        let result = root.and_then(|root| match self.graph.to_concrete_type(root, env) {
            Ok(ty) => Some(ty),
            Err(error) => {
                if self.diagnostics.is_empty() {
                    self.diagnostics.push(error.diagnostic(location));
                }
                None
            }
        });

        Checked {
            result,
            node_types,
            diagnostics: self.diagnostics,
        }
    }
}
