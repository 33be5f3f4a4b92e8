use abacus_types::{FUNCTION, NUMBER};
use itertools::Itertools;

use crate::graph::{MutVar, Operand, TypeExp};
use crate::{TypeExpId, TypeGraph};

impl TypeGraph {
    /// Render a type expression using the graph's default depth.
    ///
    /// Concrete types render the same as [abacus_types::ValueType].
    pub fn render(&self, id: TypeExpId) -> String {
        self.render_with_depth(id, self.render_depth)
    }

    pub fn render_with_depth(&self, id: TypeExpId, depth: usize) -> String {
        self.display(id, depth).to_string()
    }

    pub fn display(&self, id: TypeExpId, depth: usize) -> DisplayTypeExp<'_> {
        DisplayTypeExp {
            graph: self,
            id,
            depth,
        }
    }
}

/// Renders a type expression, truncating with `...` below a fixed depth.
pub struct DisplayTypeExp<'a> {
    graph: &'a TypeGraph,
    id: TypeExpId,
    depth: usize,
}

impl<'a> DisplayTypeExp<'a> {
    fn nested(&self, id: TypeExpId) -> DisplayTypeExp<'a> {
        DisplayTypeExp {
            graph: self.graph,
            id,
            depth: self.depth.saturating_sub(1),
        }
    }
}

impl<'a> std::fmt::Display for DisplayTypeExp<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.depth == 0 {
            return f.write_str("...");
        }

        // Follow at most `depth` bindings, so chains of bound variables are
        // truncated like deeply nested types.
        let mut id = self.id;
        for _ in 0..self.depth {
            match self.graph.exp(id) {
                TypeExp::Var(MutVar::Bound(next)) => id = *next,
                _ => break,
            }
        }

        match self.graph.exp(id) {
            TypeExp::Var(MutVar::Bound(_)) => f.write_str("..."),
            TypeExp::Var(MutVar::Free(_)) => write!(f, "?{id}"),
            TypeExp::Cons(cons) => match (cons.name.as_str(), cons.operands.as_slice()) {
                (NUMBER, [Operand::Unit(unit)]) => {
                    let unit = self.graph.normalize_unit(unit);
                    if unit.is_dimensionless() {
                        f.write_str(NUMBER)
                    } else {
                        write!(f, "{NUMBER}[{unit}]")
                    }
                }
                (FUNCTION, [Operand::Type(argument), Operand::Type(result)]) => write!(
                    f,
                    "({} -> {})",
                    self.nested(*argument),
                    self.nested(*result)
                ),
                (name, []) => f.write_str(name),
                (name, operands) => write!(
                    f,
                    "{name}<{}>",
                    operands.iter().format_with(", ", |operand, f| match operand {
                        Operand::Unit(unit) => {
                            f(&format_args!("[{}]", self.graph.normalize_unit(unit)))
                        }
                        Operand::Type(ty) => f(&self.nested(*ty)),
                    })
                ),
            },
            TypeExp::Record(record) => {
                let fields = record
                    .members
                    .iter()
                    .format_with(", ", |(name, member), f| {
                        f(&format_args!("{name}: {}", self.nested(*member)))
                    });
                match (record.complete, record.members.is_empty()) {
                    (true, _) => write!(f, "{{{fields}}}"),
                    (false, true) => f.write_str("{..}"),
                    (false, false) => write!(f, "{{{fields}, ..}}"),
                }
            }
            TypeExp::Tuple(tuple) => write!(
                f,
                "({})",
                tuple
                    .elements
                    .iter()
                    .format_with(", ", |element, f| f(&self.nested(*element)))
            ),
        }
    }
}
