//! The mutable graph of type expressions built during an inference pass.

mod concretize;
mod render;
mod type_classes;
mod unify;

use std::collections::BTreeMap;

use abacus_types::{
    builtin_type_classes, Temporal, TypeClasses, BOOLEAN, FUNCTION, LIST, NUMBER, TEXT,
};
use hashbrown::HashSet;
use index_vec::IndexVec;

use crate::{Location, UnitExp, UnitVarId, DEFAULT_RENDER_DEPTH};

pub use render::DisplayTypeExp;

index_vec::define_index_type! {
    /// The identifier of a type expression within a [TypeGraph].
    ///
    /// Identity of type expressions is identity of their ids.
    pub struct TypeExpId = u32;

    DISPLAY_FORMAT = "{}";
}

/// A node in the type graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExp {
    Var(MutVar),
    Cons(TypeCons),
    Record(RecordTypeExp),
    Tuple(TupleTypeExp),
}

/// A unification variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutVar {
    /// Not yet assigned. Holds the capabilities required of the eventual type.
    Free(TypeClasses),
    /// Assigned to (or forwarded to) another node.
    Bound(TypeExpId),
}

/// A constructor applied to operands, such as `Number['u]` or `List<T>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeCons {
    pub name: String,
    pub operands: Vec<Operand>,
    /// Capabilities provided when every type operand provides them.
    pub type_classes: TypeClasses,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Unit(UnitExp),
    Type(TypeExpId),
}

impl Operand {
    pub fn as_type(&self) -> Option<TypeExpId> {
        match self {
            Operand::Type(id) => Some(*id),
            Operand::Unit(_) => None,
        }
    }
}

/// A structural record.
///
/// An incomplete record is known to have at least `members`, and may have
/// more. Capabilities required of an incomplete record are kept in `pending`
/// so fields discovered later can be checked against them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordTypeExp {
    pub members: BTreeMap<String, TypeExpId>,
    pub complete: bool,
    pub pending: TypeClasses,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleTypeExp {
    pub elements: Vec<TypeExpId>,
}

#[derive(Debug)]
struct Node {
    exp: TypeExp,
    location: Option<Location>,
}

/// The type expressions and unit variables of one inference pass.
///
/// Nodes are never removed. Unification only assigns free variables and
/// forwards merged nodes to their representative, so ids held by callers
/// remain valid and observe the result.
#[derive(Debug)]
pub struct TypeGraph {
    nodes: IndexVec<TypeExpId, Node>,
    pub(crate) unit_vars: IndexVec<UnitVarId, Option<UnitExp>>,
    render_depth: usize,
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::with_render_depth(DEFAULT_RENDER_DEPTH)
    }

    pub fn with_render_depth(render_depth: usize) -> Self {
        Self {
            nodes: IndexVec::new(),
            unit_vars: IndexVec::new(),
            render_depth,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, exp: TypeExp) -> TypeExpId {
        self.nodes.push(Node {
            exp,
            location: None,
        })
    }

    /// The node stored at `id`, which may be a bound variable.
    pub fn exp(&self, id: TypeExpId) -> &TypeExp {
        &self.nodes[id].exp
    }

    pub fn location(&self, id: TypeExpId) -> Option<Location> {
        self.nodes[id].location
    }

    /// Tag a node with its source location, unless it already has one.
    pub fn locate(&mut self, id: TypeExpId, location: Location) {
        self.nodes[id].location.get_or_insert(location);
    }

    pub fn fresh_var(&mut self) -> TypeExpId {
        self.fresh_var_requiring(TypeClasses::none())
    }

    pub fn fresh_var_requiring(&mut self, type_classes: TypeClasses) -> TypeExpId {
        self.add(TypeExp::Var(MutVar::Free(type_classes)))
    }

    /// Apply a built-in constructor.
    ///
    /// Names which aren't built-in provide no capabilities; use
    /// [Self::tagged] for tagged types.
    pub fn cons(&mut self, name: &str, operands: Vec<Operand>) -> TypeExpId {
        let type_classes = builtin_type_classes(name).unwrap_or_default();
        self.tagged(name, operands, type_classes)
    }

    pub fn tagged(
        &mut self,
        name: &str,
        operands: Vec<Operand>,
        type_classes: TypeClasses,
    ) -> TypeExpId {
        self.add(TypeExp::Cons(TypeCons {
            name: name.to_owned(),
            operands,
            type_classes,
        }))
    }

    pub fn number(&mut self, unit: UnitExp) -> TypeExpId {
        self.cons(NUMBER, vec![Operand::Unit(unit)])
    }

    pub fn dimensionless(&mut self) -> TypeExpId {
        self.number(UnitExp::dimensionless())
    }

    pub fn text(&mut self) -> TypeExpId {
        self.cons(TEXT, vec![])
    }

    pub fn boolean(&mut self) -> TypeExpId {
        self.cons(BOOLEAN, vec![])
    }

    pub fn temporal(&mut self, temporal: Temporal) -> TypeExpId {
        self.cons(temporal.name(), vec![])
    }

    pub fn list(&mut self, item: TypeExpId) -> TypeExpId {
        self.cons(LIST, vec![Operand::Type(item)])
    }

    pub fn function(&mut self, argument: TypeExpId, result: TypeExpId) -> TypeExpId {
        self.cons(
            FUNCTION,
            vec![Operand::Type(argument), Operand::Type(result)],
        )
    }

    pub fn record(
        &mut self,
        members: impl IntoIterator<Item = (String, TypeExpId)>,
        complete: bool,
    ) -> TypeExpId {
        self.add(TypeExp::Record(RecordTypeExp {
            members: members.into_iter().collect(),
            complete,
            pending: TypeClasses::none(),
        }))
    }

    pub fn tuple(&mut self, elements: Vec<TypeExpId>) -> TypeExpId {
        self.add(TypeExp::Tuple(TupleTypeExp { elements }))
    }

    /// Return the representative of `id`, compressing the chain of bound
    /// variables leading to it.
    pub fn prune(&mut self, id: TypeExpId) -> TypeExpId {
        let representative = self.resolve(id);

        let mut current = id;
        while let TypeExp::Var(MutVar::Bound(next)) = self.nodes[current].exp {
            self.nodes[current].exp = TypeExp::Var(MutVar::Bound(representative));
            current = next;
        }
        representative
    }

    /// Return the representative of `id` without modifying the graph.
    pub fn resolve(&self, id: TypeExpId) -> TypeExpId {
        let mut current = id;
        while let TypeExp::Var(MutVar::Bound(next)) = self.nodes[current].exp {
            current = next;
        }
        current
    }

    pub fn is_free(&self, id: TypeExpId) -> bool {
        matches!(
            self.nodes[self.resolve(id)].exp,
            TypeExp::Var(MutVar::Free(_))
        )
    }

    /// Returns true if `needle` is reachable from `haystack`.
    ///
    /// This is the occurs check. It compares node identity (after resolving
    /// bound variables), never structure.
    pub fn contains_variable(&self, haystack: TypeExpId, needle: TypeExpId) -> bool {
        let needle = self.resolve(needle);
        let mut visited = HashSet::new();
        let mut pending = vec![haystack];
        while let Some(next) = pending.pop() {
            let next = self.resolve(next);
            if next == needle {
                return true;
            }
            if !visited.insert(next) {
                continue;
            }
            match &self.nodes[next].exp {
                TypeExp::Var(_) => {}
                TypeExp::Cons(cons) => {
                    pending.extend(cons.operands.iter().filter_map(Operand::as_type))
                }
                TypeExp::Record(record) => pending.extend(record.members.values().copied()),
                TypeExp::Tuple(tuple) => pending.extend(tuple.elements.iter().copied()),
            }
        }
        false
    }

    fn bind(&mut self, var: TypeExpId, target: TypeExpId) {
        tracing::trace!("Binding ?{var} to {}", self.render(target));
        self.nodes[var].exp = TypeExp::Var(MutVar::Bound(target));
    }
}
