use abacus_types::TypeClasses;
use hashbrown::HashSet;

use crate::graph::{MutVar, Operand, TypeExp};
use crate::{TypeError, TypeExpId, TypeGraph};

impl TypeGraph {
    /// Require that `id` (and anything it is later unified with) provides
    /// the given capabilities.
    ///
    /// Free variables accumulate the requirement. Constructors must provide
    /// it themselves and their type operands must provide it. Records and
    /// tuples pass it to their members; incomplete records also remember it
    /// for fields discovered later.
    pub fn require_type_classes(
        &mut self,
        id: TypeExpId,
        requirements: TypeClasses,
    ) -> Result<(), TypeError> {
        let mut path = HashSet::new();
        self.require_on_path(id, requirements, &mut path)
    }

    /// Nodes on `path` are currently being visited. Reaching one of them
    /// again means the type is cyclic. Shared nodes visited on a different
    /// branch are fine.
    fn require_on_path(
        &mut self,
        id: TypeExpId,
        requirements: TypeClasses,
        path: &mut HashSet<TypeExpId>,
    ) -> Result<(), TypeError> {
        if requirements.is_empty() {
            return Ok(());
        }
        if !path.insert(id) {
            let ty = self.render(id);
            return Err(TypeError::CyclicType {
                variable: ty.clone(),
                ty,
            });
        }

        let result = match self.exp(id).clone() {
            TypeExp::Var(MutVar::Free(existing)) => {
                self.nodes[id].exp = TypeExp::Var(MutVar::Free(existing.union(requirements)));
                Ok(())
            }
            TypeExp::Var(MutVar::Bound(target)) => self.require_on_path(target, requirements, path),
            TypeExp::Cons(cons) => {
                let missing = requirements.difference(cons.type_classes);
                if missing.is_empty() {
                    cons.operands
                        .iter()
                        .filter_map(Operand::as_type)
                        .try_for_each(|operand| self.require_on_path(operand, requirements, path))
                } else {
                    Err(TypeError::MissingCapability {
                        ty: self.render(id),
                        missing,
                    })
                }
            }
            TypeExp::Record(record) => {
                let result = record
                    .members
                    .values()
                    .try_for_each(|member| self.require_on_path(*member, requirements, path));
                if let TypeExp::Record(record) = &mut self.nodes[id].exp {
                    if !record.complete {
                        record.pending = record.pending.union(requirements);
                    }
                }
                result
            }
            TypeExp::Tuple(tuple) => tuple
                .elements
                .iter()
                .try_for_each(|element| self.require_on_path(*element, requirements, path)),
        };

        path.remove(&id);
        result
    }
}
