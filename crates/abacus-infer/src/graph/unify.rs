use abacus_types::TypeClasses;
use tracing::trace;

use crate::graph::{MutVar, Operand, RecordTypeExp, TupleTypeExp, TypeCons, TypeExp};
use crate::{TypeError, TypeExpId, TypeGraph};

impl TypeGraph {
    /// Unify two type expressions.
    ///
    /// On success both ids resolve to the returned representative. `a` is
    /// treated as the expected type when reporting a mismatch. Acceptance
    /// doesn't depend on the order of the arguments.
    ///
    /// A failed unification may leave some variables bound. Callers that
    /// continue after an error should treat the involved types as poisoned.
    pub fn unify(&mut self, a: TypeExpId, b: TypeExpId) -> Result<TypeExpId, TypeError> {
        let mut a = self.prune(a);
        let mut b = self.prune(b);
        if a == b {
            return Ok(a);
        }

        // Variables are always the receiver.
        if self.is_free(b) && !self.is_free(a) {
            std::mem::swap(&mut a, &mut b);
        }

        match (self.exp(a).clone(), self.exp(b).clone()) {
            (TypeExp::Var(MutVar::Bound(_)), _) | (_, TypeExp::Var(MutVar::Bound(_))) => Err(
                TypeError::Internal("unify called on bound variable after pruning".into()),
            ),
            (TypeExp::Var(MutVar::Free(requirements)), TypeExp::Var(MutVar::Free(_))) => {
                self.require_type_classes(b, requirements)?;
                self.bind(a, b);
                Ok(b)
            }
            (TypeExp::Var(MutVar::Free(requirements)), _) => {
                if self.contains_variable(b, a) {
                    return Err(TypeError::CyclicType {
                        variable: self.render(a),
                        ty: self.render(b),
                    });
                }
                self.require_type_classes(b, requirements)?;
                self.bind(a, b);
                Ok(b)
            }
            (TypeExp::Cons(lhs), TypeExp::Cons(rhs)) => self.unify_cons(a, lhs, b, rhs),
            (TypeExp::Record(lhs), TypeExp::Record(rhs)) => self.unify_records(a, lhs, b, rhs),
            (TypeExp::Tuple(lhs), TypeExp::Tuple(rhs)) => self.unify_tuples(a, lhs, b, rhs),
            _ => Err(self.mismatch(a, b)),
        }
    }

    fn unify_cons(
        &mut self,
        a: TypeExpId,
        lhs: TypeCons,
        b: TypeExpId,
        rhs: TypeCons,
    ) -> Result<TypeExpId, TypeError> {
        if lhs.name != rhs.name || lhs.operands.len() != rhs.operands.len() {
            return Err(self.mismatch(a, b));
        }

        for (index, (l, r)) in lhs.operands.iter().zip(&rhs.operands).enumerate() {
            match (l, r) {
                (Operand::Unit(l), Operand::Unit(r)) => self.unify_units(l, r)?,
                (Operand::Type(l), Operand::Type(r)) => {
                    self.unify(*l, *r)?;
                }
                (Operand::Unit(_), Operand::Type(_)) => {
                    return Err(kind_mismatch(&lhs.name, index, "unit", "type"))
                }
                (Operand::Type(_), Operand::Unit(_)) => {
                    return Err(kind_mismatch(&lhs.name, index, "type", "unit"))
                }
            }
        }

        let type_classes = lhs.type_classes.intersection(rhs.type_classes);
        self.merge(a, b, |exp| {
            if let TypeExp::Cons(cons) = exp {
                cons.type_classes = type_classes;
            }
        })
    }

    fn unify_records(
        &mut self,
        a: TypeExpId,
        lhs: RecordTypeExp,
        b: TypeExpId,
        rhs: RecordTypeExp,
    ) -> Result<TypeExpId, TypeError> {
        // Check the fields present on only one side before unifying anything.
        for (name, member) in &lhs.members {
            if !rhs.members.contains_key(name) {
                self.check_lone_field(name, *member, b, &rhs)?;
            }
        }
        for (name, member) in &rhs.members {
            if !lhs.members.contains_key(name) {
                self.check_lone_field(name, *member, a, &lhs)?;
            }
        }

        for (name, l) in &lhs.members {
            if let Some(r) = rhs.members.get(name) {
                self.unify(*l, *r)?;
            }
        }

        let complete = lhs.complete || rhs.complete;
        let pending = if complete {
            TypeClasses::none()
        } else {
            lhs.pending.union(rhs.pending)
        };
        self.merge(a, b, |exp| {
            if let TypeExp::Record(record) = exp {
                for (name, member) in rhs.members {
                    record.members.entry(name).or_insert(member);
                }
                record.complete = complete;
                record.pending = if complete {
                    TypeClasses::none()
                } else {
                    record.pending.union(pending)
                };
            }
        })
    }

    /// Check a field present in one record against the record lacking it.
    fn check_lone_field(
        &mut self,
        name: &str,
        member: TypeExpId,
        other: TypeExpId,
        other_record: &RecordTypeExp,
    ) -> Result<(), TypeError> {
        if other_record.complete {
            return Err(TypeError::MissingField {
                field: name.to_owned(),
                record: self.render(other),
            });
        }
        if self.contains_variable(member, other) {
            return Err(TypeError::CyclicType {
                variable: self.render(other),
                ty: self.render(member),
            });
        }
        self.require_type_classes(member, other_record.pending)
    }

    fn unify_tuples(
        &mut self,
        a: TypeExpId,
        lhs: TupleTypeExp,
        b: TypeExpId,
        rhs: TupleTypeExp,
    ) -> Result<TypeExpId, TypeError> {
        if lhs.elements.len() != rhs.elements.len() {
            return Err(self.mismatch(a, b));
        }
        for (l, r) in lhs.elements.iter().zip(&rhs.elements) {
            self.unify(*l, *r)?;
        }
        self.merge(a, b, |_| {})
    }

    /// Update the node for `a` and forward `b` to it.
    fn merge(
        &mut self,
        a: TypeExpId,
        b: TypeExpId,
        update: impl FnOnce(&mut TypeExp),
    ) -> Result<TypeExpId, TypeError> {
        // Unifying the operands may only have bound variables below `a`
        // and `b`; the occurs check prevents reaching either of them.
        let (a, b) = (self.prune(a), self.prune(b));
        if a == b {
            return Ok(a);
        }
        update(&mut self.nodes[a].exp);

        trace!("Forwarding {b} to {a}");
        self.nodes[b].exp = TypeExp::Var(MutVar::Bound(a));
        Ok(a)
    }

    fn mismatch(&self, expected: TypeExpId, actual: TypeExpId) -> TypeError {
        TypeError::Mismatch {
            expected: self.render(expected),
            actual: self.render(actual),
        }
    }
}

fn kind_mismatch(
    name: &str,
    index: usize,
    expected: &'static str,
    actual: &'static str,
) -> TypeError {
    TypeError::KindMismatch {
        context: format!("operand {index} of '{name}'"),
        expected,
        actual,
    }
}
