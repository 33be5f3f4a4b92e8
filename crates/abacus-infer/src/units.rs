//! Units of measure with unit variables.
//!
//! A [UnitExp] is a product of base units and unit variables raised to
//! integer powers. Unit variables live in the [TypeGraph] alongside the type
//! variables, and like them are assigned at most once.

use std::collections::BTreeMap;

use abacus_types::{write_unit_factors, Unit};
use tracing::trace;

use crate::{TypeError, TypeGraph};

index_vec::define_index_type! {
    /// The identifier of a unit variable within a [TypeGraph].
    pub struct UnitVarId = u32;

    DISPLAY_FORMAT = "{}";
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitAtom {
    Base(String),
    Var(UnitVarId),
}

impl std::fmt::Display for UnitAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitAtom::Base(name) => f.write_str(name),
            UnitAtom::Var(var) => write!(f, "'u{var}"),
        }
    }
}

/// A product of unit atoms with non-zero integer exponents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnitExp {
    factors: BTreeMap<UnitAtom, i32>,
}

impl UnitExp {
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn base(name: impl Into<String>) -> Self {
        Self::atom(UnitAtom::Base(name.into()))
    }

    pub fn var(var: UnitVarId) -> Self {
        Self::atom(UnitAtom::Var(var))
    }

    fn atom(atom: UnitAtom) -> Self {
        Self {
            factors: BTreeMap::from([(atom, 1)]),
        }
    }

    pub fn from_unit(unit: &Unit) -> Self {
        let mut result = Self::dimensionless();
        for (name, exponent) in unit.factors() {
            result.add_factor(UnitAtom::Base(name.to_owned()), exponent);
        }
        result
    }

    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn factors(&self) -> impl Iterator<Item = (&UnitAtom, i32)> + '_ {
        self.factors.iter().map(|(atom, exponent)| (atom, *exponent))
    }

    /// The unit variables mentioned, with their exponents.
    pub fn variables(&self) -> impl Iterator<Item = (UnitVarId, i32)> + '_ {
        self.factors.iter().filter_map(|(atom, exponent)| match atom {
            UnitAtom::Var(var) => Some((*var, *exponent)),
            UnitAtom::Base(_) => None,
        })
    }

    #[must_use]
    pub fn multiply(&self, other: &UnitExp) -> UnitExp {
        let mut result = self.clone();
        for (atom, exponent) in &other.factors {
            result.add_factor(atom.clone(), *exponent);
        }
        result
    }

    #[must_use]
    pub fn pow(&self, exponent: i32) -> UnitExp {
        if exponent == 0 {
            return Self::dimensionless();
        }
        Self {
            factors: self
                .factors
                .iter()
                .map(|(atom, e)| (atom.clone(), e * exponent))
                .collect(),
        }
    }

    #[must_use]
    pub fn reciprocal(&self) -> UnitExp {
        self.pow(-1)
    }

    fn add_factor(&mut self, atom: UnitAtom, exponent: i32) {
        if exponent == 0 {
            return;
        }
        let entry = self.factors.entry(atom).or_default();
        *entry += exponent;
        if *entry == 0 {
            self.factors.retain(|_, exponent| *exponent != 0);
        }
    }
}

impl std::fmt::Display for UnitExp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_unit_factors(f, self.factors())
    }
}

impl TypeGraph {
    pub fn fresh_unit_var(&mut self) -> UnitVarId {
        self.unit_vars.push(None)
    }

    /// Substitute the bindings of all assigned unit variables.
    ///
    /// The result mentions only base units and unassigned variables.
    pub fn normalize_unit(&self, unit: &UnitExp) -> UnitExp {
        let mut result = UnitExp::dimensionless();
        for (atom, exponent) in unit.factors() {
            match atom {
                UnitAtom::Var(var) => match &self.unit_vars[*var] {
                    Some(binding) => {
                        result = result.multiply(&self.normalize_unit(binding).pow(exponent));
                    }
                    None => result.add_factor(atom.clone(), exponent),
                },
                UnitAtom::Base(_) => result.add_factor(atom.clone(), exponent),
            }
        }
        result
    }

    /// Render a unit after substituting assigned variables.
    pub fn render_unit(&self, unit: &UnitExp) -> String {
        self.normalize_unit(unit).to_string()
    }

    /// Unify two units, assigning unit variables as needed.
    ///
    /// Solves `expected / actual = 1` by repeatedly eliminating the variable
    /// with the smallest exponent. When the other exponents are not all
    /// divisible by it, the variable is replaced by a fresh one times the
    /// integer part of the quotient, which strictly reduces the smallest
    /// exponent. Fails if only base units remain, or if no integer solution
    /// exists.
    pub fn unify_units(&mut self, expected: &UnitExp, actual: &UnitExp) -> Result<(), TypeError> {
        let mut residual = self.normalize_unit(&expected.multiply(&actual.reciprocal()));
        loop {
            if residual.is_dimensionless() {
                return Ok(());
            }

            let Some((var, exponent)) = residual
                .variables()
                .min_by_key(|(_, exponent)| exponent.abs())
            else {
                return Err(self.unit_mismatch(expected, actual));
            };

            let others: Vec<_> = residual
                .factors()
                .filter(|(atom, _)| **atom != UnitAtom::Var(var))
                .map(|(atom, e)| (atom.clone(), e))
                .collect();

            if others.iter().all(|(_, e)| e % exponent == 0) {
                let mut binding = UnitExp::dimensionless();
                for (atom, e) in others {
                    binding.add_factor(atom, -e / exponent);
                }
                self.bind_unit(var, binding);
                return Ok(());
            }

            let variables_divisible = others
                .iter()
                .filter(|(atom, _)| matches!(atom, UnitAtom::Var(_)))
                .all(|(_, e)| e % exponent == 0);
            if variables_divisible {
                // Some base unit would need a fractional exponent.
                return Err(self.unit_mismatch(expected, actual));
            }

            let mut binding = UnitExp::var(self.fresh_unit_var());
            for (atom, e) in others {
                binding.add_factor(atom, -e.div_euclid(exponent));
            }
            self.bind_unit(var, binding);
            residual = self.normalize_unit(&residual);
        }
    }

    /// Resolve a unit to a concrete [Unit].
    ///
    /// # Errors
    /// Fails if an unassigned unit variable remains.
    pub fn concrete_unit(&self, unit: &UnitExp) -> Result<Unit, TypeError> {
        let unit = self.normalize_unit(unit);
        let mut result = Unit::dimensionless();
        for (atom, exponent) in unit.factors() {
            match atom {
                UnitAtom::Base(name) => {
                    result = result.multiply(&Unit::base(name.as_str()).pow(exponent));
                }
                UnitAtom::Var(_) => {
                    return Err(TypeError::FreeUnitVariable {
                        unit: unit.to_string(),
                    })
                }
            }
        }
        Ok(result)
    }

    fn bind_unit(&mut self, var: UnitVarId, binding: UnitExp) {
        trace!("Binding unit variable 'u{var} to {binding}");
        debug_assert!(self.unit_vars[var].is_none(), "unit variable bound twice");
        self.unit_vars[var] = Some(binding);
    }

    fn unit_mismatch(&self, expected: &UnitExp, actual: &UnitExp) -> TypeError {
        TypeError::UnitMismatch {
            expected: self.render_unit(expected),
            actual: self.render_unit(actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meters_per_second() -> UnitExp {
        UnitExp::base("m").multiply(&UnitExp::base("s").reciprocal())
    }

    #[test]
    fn test_display() {
        let mut graph = TypeGraph::new();
        let u = graph.fresh_unit_var();
        let unit = UnitExp::base("kg")
            .multiply(&UnitExp::var(u).pow(2))
            .multiply(&UnitExp::base("s").pow(-2));
        insta::assert_display_snapshot!(unit, @"kg*'u0^2/s^2");
        insta::assert_display_snapshot!(UnitExp::dimensionless(), @"1");
        insta::assert_display_snapshot!(unit.reciprocal(), @"s^2/(kg*'u0^2)");
    }

    #[test]
    fn test_unify_binds_variable() {
        let mut graph = TypeGraph::new();
        let u = graph.fresh_unit_var();
        graph
            .unify_units(&UnitExp::var(u), &meters_per_second())
            .unwrap();
        assert_eq!(
            graph.concrete_unit(&UnitExp::var(u)).unwrap().to_string(),
            "m/s"
        );
    }

    #[test]
    fn test_unify_solves_product() {
        // 'u * s = m gives 'u = m/s.
        let mut graph = TypeGraph::new();
        let u = graph.fresh_unit_var();
        graph
            .unify_units(
                &UnitExp::var(u).multiply(&UnitExp::base("s")),
                &UnitExp::base("m"),
            )
            .unwrap();
        assert_eq!(
            graph.concrete_unit(&UnitExp::var(u)).unwrap().to_string(),
            "m/s"
        );
    }

    #[test]
    fn test_unify_no_integer_solution() {
        // 'u^2 = m has no solution with integer exponents.
        let mut graph = TypeGraph::new();
        let u = graph.fresh_unit_var();
        let error = graph
            .unify_units(&UnitExp::var(u).pow(2), &UnitExp::base("m"))
            .unwrap_err();
        assert_eq!(
            error,
            TypeError::UnitMismatch {
                expected: "'u0^2".to_owned(),
                actual: "m".to_owned(),
            }
        );
    }

    #[test]
    fn test_unify_base_mismatch() {
        let mut graph = TypeGraph::new();
        let error = graph
            .unify_units(&UnitExp::base("m"), &UnitExp::base("s"))
            .unwrap_err();
        insta::assert_display_snapshot!(error, @"unit mismatch: expected m but got s");

        assert!(graph
            .unify_units(&meters_per_second(), &meters_per_second())
            .is_ok());
    }

    #[test]
    fn test_unify_requires_fresh_variable() {
        // 'u^2 * 'v^3 = m^4 is solvable ('u = m^2, 'v = 1 is one solution).
        let mut graph = TypeGraph::new();
        let u = graph.fresh_unit_var();
        let v = graph.fresh_unit_var();
        let lhs = UnitExp::var(u).pow(2).multiply(&UnitExp::var(v).pow(3));
        let rhs = UnitExp::base("m").pow(4);
        graph.unify_units(&lhs, &rhs).unwrap();

        // Whatever the solution, both sides now agree.
        assert_eq!(graph.normalize_unit(&lhs), graph.normalize_unit(&rhs));
    }

    #[test]
    fn test_concrete_unit_unresolved() {
        let mut graph = TypeGraph::new();
        let u = graph.fresh_unit_var();
        let error = graph
            .concrete_unit(&UnitExp::var(u).multiply(&UnitExp::base("m")))
            .unwrap_err();
        insta::assert_display_snapshot!(error, @"unit unspecified: m*'u0");
    }
}
