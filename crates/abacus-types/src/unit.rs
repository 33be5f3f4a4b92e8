use std::collections::BTreeMap;
use std::str::FromStr;

use itertools::Itertools;

use crate::{Error, UnitTemplate};

/// A concrete unit of measure.
///
/// Units are products of named base units raised to integer powers. The
/// empty product is the dimensionless unit.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit(BTreeMap<String, i32>);

impl Unit {
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn base(name: impl Into<String>) -> Self {
        Self(BTreeMap::from([(name.into(), 1)]))
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the base units and their (non-zero) exponents.
    pub fn factors(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.0.iter().map(|(name, exponent)| (name.as_str(), *exponent))
    }

    #[must_use]
    pub fn multiply(&self, other: &Unit) -> Unit {
        let mut result = self.clone();
        for (name, exponent) in other.factors() {
            result.add_factor(name, exponent);
        }
        result
    }

    #[must_use]
    pub fn pow(&self, exponent: i32) -> Unit {
        Unit(
            self.0
                .iter()
                .filter(|_| exponent != 0)
                .map(|(name, e)| (name.clone(), e * exponent))
                .collect(),
        )
    }

    #[must_use]
    pub fn reciprocal(&self) -> Unit {
        self.pow(-1)
    }

    pub(crate) fn add_factor(&mut self, name: &str, exponent: i32) {
        let entry = self.0.entry(name.to_owned()).or_default();
        *entry += exponent;
        if *entry == 0 {
            self.0.remove(name);
        }
    }
}

impl FromStr for Unit {
    type Err = error_stack::Report<Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitTemplate::parse(s)?.to_concrete()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_unit_factors(f, self.factors())
    }
}

impl std::fmt::Debug for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unit({self})")
    }
}

/// Write a product of unit factors as `kg*m/s^2`.
///
/// Factors with a zero exponent are skipped. Shared by concrete units and the
/// unit expressions used during inference so both render the same way.
pub fn write_unit_factors<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    factors: impl IntoIterator<Item = (T, i32)>,
) -> std::fmt::Result {
    let (numerator, denominator): (Vec<_>, Vec<_>) = factors
        .into_iter()
        .filter(|(_, exponent)| *exponent != 0)
        .partition(|(_, exponent)| *exponent > 0);

    if numerator.is_empty() {
        f.write_str("1")?;
    } else {
        write_product(f, &numerator)?;
    }

    match denominator.len() {
        0 => Ok(()),
        1 => {
            f.write_str("/")?;
            write_product(f, &denominator)
        }
        _ => {
            f.write_str("/(")?;
            write_product(f, &denominator)?;
            f.write_str(")")
        }
    }
}

fn write_product<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    factors: &[(T, i32)],
) -> std::fmt::Result {
    write!(
        f,
        "{}",
        factors.iter().format_with("*", |(atom, exponent), f| {
            match exponent.abs() {
                1 => f(atom),
                exponent => f(&format_args!("{atom}^{exponent}")),
            }
        })
    )
}
