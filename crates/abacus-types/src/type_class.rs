use std::str::FromStr;

use enum_map::EnumMap;
use itertools::Itertools;

/// Capabilities a concrete type may provide.
///
/// Operators such as equality or ordering require their operands to support
/// the corresponding capability. The vocabulary is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display, enum_map::Enum)]
pub enum TypeClass {
    /// Values may be compared for equality.
    #[display(fmt = "equatable")]
    Equatable,
    /// Values have a total order.
    #[display(fmt = "comparable")]
    Comparable,
    /// Values may be parsed from text.
    #[display(fmt = "readable")]
    Readable,
    /// Values may be rendered as text.
    #[display(fmt = "showable")]
    Showable,
}

impl FromStr for TypeClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equatable" => Ok(Self::Equatable),
            "comparable" => Ok(Self::Comparable),
            "readable" => Ok(Self::Readable),
            "showable" => Ok(Self::Showable),
            _ => Err(()),
        }
    }
}

/// An immutable set of [TypeClass]es.
///
/// Used both for the requirements accumulated on a type variable and for the
/// capabilities a constructor provides.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TypeClasses(EnumMap<TypeClass, bool>);

impl TypeClasses {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self(enum_map::enum_map! { _ => true })
    }

    pub fn contains(&self, type_class: TypeClass) -> bool {
        self.0[type_class]
    }

    #[must_use]
    pub fn with(mut self, type_class: TypeClass) -> Self {
        self.0[type_class] = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|present| !present)
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(EnumMap::from_fn(|class| self.0[class] || other.0[class]))
    }

    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self(EnumMap::from_fn(|class| self.0[class] && other.0[class]))
    }

    /// The classes in `self` which are not in `other`.
    #[must_use]
    pub fn difference(self, other: Self) -> Self {
        Self(EnumMap::from_fn(|class| self.0[class] && !other.0[class]))
    }

    /// Returns true if every class required by `self` is provided by `provided`.
    pub fn satisfied_by(&self, provided: Self) -> bool {
        self.difference(provided).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeClass> + '_ {
        self.0
            .iter()
            .filter(|(_, present)| **present)
            .map(|(class, _)| class)
    }
}

impl FromIterator<TypeClass> for TypeClasses {
    fn from_iter<T: IntoIterator<Item = TypeClass>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::none(), |classes, class| classes.with(class))
    }
}

impl From<TypeClass> for TypeClasses {
    fn from(value: TypeClass) -> Self {
        Self::none().with(value)
    }
}

impl std::fmt::Display for TypeClasses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("none")
        } else {
            write!(f, "{}", self.iter().format(" + "))
        }
    }
}

impl std::fmt::Debug for TypeClasses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_operations() {
        let eq_show: TypeClasses = [TypeClass::Equatable, TypeClass::Showable]
            .into_iter()
            .collect();
        let eq_cmp: TypeClasses = [TypeClass::Equatable, TypeClass::Comparable]
            .into_iter()
            .collect();

        assert_eq!(
            eq_show.union(eq_cmp).to_string(),
            "equatable + comparable + showable"
        );
        assert_eq!(eq_show.intersection(eq_cmp).to_string(), "equatable");
        assert_eq!(eq_show.difference(eq_cmp).to_string(), "showable");
        assert_eq!(TypeClasses::none().to_string(), "none");
    }

    #[test]
    fn test_satisfied_by() {
        let required = TypeClasses::from(TypeClass::Comparable);
        assert!(required.satisfied_by(TypeClasses::all()));
        assert!(!required.satisfied_by(TypeClass::Equatable.into()));
        assert!(TypeClasses::none().satisfied_by(TypeClasses::none()));
    }

    #[test]
    fn test_parse_type_class() {
        assert_eq!("readable".parse(), Ok(TypeClass::Readable));
        assert_eq!("number".parse::<TypeClass>(), Err(()));
    }
}
