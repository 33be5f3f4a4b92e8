use abacus_types::Signature;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use static_init::dynamic;

use crate::NearestMatches;

use super::{Builtin, BuiltinBuilder};

pub(super) struct Registry {
    builtins: HashMap<String, Builtin>,
}

impl Registry {
    fn new() -> Self {
        Self {
            builtins: HashMap::new(),
        }
    }

    pub(super) fn register(&mut self, signature_str: &'static str) -> BuiltinBuilder<'_> {
        let signature = Signature::parse(signature_str)
            .unwrap_or_else(|e| panic!("Failed to parse signature '{signature_str}': {e:?}"));

        match self.builtins.entry(signature.name().to_owned()) {
            Entry::Occupied(_) => {
                // The registry is built statically, so a duplicate is a bug.
                panic!(
                    "Builtin with name '{}' already registered",
                    signature.name()
                )
            }
            Entry::Vacant(vacant) => {
                let builtin = Builtin::new(signature, signature_str);
                BuiltinBuilder::new(vacant.insert(builtin))
            }
        }
    }

    fn get_by_name(&self, name: &str) -> Option<&Builtin> {
        self.builtins.get(name)
    }

    fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.builtins.values()
    }
}

/// Get the built-in function with the given name.
///
/// The name corresponds to the name from the signature. For instance, the
/// signature `not(value: boolean) -> boolean` has the name `not`.
///
/// # Errors
/// Returns the 5 closest matches from the registry, excluding operators.
pub fn get_builtin(name: &str) -> Result<&'static Builtin, NearestMatches<&'static str>> {
    REGISTRY.get_by_name(name).ok_or_else(|| {
        NearestMatches::new_nearest_strs(
            name,
            REGISTRY
                .iter()
                .filter(|builtin| !builtin.is_operator())
                .map(|builtin| builtin.name()),
        )
    })
}

/// Return an iterator over all built-in functions.
pub fn builtins() -> impl Iterator<Item = &'static Builtin> {
    REGISTRY.iter()
}

#[dynamic]
static REGISTRY: Registry = {
    let mut registry = Registry::new();
    super::register_builtins(&mut registry);
    registry
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_builtin() {
        let sqrt = get_builtin("sqrt").unwrap();
        assert_eq!(sqrt.name(), "sqrt");
        assert_eq!(sqrt.signature().to_string(), sqrt.signature_str());
    }

    #[test]
    fn test_get_builtin_nearest_matches() {
        let matches = get_builtin("maps").unwrap_err().inner();
        assert_eq!(matches.len(), 5);
        assert_eq!(matches[0], "map");

        // Operators are never suggested.
        let matches = get_builtin("nag").unwrap_err().inner();
        assert!(!matches.contains(&"neg"));
    }

    #[test]
    fn test_signatures_display_as_registered() {
        for builtin in builtins() {
            assert_eq!(builtin.signature().to_string(), builtin.signature_str());
        }
    }
}
