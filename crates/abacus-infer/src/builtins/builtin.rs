use abacus_types::{Signature, TaggedTypes};

use crate::{SignatureInstance, TypeError, TypeGraph};

/// A built-in function.
#[derive(Debug)]
pub struct Builtin {
    /// The signature of this function as a string.
    signature_str: &'static str,
    signature: Signature,
    /// Operators are called through syntax rather than by name.
    operator: bool,
}

pub(super) struct BuiltinBuilder<'building>(&'building mut Builtin);

impl<'building> BuiltinBuilder<'building> {
    pub(super) fn new(builtin: &'building mut Builtin) -> Self {
        Self(builtin)
    }

    pub fn set_operator(self) -> Self {
        self.0.operator = true;
        self
    }
}

impl Builtin {
    pub(super) fn new(signature: Signature, signature_str: &'static str) -> Self {
        Self {
            signature_str,
            signature,
            operator: false,
        }
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signature_str(&self) -> &'static str {
        self.signature_str
    }

    pub fn is_operator(&self) -> bool {
        self.operator
    }

    /// Instantiate the signature for a call with `argument_count` arguments.
    pub fn instantiate(
        &self,
        graph: &mut TypeGraph,
        argument_count: usize,
        env: &dyn TaggedTypes,
    ) -> error_stack::Result<SignatureInstance, TypeError> {
        graph.instantiate_signature(&self.signature, argument_count, env)
    }
}

#[cfg(test)]
mod tests {
    use abacus_types::TaggedTypeRegistry;

    use crate::{get_builtin, TypeGraph, UnitExp};

    #[test]
    fn test_instantiate_sqrt() {
        let env = TaggedTypeRegistry::default();
        let mut graph = TypeGraph::new();
        let sqrt = get_builtin("sqrt").unwrap();

        let instance = sqrt.instantiate(&mut graph, 1, &env).unwrap();
        let area = graph.number(UnitExp::base("m").pow(2));
        graph.unify(instance.parameters[0], area).unwrap();
        insta::assert_snapshot!(graph.render(instance.result), @"Number[m]");

        // No unit squares to meters.
        let instance = sqrt.instantiate(&mut graph, 1, &env).unwrap();
        let length = graph.number(UnitExp::base("m"));
        assert!(graph.unify(instance.parameters[0], length).is_err());
    }

    #[test]
    fn test_instantiate_map() {
        let env = TaggedTypeRegistry::default();
        let mut graph = TypeGraph::new();
        let map = get_builtin("map").unwrap();
        let instance = map.instantiate(&mut graph, 2, &env).unwrap();
        insta::assert_snapshot!(graph.render(instance.parameters[1]), @"(?0 -> ?1)");
        insta::assert_snapshot!(graph.render(instance.result), @"List<?1>");
    }
}
