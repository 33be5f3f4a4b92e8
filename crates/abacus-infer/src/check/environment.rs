use abacus_types::{TaggedTypeDef, TaggedTypeRegistry, TaggedTypes, ValueType};
use hashbrown::HashMap;

/// The names visible to a formula.
#[derive(Debug, Default)]
pub struct Environment {
    tagged_types: TaggedTypeRegistry,
    /// Values the formula may refer to, with their concrete types.
    references: HashMap<String, ValueType>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tagged_type(
        mut self,
        definition: TaggedTypeDef,
    ) -> error_stack::Result<Self, abacus_types::Error> {
        self.tagged_types.register(definition)?;
        Ok(self)
    }

    /// Add (or replace) a reference.
    pub fn with_reference(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.references.insert(name.into(), ty);
        self
    }

    pub fn tagged_types(&self) -> &dyn TaggedTypes {
        &self.tagged_types
    }

    pub fn reference(&self, name: &str) -> Option<&ValueType> {
        self.references.get(name)
    }

    pub fn reference_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.references.keys().map(|name| name.as_str())
    }
}
