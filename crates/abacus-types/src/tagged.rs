use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::signature::parser;
use crate::{Error, TypeClasses, TypeParameter, TypeTemplate};

/// A constructor (variant) of a tagged type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDef {
    pub name: String,
    /// The argument types, which may mention the parameters of the tagged type.
    pub arguments: Vec<TypeTemplate>,
}

/// A user-defined tagged type.
///
/// Tagged types are nominal: two instances unify only if they have the same
/// name and their arguments unify. Each use site instantiates the definition
/// with fresh variables for its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedTypeDef {
    name: String,
    parameters: Vec<TypeParameter>,
    /// Capabilities instances provide, if their type arguments do.
    derives: TypeClasses,
    constructors: Vec<ConstructorDef>,
}

impl TaggedTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            derives: TypeClasses::none(),
            constructors: Vec::new(),
        }
    }

    /// Parse a definition such as
    /// `Maybe<T> deriving equatable + showable = None | Some(T)`.
    pub fn parse(input: &str) -> error_stack::Result<Self, Error> {
        parser::parse_tagged_type(input)
    }

    pub fn with_type_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters
            .push(TypeParameter::new_type(name, TypeClasses::none()));
        self
    }

    pub fn with_unit_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(TypeParameter::new_unit(name));
        self
    }

    pub fn deriving(mut self, derives: TypeClasses) -> Self {
        self.derives = derives;
        self
    }

    pub fn with_constructor(
        mut self,
        name: impl Into<String>,
        arguments: Vec<TypeTemplate>,
    ) -> Self {
        self.constructors.push(ConstructorDef {
            name: name.into(),
            arguments,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[TypeParameter] {
        &self.parameters
    }

    pub fn derives(&self) -> TypeClasses {
        self.derives
    }

    pub fn constructors(&self) -> &[ConstructorDef] {
        &self.constructors
    }

    pub fn constructor(&self, name: &str) -> Option<&ConstructorDef> {
        self.constructors.iter().find(|c| c.name == name)
    }

    pub(crate) fn from_parts(
        name: String,
        parameters: Vec<TypeParameter>,
        derives: TypeClasses,
        constructors: Vec<ConstructorDef>,
    ) -> Self {
        Self {
            name,
            parameters,
            derives,
            constructors,
        }
    }
}

/// Lookup of tagged-type definitions by name.
pub trait TaggedTypes {
    fn get(&self, name: &str) -> Option<&TaggedTypeDef>;

    /// Names of all known tagged types, used for suggestions.
    fn names(&self) -> Vec<&str>;
}

/// A [TaggedTypes] backed by a map.
#[derive(Debug, Default)]
pub struct TaggedTypeRegistry {
    definitions: HashMap<String, TaggedTypeDef>,
}

impl TaggedTypeRegistry {
    pub fn register(&mut self, definition: TaggedTypeDef) -> error_stack::Result<(), Error> {
        match self.definitions.entry(definition.name.clone()) {
            Entry::Occupied(_) => {
                error_stack::bail!(Error::DuplicateTaggedType(definition.name))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(definition);
                Ok(())
            }
        }
    }
}

impl TaggedTypes for TaggedTypeRegistry {
    fn get(&self, name: &str) -> Option<&TaggedTypeDef> {
        self.definitions.get(name)
    }

    fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(|name| name.as_str()).collect()
    }
}
