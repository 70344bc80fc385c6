//! Custom type definitions
//!
//! Maps a type name to the reference shapes it accepts, e.g. a `Point` that
//! is either `(int x, int y)` or a single `int` applied to both axes.

use std::collections::BTreeMap;

use crate::error::{DefinitionError, DefinitionResult};
use crate::reference::ReferenceParam;

/// A named set of alternative shapes
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    name: String,
    overloads: Vec<ReferenceParam>,
}

impl TypeDefinition {
    /// Create a type with the given overloads, tried in order
    pub fn new(name: impl Into<String>, overloads: Vec<ReferenceParam>) -> Self {
        Self {
            name: name.into(),
            overloads,
        }
    }

    /// Append an overload
    pub fn with_overload(mut self, overload: ReferenceParam) -> Self {
        self.overloads.push(overload);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn overloads(&self) -> &[ReferenceParam] {
        &self.overloads
    }

    pub(crate) fn overloads_mut(&mut self) -> &mut [ReferenceParam] {
        &mut self.overloads
    }
}

/// Registry of custom types, keyed by exact (case-sensitive) name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDefinitions {
    types: BTreeMap<String, TypeDefinition>,
}

impl TypeDefinitions {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Names must be unique.
    pub fn define(&mut self, definition: TypeDefinition) -> DefinitionResult<()> {
        if self.types.contains_key(definition.name()) {
            return Err(DefinitionError::DuplicateType(definition.name.clone()));
        }
        self.types.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Look up a type by name
    pub fn get(&self, name: &str) -> DefinitionResult<&TypeDefinition> {
        self.types.get(name).ok_or_else(|| DefinitionError::UnknownType {
            name: name.to_string(),
            context: "lookup".to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterate over all types in name order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TypeDefinition> {
        self.types.values_mut()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
