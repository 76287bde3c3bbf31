//! Memoizing registry for generated GraphQL types.
//!
//! GraphQL forbids two types with the same name, so every generated type is
//! registered here exactly once. Each name carries a structural fingerprint;
//! asking for an existing name with the same fingerprint is a cache hit,
//! a different fingerprint is a [`SchemaError::ConflictingTypeDefinition`].
//!
//! Names stay reserved while their type is being built, which lets
//! self-referencing entities resolve to a forward reference by name.

use std::collections::{HashMap, HashSet};

use async_graphql::dynamic::{InputObject, Object, SchemaBuilder};
use indexmap::IndexMap;
use tracing::trace;

use crate::error::SchemaError;

/// Result of reserving a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The name was free; the caller must build and finish the type.
    Build,
    /// A structurally identical type is registered or under construction.
    Existing,
}

/// Registry for tracking generated GraphQL types.
#[derive(Default)]
pub struct TypeRegistry {
    /// Fingerprints of every reserved name.
    fingerprints: HashMap<String, String>,
    /// Types currently being generated (for cycle detection).
    generating: HashSet<String>,
    /// Finished output types, in completion order.
    objects: IndexMap<String, Object>,
    /// Finished input types, in completion order.
    inputs: IndexMap<String, InputObject>,
}

impl TypeRegistry {
    /// Creates a new empty type registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `name` for a type with the given fingerprint.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ConflictingTypeDefinition` if the name is
    /// already taken by a structurally different type.
    pub fn reserve(&mut self, name: &str, fingerprint: String) -> Result<Reservation, SchemaError> {
        if let Some(existing) = self.fingerprints.get(name) {
            if *existing == fingerprint {
                trace!(type_name = %name, "Type registry hit");
                return Ok(Reservation::Existing);
            }
            return Err(SchemaError::ConflictingTypeDefinition(name.to_string()));
        }

        self.fingerprints.insert(name.to_string(), fingerprint);
        self.generating.insert(name.to_string());
        Ok(Reservation::Build)
    }

    /// Checks if a type is currently being generated.
    pub fn is_generating(&self, name: &str) -> bool {
        self.generating.contains(name)
    }

    /// Checks if a type name has been reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.fingerprints.contains_key(name)
    }

    /// Marks an output type as fully generated and stores it.
    pub fn finish_object(&mut self, name: &str, object: Object) {
        self.generating.remove(name);
        self.objects.insert(name.to_string(), object);
    }

    /// Marks an input type as fully generated and stores it.
    pub fn finish_input(&mut self, name: &str, input: InputObject) {
        self.generating.remove(name);
        self.inputs.insert(name.to_string(), input);
    }

    /// Number of finished output types.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of finished input types.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Registers every finished type with the schema builder.
    pub fn register_all(self, mut builder: SchemaBuilder) -> SchemaBuilder {
        for (_, object) in self.objects {
            builder = builder.register(object);
        }
        for (_, input) in self.inputs {
            builder = builder.register(input);
        }
        builder
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("objects", &self.objects.keys().collect::<Vec<_>>())
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("generating", &self.generating)
            .finish()
    }
}
