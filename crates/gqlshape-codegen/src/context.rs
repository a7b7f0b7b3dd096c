use crate::document::QueryDocument;
use crate::error::Result;
use crate::generated::GeneratedType;
use crate::registry::TypeRegistry;
use crate::schema::Schema;
use std::collections::HashSet;

/// State of one generation run.
///
/// Borrows the schema and the query document read-only and owns the
/// [`TypeRegistry`], the only state mutated while generating. Each run builds
/// its own context; it is threaded by `&mut` through every generator, so two
/// runs can never share a registry.
#[derive(Debug)]
pub struct GenerationContext<'a> {
    schema: &'a Schema,
    document: &'a QueryDocument,
    pub(crate) registry: TypeRegistry,
    /// Input object types currently being expanded.
    pub(crate) inputs_in_progress: HashSet<String>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(schema: &'a Schema, document: &'a QueryDocument) -> Self {
        GenerationContext {
            schema,
            document,
            registry: TypeRegistry::new(),
            inputs_in_progress: HashSet::new(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn document(&self) -> &'a QueryDocument {
        self.document
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// End the run and hand the registered types on.
    pub fn into_registry(self) -> TypeRegistry {
        self.registry
    }

    /// Register a fully built shape. An explicit name must be free or hold an
    /// identical shape; a default name is deduplicated.
    pub(crate) fn register(
        &mut self,
        ty: GeneratedType,
        explicit_name: bool,
    ) -> Result<&GeneratedType> {
        if explicit_name {
            self.registry.register(ty)
        } else {
            Ok(self.registry.register_deduplicated(ty))
        }
    }
}
