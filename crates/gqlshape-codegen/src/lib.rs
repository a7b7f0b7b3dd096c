//! Derive typed response shapes from a GraphQL schema and a query document.
//!
//! [`generate`] walks every operation of a [`QueryDocument`] against a
//! [`Schema`] and returns the [`GeneratedType`]s that mirror the response,
//! ready for an emitter.

pub mod context;
pub mod document;
pub mod enumeration;
pub mod error;
pub mod field_type;
pub mod fragment;
pub mod generated;
pub mod input;
pub mod object;
pub mod operation;
pub mod polymorphic;
pub mod registry;
pub mod schema;
mod selection;

// Re-export key types at crate root for convenience.
pub use context::GenerationContext;
pub use document::{Operation, OperationKind, QueryDocument, Selection, SelectionSet};
pub use error::{CodegenError, Result};
pub use generated::{
    BaseType, GeneratedEnumValue, GeneratedKind, GeneratedProperty, GeneratedType, PropertyType,
    Variant,
};
pub use operation::{generate_operation, GeneratedOperation};
pub use registry::TypeRegistry;
pub use schema::{ScalarMappings, Schema, SchemaTypeDef, TypeKind};

use serde::Serialize;

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub operations: Vec<GeneratedOperation>,
    /// Every generated type, in registration order.
    pub types: Vec<GeneratedType>,
}

impl Generation {
    pub fn get(&self, name: &str) -> Option<&GeneratedType> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Generate every operation of `document` in one run.
///
/// Stops at the first failing operation.
pub fn generate(schema: &Schema, document: &QueryDocument) -> Result<Generation> {
    let mut ctx = GenerationContext::new(schema, document);
    let operations = document
        .operations()
        .iter()
        .map(|op| generate_operation(&mut ctx, op))
        .collect::<Result<Vec<_>>>()?;
    let types = ctx.into_registry().into_types();
    tracing::debug!(
        operations = operations.len(),
        types = types.len(),
        "Generation finished"
    );
    Ok(Generation { operations, types })
}
