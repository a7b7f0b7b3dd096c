//! Per-run table of generated types.

use crate::error::{CodegenError, Result};
use crate::generated::GeneratedType;
use indexmap::IndexMap;

/// Maps generated type names to their shapes, in registration order.
///
/// Within one run a name maps to exactly one shape. Registering an identical
/// shape again returns the existing entry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, GeneratedType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ty` under its own name.
    ///
    /// Fails with [`CodegenError::NameCollision`] if a different shape
    /// already holds the name.
    pub fn register(&mut self, ty: GeneratedType) -> Result<&GeneratedType> {
        if let Some(existing) = self.types.get(&ty.name) {
            if *existing != ty {
                return Err(CodegenError::NameCollision {
                    name: ty.name.clone(),
                    existing: Box::new(existing.clone()),
                    conflicting: Box::new(ty),
                });
            }
            tracing::trace!(name = %ty.name, "Reusing generated type");
        } else {
            tracing::debug!(name = %ty.name, "Registered generated type");
        }
        Ok(self.types.entry(ty.name.clone()).or_insert(ty))
    }

    /// Register `ty` under its name or, if a different shape holds it, under
    /// the first of `Name2`, `Name3`, ... that is free or holds an identical
    /// shape.
    ///
    /// Nested shapes are registered before the shape that contains them, so
    /// the plain name goes to the first completed shape, which is the
    /// innermost one: in `viewer { id manager { id } }` the `manager` shape
    /// is `User` and the `viewer` shape is `User2`. Names depend only on the
    /// document, never on earlier runs.
    pub fn register_deduplicated(&mut self, mut ty: GeneratedType) -> &GeneratedType {
        let base = ty.name.clone();
        let mut suffix = 1;
        loop {
            match self.types.get(&ty.name) {
                Some(existing) if *existing != ty => {
                    suffix += 1;
                    ty.name = format!("{}{}", base, suffix);
                }
                Some(_) => {
                    tracing::trace!(name = %ty.name, "Reusing generated type");
                    break;
                }
                None => {
                    tracing::debug!(name = %ty.name, "Registered generated type");
                    break;
                }
            }
        }
        self.types.entry(ty.name.clone()).or_insert(ty)
    }

    pub fn lookup(&self, name: &str) -> Option<&GeneratedType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Every registered type, in registration order.
    pub fn all_types(&self) -> impl Iterator<Item = &GeneratedType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Drop every type registered after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.types.truncate(len);
    }

    pub fn into_types(self) -> Vec<GeneratedType> {
        self.types.into_values().collect()
    }
}
