use crate::context::GenerationContext;
use crate::document::SelectionSet;
use crate::error::{CodegenError, Result};
use crate::generated::{GeneratedKind, GeneratedType};
use crate::schema::{ObjectDef, TypeKind};
use crate::selection::build_properties;

/// Generate and register the shape of a selection on an object type.
///
/// The shape is named `name_override` when given, else the object's own
/// name. Own fields come first, then fragment fields in fragment order. Every
/// nested composite field is generated before this type is registered, so a
/// failure leaves no entry for it.
pub fn generate_object_type<'c>(
    ctx: &'c mut GenerationContext<'_>,
    object: &ObjectDef,
    selection_set: Option<&SelectionSet>,
    name_override: Option<&str>,
) -> Result<&'c GeneratedType> {
    let selection_set = selection_set
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CodegenError::InvalidSelectionSet {
            type_name: object.name.clone(),
            kind: TypeKind::Object,
        })?;

    let properties = build_properties(ctx, &object.name, &object.fields, selection_set)?;
    let ty = GeneratedType {
        name: name_override.unwrap_or(&object.name).to_string(),
        schema_type: object.name.clone(),
        kind: GeneratedKind::Object,
        description: object.description.clone(),
        properties,
    };
    ctx.register(ty, name_override.is_some())
}
