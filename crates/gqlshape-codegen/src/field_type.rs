//! Resolve a schema field's type reference into a property type.

use crate::context::GenerationContext;
use crate::document::SelectionSet;
use crate::enumeration::generate_enum_type;
use crate::error::{CodegenError, Result};
use crate::generated::{BaseType, PropertyType};
use crate::object::generate_object_type;
use crate::polymorphic::{generate_interface_type, generate_union_type};
use crate::schema::{FieldDef, GqlType, SchemaTypeDef, TypeKind};

/// Resolve `field` as selected with `selection_set`.
///
/// Scalars map through the schema's scalar table and ignore any selection
/// set. Enums resolve to their (shared) enum type. Objects, interfaces and
/// unions recurse into their generator with `selection_set`, which must be
/// non-empty.
pub fn resolve_field_type(
    ctx: &mut GenerationContext<'_>,
    field: &FieldDef,
    selection_set: Option<&SelectionSet>,
) -> Result<PropertyType> {
    let schema = ctx.schema();
    let base = match schema.resolve(field.ty.base_name())? {
        SchemaTypeDef::Scalar(scalar) => BaseType::Scalar {
            name: scalar.name.clone(),
            host: schema.scalar_mapping(&scalar.name).to_string(),
        },
        SchemaTypeDef::Enum(def) => BaseType::Generated {
            name: generate_enum_type(ctx, def)?.name.clone(),
        },
        SchemaTypeDef::Object(def) => BaseType::Generated {
            name: generate_object_type(ctx, def, selection_set, None)?
                .name
                .clone(),
        },
        SchemaTypeDef::Interface(def) => BaseType::Generated {
            name: generate_interface_type(ctx, def, selection_set, None)?
                .name
                .clone(),
        },
        SchemaTypeDef::Union(def) => BaseType::Generated {
            name: generate_union_type(ctx, def, selection_set, None)?
                .name
                .clone(),
        },
        SchemaTypeDef::InputObject(def) => {
            return Err(CodegenError::UnexpectedTypeKind {
                type_name: def.name.clone(),
                kind: TypeKind::InputObject,
                position: format!("selected field {}", field.name),
            });
        }
    };
    Ok(wrap(&field.ty, base))
}

/// Reapply the list and non-null layers of `ty` around `base`.
///
/// GraphQL types are nullable unless wrapped in non-null, so each layer
/// starts nullable and a `NonNull` wrapper clears the flag of the layer it
/// wraps.
pub(crate) fn wrap(ty: &GqlType, base: BaseType) -> PropertyType {
    wrap_layer(ty, base, true)
}

fn wrap_layer(ty: &GqlType, base: BaseType, nullable: bool) -> PropertyType {
    match ty {
        GqlType::Named(_) => PropertyType::Named { base, nullable },
        GqlType::NonNull(inner) => wrap_layer(inner, base, false),
        GqlType::List(inner) => PropertyType::List {
            element: Box::new(wrap_layer(inner, base, true)),
            nullable,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> GqlType {
        GqlType::Named(name.to_string())
    }

    fn non_null(inner: GqlType) -> GqlType {
        GqlType::NonNull(Box::new(inner))
    }

    fn list(inner: GqlType) -> GqlType {
        GqlType::List(Box::new(inner))
    }

    fn string() -> BaseType {
        BaseType::Scalar {
            name: "String".to_string(),
            host: "String".to_string(),
        }
    }

    #[test]
    fn wrap_named() {
        assert_eq!(
            wrap(&named("String"), string()),
            PropertyType::scalar("String", "String", true)
        );
        assert_eq!(
            wrap(&non_null(named("String")), string()),
            PropertyType::scalar("String", "String", false)
        );
    }

    #[test]
    fn wrap_nested_lists() {
        let ty = non_null(list(list(non_null(named("String")))));
        let wrapped = wrap(&ty, string());
        assert_eq!(wrapped.to_string(), "[[String!]]!");
    }
}
