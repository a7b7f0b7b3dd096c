//! Operation variables and the input object types they reference.

use crate::context::GenerationContext;
use crate::document::VariableDef;
use crate::enumeration::generate_enum_type;
use crate::error::{CodegenError, Result};
use crate::field_type::wrap;
use crate::generated::{BaseType, GeneratedKind, GeneratedProperty, GeneratedType, PropertyType};
use crate::schema::{GqlType, InputDef, SchemaTypeDef};

/// Resolve an operation's variables, in declaration order.
///
/// A variable with a default value may be omitted by the client, so it is
/// nullable whatever its declared type.
pub fn generate_variables(
    ctx: &mut GenerationContext<'_>,
    variables: &[VariableDef],
) -> Result<Vec<GeneratedProperty>> {
    variables
        .iter()
        .map(|var| {
            let position = format!("variable ${}", var.name);
            let mut ty = resolve_input_type(ctx, &var.ty, &position)?;
            if var.has_default {
                ty = ty.into_nullable();
            }
            Ok(GeneratedProperty {
                name: var.name.clone(),
                field_name: var.name.clone(),
                ty,
                description: None,
            })
        })
        .collect()
}

fn resolve_input_type(
    ctx: &mut GenerationContext<'_>,
    ty: &GqlType,
    position: &str,
) -> Result<PropertyType> {
    let schema = ctx.schema();
    let base = match schema.resolve(ty.base_name())? {
        SchemaTypeDef::Scalar(scalar) => BaseType::Scalar {
            name: scalar.name.clone(),
            host: schema.scalar_mapping(&scalar.name).to_string(),
        },
        SchemaTypeDef::Enum(def) => BaseType::Generated {
            name: generate_enum_type(ctx, def)?.name.clone(),
        },
        SchemaTypeDef::InputObject(def) => BaseType::Generated {
            name: generate_input_type(ctx, def)?,
        },
        other => {
            return Err(CodegenError::UnexpectedTypeKind {
                type_name: other.name().to_string(),
                kind: other.kind(),
                position: position.to_string(),
            });
        }
    };
    Ok(wrap(ty, base))
}

/// Register the input object `def` with every input field, recursively.
///
/// Input types may refer to themselves (`input Filter { and: [Filter!] }`);
/// a type already being expanded is referenced by name.
fn generate_input_type(ctx: &mut GenerationContext<'_>, def: &InputDef) -> Result<String> {
    if ctx.inputs_in_progress.contains(&def.name) || ctx.registry.contains(&def.name) {
        return Ok(def.name.clone());
    }

    ctx.inputs_in_progress.insert(def.name.clone());
    let properties = def
        .fields
        .iter()
        .map(|field| {
            let position = format!("input field {}.{}", def.name, field.name);
            Ok(GeneratedProperty {
                name: field.name.clone(),
                field_name: field.name.clone(),
                ty: resolve_input_type(ctx, &field.ty, &position)?,
                description: field.description.clone(),
            })
        })
        .collect::<Result<Vec<_>>>();
    ctx.inputs_in_progress.remove(&def.name);

    let ty = GeneratedType {
        name: def.name.clone(),
        schema_type: def.name.clone(),
        kind: GeneratedKind::InputObject,
        description: def.description.clone(),
        properties: properties?,
    };
    Ok(ctx.register(ty, true)?.name.clone())
}
