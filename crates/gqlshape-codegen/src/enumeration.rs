use crate::context::GenerationContext;
use crate::error::Result;
use crate::generated::{GeneratedEnumValue, GeneratedKind, GeneratedType};
use crate::schema::EnumDef;

/// Register the enum alias for `def` under the enum's own name, or return the
/// one already registered.
pub fn generate_enum_type<'c>(
    ctx: &'c mut GenerationContext<'_>,
    def: &EnumDef,
) -> Result<&'c GeneratedType> {
    let values = def
        .values
        .iter()
        .map(|v| GeneratedEnumValue {
            name: v.name.clone(),
            description: v.description.clone(),
        })
        .collect();
    let ty = GeneratedType {
        name: def.name.clone(),
        schema_type: def.name.clone(),
        kind: GeneratedKind::Enum { values },
        description: def.description.clone(),
        properties: Vec::new(),
    };
    ctx.register(ty, true)
}
