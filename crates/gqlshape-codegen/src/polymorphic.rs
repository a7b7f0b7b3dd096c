//! Shapes for interface and union typed selections.
//!
//! A selection on an abstract type is split into the part every runtime type
//! returns and the fragments that only some runtime types match. The shared
//! part becomes the properties of the interface/union shape; each runtime type
//! that selects anything gets its own object shape, listed as a variant.

use crate::context::GenerationContext;
use crate::document::{InlineFragment, Selection, SelectionSet};
use crate::error::{CodegenError, Result};
use crate::fragment::{check_compatible, covers, find_fragment};
use crate::generated::{GeneratedKind, GeneratedType, Variant};
use crate::object::generate_object_type;
use crate::schema::{FieldDef, InterfaceDef, SchemaTypeDef, TypeKind, UnionDef, TYPENAME_FIELD};
use crate::selection::{build_properties, collect_fields};
use indexmap::IndexMap;

pub fn generate_interface_type<'c>(
    ctx: &'c mut GenerationContext<'_>,
    def: &InterfaceDef,
    selection_set: Option<&SelectionSet>,
    name_override: Option<&str>,
) -> Result<&'c GeneratedType> {
    let site = Site {
        name: &def.name,
        kind: TypeKind::Interface,
        description: def.description.as_deref(),
        fields: &def.fields,
    };
    generate_abstract(ctx, site, selection_set, name_override)
}

/// Unions declare no fields, so only `__typename` can be selected outside a
/// fragment.
pub fn generate_union_type<'c>(
    ctx: &'c mut GenerationContext<'_>,
    def: &UnionDef,
    selection_set: Option<&SelectionSet>,
    name_override: Option<&str>,
) -> Result<&'c GeneratedType> {
    let site = Site {
        name: &def.name,
        kind: TypeKind::Union,
        description: def.description.as_deref(),
        fields: &[],
    };
    generate_abstract(ctx, site, selection_set, name_override)
}

struct Site<'s> {
    name: &'s str,
    kind: TypeKind,
    description: Option<&'s str>,
    fields: &'s [FieldDef],
}

fn generate_abstract<'c>(
    ctx: &'c mut GenerationContext<'_>,
    site: Site<'_>,
    selection_set: Option<&SelectionSet>,
    name_override: Option<&str>,
) -> Result<&'c GeneratedType> {
    let selection_set = selection_set
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CodegenError::InvalidSelectionSet {
            type_name: site.name.to_string(),
            kind: site.kind,
        })?;

    let mut branches: IndexMap<String, Vec<Selection>> = IndexMap::new();
    let common = split(ctx, site.name, site.name, selection_set, false, &mut branches)?;
    let properties = build_properties(ctx, site.name, site.fields, &common)?;

    let variants = if branches.is_empty() {
        Vec::new()
    } else {
        require_typename(ctx, site.name, &common)?;
        generate_variants(ctx, site.name, &common, branches)?
    };
    let kind = match site.kind {
        TypeKind::Union => GeneratedKind::Union { variants },
        _ => GeneratedKind::Interface { variants },
    };

    let ty = GeneratedType {
        name: name_override.unwrap_or(site.name).to_string(),
        schema_type: site.name.to_string(),
        kind,
        description: site.description.map(String::from),
        properties,
    };
    ctx.register(ty, name_override.is_some())
}

/// Variants are told apart by the `__typename` response key, so the common
/// selection must always return it.
fn require_typename(ctx: &GenerationContext<'_>, site: &str, common: &SelectionSet) -> Result<()> {
    let collected = collect_fields(ctx, site, common)?;
    match collected.get(TYPENAME_FIELD) {
        Some(field) if field.name == TYPENAME_FIELD && !field.conditional => Ok(()),
        _ => Err(CodegenError::MissingTypename {
            type_name: site.to_string(),
        }),
    }
}

/// One object shape per runtime type of `site` that selects anything, in the
/// schema's order of possible types.
fn generate_variants(
    ctx: &mut GenerationContext<'_>,
    site: &str,
    common: &SelectionSet,
    mut branches: IndexMap<String, Vec<Selection>>,
) -> Result<Vec<Variant>> {
    let schema = ctx.schema();
    let mut variants = Vec::new();
    for typename in schema.possible_types(site) {
        let mut selections = common.selections.clone();
        selections.extend(branches.shift_remove(typename).unwrap_or_default());
        if selections.is_empty() {
            continue;
        }
        let SchemaTypeDef::Object(object) = schema.resolve(typename)? else {
            continue;
        };
        let selection_set = SelectionSet::new(selections);
        let generated = generate_object_type(ctx, object, Some(&selection_set), None)?;
        variants.push(Variant {
            typename: typename.to_string(),
            type_name: generated.name.clone(),
        });
    }
    Ok(variants)
}

/// Separate the selections every runtime type of `site` returns from the
/// fragments only some of them match.
///
/// Fragments that cover `site` stay in the returned set, with their own
/// selections split the same way. The rest are appended to `branches` under
/// each runtime type they match.
fn split(
    ctx: &GenerationContext<'_>,
    site: &str,
    scope: &str,
    selection_set: &SelectionSet,
    conditional: bool,
    branches: &mut IndexMap<String, Vec<Selection>>,
) -> Result<SelectionSet> {
    let schema = ctx.schema();
    let mut common = Vec::new();
    for selection in selection_set {
        let (condition, nested, fragment_conditional) = match selection {
            Selection::Field(_) => {
                common.push(selection.clone());
                continue;
            }
            Selection::FragmentSpread(spread) => {
                let fragment = find_fragment(ctx, &spread.name, scope)?;
                (
                    fragment.type_condition.as_str(),
                    &fragment.selection_set,
                    spread.conditional,
                )
            }
            Selection::InlineFragment(inline) => {
                let condition = inline.type_condition.as_deref().unwrap_or(scope);
                check_compatible(schema, "inline fragment", condition, scope)?;
                (condition, &inline.selection_set, inline.conditional)
            }
        };

        if covers(schema, condition, site) {
            let inner = split(
                ctx,
                site,
                condition,
                nested,
                conditional || fragment_conditional,
                branches,
            )?;
            common.push(Selection::InlineFragment(InlineFragment {
                type_condition: Some(condition.to_string()),
                conditional: fragment_conditional,
                selection_set: inner,
            }));
            continue;
        }

        let matching = schema.possible_types(condition);
        for typename in schema.possible_types(site) {
            if !matching.contains(&typename) {
                continue;
            }
            branches
                .entry(typename.to_string())
                .or_default()
                .push(Selection::InlineFragment(InlineFragment {
                    type_condition: Some(condition.to_string()),
                    conditional: conditional || fragment_conditional,
                    selection_set: nested.clone(),
                }));
        }
    }
    Ok(SelectionSet::new(common))
}
