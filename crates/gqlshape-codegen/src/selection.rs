//! Flatten a selection set into the ordered fields of one generated type.

use crate::context::GenerationContext;
use crate::document::{InlineFragment, Selection, SelectionSet};
use crate::error::{CodegenError, Result};
use crate::field_type::resolve_field_type;
use crate::fragment::{check_compatible, covers, find_fragment};
use crate::generated::GeneratedProperty;
use crate::schema::{FieldDef, Schema, TYPENAME_FIELD};
use indexmap::IndexMap;

/// One response key after fragments are expanded and duplicates merged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CollectedField {
    pub name: String,
    /// Type the field was first selected on: the site or a fragment's type
    /// condition.
    pub scope: String,
    /// Every occurrence was under `@skip`/`@include`.
    pub conditional: bool,
    pub selection_set: Option<SelectionSet>,
}

/// Collect the fields a selection on `site` returns, keyed by response key.
///
/// Own fields come first in selection order, then the fields each fragment
/// contributes in fragment order. A fragment is checked against the type it
/// is spread in, and contributes only if it applies to every runtime type of
/// `site`. Repeated response keys merge into the first occurrence.
pub(crate) fn collect_fields(
    ctx: &GenerationContext<'_>,
    site: &str,
    selection_set: &SelectionSet,
) -> Result<IndexMap<String, CollectedField>> {
    let mut out = IndexMap::new();
    collect_into(ctx, site, site, selection_set, false, &mut out)?;
    Ok(out)
}

fn collect_into(
    ctx: &GenerationContext<'_>,
    site: &str,
    scope: &str,
    selection_set: &SelectionSet,
    conditional: bool,
    out: &mut IndexMap<String, CollectedField>,
) -> Result<()> {
    for selection in selection_set {
        if let Selection::Field(field) = selection {
            merge_field(
                site,
                out,
                field.response_key(),
                CollectedField {
                    name: field.name.clone(),
                    scope: scope.to_string(),
                    conditional: conditional || field.conditional,
                    selection_set: field.selection_set.clone(),
                },
            )?;
        }
    }

    for selection in selection_set {
        let (condition, nested, fragment_conditional) = match selection {
            Selection::Field(_) => continue,
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
                check_compatible(ctx.schema(), "inline fragment", condition, scope)?;
                (condition, &inline.selection_set, inline.conditional)
            }
        };
        if !covers(ctx.schema(), condition, site) {
            tracing::trace!(condition, site, "Fragment does not apply here");
            continue;
        }
        collect_into(
            ctx,
            site,
            condition,
            nested,
            conditional || fragment_conditional,
            out,
        )?;
    }
    Ok(())
}

fn merge_field(
    site: &str,
    out: &mut IndexMap<String, CollectedField>,
    key: &str,
    field: CollectedField,
) -> Result<()> {
    let Some(existing) = out.get_mut(key) else {
        out.insert(key.to_string(), field);
        return Ok(());
    };
    if existing.name != field.name {
        return Err(CodegenError::FieldConflict {
            type_name: site.to_string(),
            response_key: key.to_string(),
            first: existing.name.clone(),
            second: field.name,
        });
    }
    let existing_conditional = existing.conditional;
    existing.conditional &= field.conditional;
    if let Some(mut nested) = field.selection_set {
        // Sub-fields of an occurrence the server may drop stay optional in
        // the merged shape.
        if field.conditional {
            nested = mark_conditional(nested);
        }
        match &mut existing.selection_set {
            Some(merged) => {
                if existing_conditional {
                    let taken = std::mem::replace(merged, SelectionSet::new(Vec::new()));
                    *merged = mark_conditional(taken);
                }
                merged.selections.extend(nested.selections);
            }
            None => existing.selection_set = Some(nested),
        }
    }
    Ok(())
}

/// Wrap `selection_set` in an untyped conditional inline fragment, once.
fn mark_conditional(selection_set: SelectionSet) -> SelectionSet {
    if let [Selection::InlineFragment(inline)] = selection_set.selections.as_slice() {
        if inline.conditional && inline.type_condition.is_none() {
            return selection_set;
        }
    }
    SelectionSet::new(vec![Selection::InlineFragment(InlineFragment {
        type_condition: None,
        conditional: true,
        selection_set,
    })])
}

/// Resolve the properties of a type named `type_name` whose declared fields
/// are `fields`.
///
/// A field is resolved against `fields` first, so an object's own (possibly
/// narrower) definition wins over the interface a fragment was written
/// against. Fields a union site only reaches through an interface fragment
/// fall back to that interface's definition.
pub(crate) fn build_properties(
    ctx: &mut GenerationContext<'_>,
    type_name: &str,
    fields: &[FieldDef],
    selection_set: &SelectionSet,
) -> Result<Vec<GeneratedProperty>> {
    let collected = collect_fields(ctx, type_name, selection_set)?;
    let typename = FieldDef::typename();
    let mut properties = Vec::with_capacity(collected.len());
    for (key, field) in collected {
        let def = if field.name == TYPENAME_FIELD {
            &typename
        } else {
            find_field(ctx.schema(), fields, &field).ok_or_else(|| {
                CodegenError::UnknownField {
                    type_name: type_name.to_string(),
                    field: field.name.clone(),
                }
            })?
        };
        let mut ty = resolve_field_type(ctx, def, field.selection_set.as_ref())?;
        if field.conditional {
            ty = ty.into_nullable();
        }
        properties.push(GeneratedProperty {
            name: key,
            field_name: field.name,
            ty,
            description: def.description.clone(),
        });
    }
    Ok(properties)
}

fn find_field<'f>(
    schema: &'f Schema,
    fields: &'f [FieldDef],
    field: &CollectedField,
) -> Option<&'f FieldDef> {
    fields
        .iter()
        .chain(schema.fields_of(&field.scope).unwrap_or_default())
        .find(|f| f.name == field.name)
}
