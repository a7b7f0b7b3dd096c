//! Fragment lookup, type-condition compatibility and cycle detection.

use crate::context::GenerationContext;
use crate::document::{FragmentDef, QueryDocument, SelectionSet};
use crate::error::{CodegenError, Result};
use crate::schema::Schema;
use std::collections::HashSet;

/// Look up fragment `name` for a spread inside a selection on `enclosing`.
pub fn find_fragment<'a>(
    ctx: &GenerationContext<'a>,
    name: &str,
    enclosing: &str,
) -> Result<&'a FragmentDef> {
    let fragment = ctx
        .document()
        .fragment(name)
        .ok_or_else(|| CodegenError::UnknownFragment {
            name: name.to_string(),
        })?;
    check_compatible(ctx.schema(), name, &fragment.type_condition, enclosing)?;
    Ok(fragment)
}

/// A fragment on `type_condition` applies inside `enclosing` when both are
/// the same type or share at least one possible runtime type.
pub fn check_compatible(
    schema: &Schema,
    fragment: &str,
    type_condition: &str,
    enclosing: &str,
) -> Result<()> {
    schema.resolve(type_condition)?;
    if type_condition == enclosing {
        return Ok(());
    }
    let enclosing_types = schema.possible_types(enclosing);
    let compatible = schema
        .possible_types(type_condition)
        .iter()
        .any(|t| enclosing_types.contains(t));
    if compatible {
        Ok(())
    } else {
        Err(CodegenError::IncompatibleFragment {
            fragment: fragment.to_string(),
            type_condition: type_condition.to_string(),
            enclosing: enclosing.to_string(),
        })
    }
}

/// Whether a fragment on `condition` applies to every runtime type of `site`.
pub(crate) fn covers(schema: &Schema, condition: &str, site: &str) -> bool {
    if condition == site {
        return true;
    }
    let condition_types = schema.possible_types(condition);
    let site_types = schema.possible_types(site);
    !site_types.is_empty() && site_types.iter().all(|t| condition_types.contains(t))
}

/// Reject any fragment reachable from `selection_set` that reaches itself.
///
/// Spreads nested under fields count: `fragment A on User { friends { ...A } }`
/// is a cycle. Unknown fragment names are skipped here and reported when the
/// spread is expanded.
pub fn check_fragment_cycles(document: &QueryDocument, selection_set: &SelectionSet) -> Result<()> {
    let mut in_progress: Vec<&str> = Vec::new();
    let mut done: HashSet<&str> = HashSet::new();
    for name in selection_set.fragment_spreads() {
        visit(document, name, &mut in_progress, &mut done)?;
    }
    Ok(())
}

fn visit<'d>(
    document: &'d QueryDocument,
    name: &'d str,
    in_progress: &mut Vec<&'d str>,
    done: &mut HashSet<&'d str>,
) -> Result<()> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = in_progress.iter().position(|n| *n == name) {
        let mut path: Vec<String> = in_progress[start..].iter().map(|n| n.to_string()).collect();
        path.push(name.to_string());
        return Err(CodegenError::FragmentCycle { path });
    }
    let Some(fragment) = document.fragment(name) else {
        return Ok(());
    };

    in_progress.push(name);
    for spread in fragment.selection_set.fragment_spreads() {
        visit(document, spread, in_progress, done)?;
    }
    in_progress.pop();
    done.insert(name);
    Ok(())
}
