//! Client query documents: operations, fragments and selection sets.

use crate::error::{CodegenError, Result};
use crate::schema::{extract_name, extract_type, GqlType};
use apollo_parser::cst::{self, CstNode};
use apollo_parser::Parser;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

/// Which root type an operation executes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub(crate) fn from_cst(op: &cst::OperationType) -> Self {
        if op.mutation_token().is_some() {
            OperationKind::Mutation
        } else if op.subscription_token().is_some() {
            OperationKind::Subscription
        } else {
            OperationKind::Query
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        })
    }
}

/// An ordered list of selections. Order decides property order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
}

impl SelectionSet {
    pub fn new(selections: Vec<Selection>) -> Self {
        SelectionSet { selections }
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
        self.selections.iter()
    }

    /// Names of every fragment spread anywhere in this selection tree, in
    /// encounter order, without expanding the fragments themselves.
    pub fn fragment_spreads(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_spreads(self, &mut out);
        out
    }
}

fn collect_spreads<'s>(selection_set: &'s SelectionSet, out: &mut Vec<&'s str>) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                if let Some(nested) = &field.selection_set {
                    collect_spreads(nested, out);
                }
            }
            Selection::FragmentSpread(spread) => out.push(&spread.name),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, out),
        }
    }
}

impl<'s> IntoIterator for &'s SelectionSet {
    type Item = &'s Selection;
    type IntoIter = std::slice::Iter<'s, Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.selections.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub alias: Option<String>,
    pub name: String,
    /// Carries `@skip` or `@include`, so the server may omit it.
    pub conditional: bool,
    pub selection_set: Option<SelectionSet>,
}

impl FieldSelection {
    /// Key under which the server returns this field.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpread {
    pub name: String,
    pub conditional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub conditional: bool,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub ty: GqlType,
    pub has_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: Option<String>,
    pub kind: OperationKind,
    pub variables: Vec<VariableDef>,
    pub selection_set: SelectionSet,
    /// The operation's own text, without the fragments it uses.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDef {
    pub name: String,
    pub type_condition: String,
    pub selection_set: SelectionSet,
    pub source: String,
}

/// A parsed executable document.
#[derive(Debug, Clone, Default)]
pub struct QueryDocument {
    operations: Vec<Operation>,
    fragments: IndexMap<String, FragmentDef>,
}

impl QueryDocument {
    /// Parse executable GraphQL text. Unlike schema parsing, any syntax error
    /// is fatal: a damaged selection set would produce a wrong shape.
    pub fn parse(text: &str) -> Result<QueryDocument> {
        let tree = Parser::new(text).parse();
        let messages: Vec<String> = tree.errors().map(|e| e.message().to_string()).collect();
        if !messages.is_empty() {
            return Err(CodegenError::Syntax { messages });
        }

        let mut document = QueryDocument::default();
        for def in tree.document().definitions() {
            match def {
                cst::Definition::OperationDefinition(op) => {
                    document.operations.push(extract_operation(&op));
                }
                cst::Definition::FragmentDefinition(f) => {
                    let fragment = extract_fragment(&f);
                    if document.fragments.contains_key(&fragment.name) {
                        return Err(CodegenError::DuplicateFragment {
                            name: fragment.name,
                        });
                    }
                    document.fragments.insert(fragment.name.clone(), fragment);
                }
                _ => {}
            }
        }

        tracing::debug!(
            operations = document.operations.len(),
            fragments = document.fragments.len(),
            "Parsed query document"
        );
        Ok(document)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.name.as_deref() == Some(name))
    }

    pub fn fragment(&self, name: &str) -> Option<&FragmentDef> {
        self.fragments.get(name)
    }

    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDef> {
        self.fragments.values()
    }

    /// The text a client sends for `operation`: the operation followed by
    /// every fragment it transitively reaches, each once, in reach order.
    pub fn operation_source(&self, operation: &Operation) -> String {
        let mut reached: IndexSet<&str> = IndexSet::new();
        let mut pending: Vec<&str> = operation.selection_set.fragment_spreads();
        pending.reverse();
        while let Some(name) = pending.pop() {
            if !reached.insert(name) {
                continue;
            }
            if let Some(fragment) = self.fragments.get(name) {
                let mut nested = fragment.selection_set.fragment_spreads();
                nested.reverse();
                pending.extend(nested);
            }
        }

        let mut source = operation.source.clone();
        for name in reached {
            if let Some(fragment) = self.fragments.get(name) {
                source.push_str("\n\n");
                source.push_str(&fragment.source);
            }
        }
        source
    }
}

fn is_conditional(directives: &Option<cst::Directives>) -> bool {
    directives.as_ref().is_some_and(|d| {
        d.directives().any(|directive| {
            matches!(
                extract_name(&directive.name()).as_str(),
                "skip" | "include"
            )
        })
    })
}

fn extract_operation(op: &cst::OperationDefinition) -> Operation {
    let variables = op
        .variable_definitions()
        .map(|vds| {
            vds.variable_definitions()
                .map(|vd| VariableDef {
                    name: vd
                        .variable()
                        .map(|v| extract_name(&v.name()))
                        .unwrap_or_default(),
                    ty: extract_type(&vd.ty()),
                    has_default: vd.default_value().is_some(),
                })
                .collect()
        })
        .unwrap_or_default();

    Operation {
        name: op.name().map(|n| n.text().to_string()),
        kind: op
            .operation_type()
            .map(|t| OperationKind::from_cst(&t))
            .unwrap_or(OperationKind::Query),
        variables,
        selection_set: extract_selection_set(&op.selection_set()).unwrap_or_default(),
        source: op.source_string().trim().to_string(),
    }
}

fn extract_fragment(f: &cst::FragmentDefinition) -> FragmentDef {
    FragmentDef {
        name: f
            .fragment_name()
            .map(|n| extract_name(&n.name()))
            .unwrap_or_default(),
        type_condition: f
            .type_condition()
            .and_then(|tc| tc.named_type())
            .map(|nt| extract_name(&nt.name()))
            .unwrap_or_default(),
        selection_set: extract_selection_set(&f.selection_set()).unwrap_or_default(),
        source: f.source_string().trim().to_string(),
    }
}

fn extract_selection_set(selection_set: &Option<cst::SelectionSet>) -> Option<SelectionSet> {
    let ss = selection_set.as_ref()?;
    let selections = ss
        .selections()
        .map(|selection| match selection {
            cst::Selection::Field(field) => Selection::Field(FieldSelection {
                alias: field.alias().map(|a| extract_name(&a.name())),
                name: extract_name(&field.name()),
                conditional: is_conditional(&field.directives()),
                selection_set: extract_selection_set(&field.selection_set()),
            }),
            cst::Selection::FragmentSpread(spread) => Selection::FragmentSpread(FragmentSpread {
                name: spread
                    .fragment_name()
                    .map(|n| extract_name(&n.name()))
                    .unwrap_or_default(),
                conditional: is_conditional(&spread.directives()),
            }),
            cst::Selection::InlineFragment(inline) => {
                Selection::InlineFragment(InlineFragment {
                    type_condition: inline
                        .type_condition()
                        .and_then(|tc| tc.named_type())
                        .map(|nt| extract_name(&nt.name())),
                    conditional: is_conditional(&inline.directives()),
                    selection_set: extract_selection_set(&inline.selection_set())
                        .unwrap_or_default(),
                })
            }
        })
        .collect();
    Some(SelectionSet { selections })
}
