use crate::context::GenerationContext;
use crate::document::{Operation, OperationKind};
use crate::error::{CodegenError, Result};
use crate::fragment::check_fragment_cycles;
use crate::generated::GeneratedProperty;
use crate::input::generate_variables;
use crate::object::generate_object_type;
use crate::schema::SchemaTypeDef;
use heck::ToUpperCamelCase;
use serde::Serialize;

/// What the emitter needs to know about one generated operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedOperation {
    pub name: Option<String>,
    pub kind: OperationKind,
    /// Generated type of the operation's `data` object.
    pub data_type: String,
    pub variables: Vec<GeneratedProperty>,
    /// Operation text plus every fragment it uses.
    pub source: String,
}

/// Generate every type `operation` needs.
///
/// The root shape is named `<Operation>Data`, or `<RootType>Data` for an
/// anonymous operation. If anything fails, every type registered for this
/// operation is dropped again.
pub fn generate_operation(
    ctx: &mut GenerationContext<'_>,
    operation: &Operation,
) -> Result<GeneratedOperation> {
    let label = operation.name.as_deref().unwrap_or("<anonymous>");
    let span = tracing::debug_span!("operation", name = label, kind = %operation.kind);
    let _guard = span.enter();

    let mark = ctx.registry().len();
    let result = generate_operation_inner(ctx, operation);
    match &result {
        Ok(generated) => {
            tracing::debug!(data_type = %generated.data_type, "Generated operation");
        }
        Err(err) => {
            tracing::debug!(error = %err, "Operation failed, rolling back");
            ctx.registry.truncate(mark);
        }
    }
    result
}

fn generate_operation_inner(
    ctx: &mut GenerationContext<'_>,
    operation: &Operation,
) -> Result<GeneratedOperation> {
    let schema = ctx.schema();
    let document = ctx.document();
    check_fragment_cycles(document, &operation.selection_set)?;

    let root_name = schema.root_type_name(operation.kind);
    let root = match schema.resolve(root_name)? {
        SchemaTypeDef::Object(root) => root,
        other => {
            return Err(CodegenError::UnexpectedTypeKind {
                type_name: root_name.to_string(),
                kind: other.kind(),
                position: format!("{} root", operation.kind),
            });
        }
    };

    let data_type = format!(
        "{}Data",
        operation
            .name
            .as_deref()
            .unwrap_or(root_name)
            .to_upper_camel_case()
    );
    let data_type = generate_object_type(
        ctx,
        root,
        Some(&operation.selection_set),
        Some(&data_type),
    )?
    .name
    .clone();
    let variables = generate_variables(ctx, &operation.variables)?;

    Ok(GeneratedOperation {
        name: operation.name.clone(),
        kind: operation.kind,
        data_type,
        variables,
        source: document.operation_source(operation),
    })
}

