//! Error types for shape generation.
//!
//! Every [`CodegenError`] is structural: it describes a mismatch between the
//! schema and the query document, and aborts generation of the operation
//! that hit it.

use crate::generated::GeneratedType;
use crate::schema::TypeKind;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = CodegenError> = std::result::Result<T, E>;

/// Errors that can occur while generating shapes for an operation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A field, fragment or operation refers to a type the schema lacks.
    #[error("Unknown type: {name} is not defined in the schema")]
    UnknownType { name: String },
    /// A selection names a field the enclosing type does not define.
    #[error("Unknown field: {type_name} has no field named {field}")]
    UnknownField { type_name: String, field: String },
    /// A composite-typed field was selected without sub-fields.
    #[error("Invalid selection set: {kind} type {type_name} must select at least one field")]
    InvalidSelectionSet { type_name: String, kind: TypeKind },
    /// A spread names a fragment the document does not define.
    #[error("Unknown fragment: {name}")]
    UnknownFragment { name: String },
    /// The document defines two fragments with the same name.
    #[error("Duplicate fragment: {name} is defined more than once")]
    DuplicateFragment { name: String },
    /// A fragment's type condition shares no possible type with the spread site.
    #[error(
        "Incompatible fragment: {fragment} on {type_condition} cannot be spread within {enclosing}"
    )]
    IncompatibleFragment {
        fragment: String,
        type_condition: String,
        enclosing: String,
    },
    /// A fragment reaches itself through its own spreads.
    #[error("Fragment cycle: {}", .path.join(" -> "))]
    FragmentCycle { path: Vec<String> },
    /// One response key selects two different schema fields.
    #[error(
        "Field conflict on {type_name}: response key {response_key} selects both {first} and {second}"
    )]
    FieldConflict {
        type_name: String,
        response_key: String,
        first: String,
        second: String,
    },
    /// A type of the wrong kind for its position: an input object under a
    /// selected field, or an output type on a variable.
    #[error("Unexpected {kind} type {type_name} for {position}")]
    UnexpectedTypeKind {
        type_name: String,
        kind: TypeKind,
        position: String,
    },
    /// An interface or union selection with type-specific fragments does not
    /// select `__typename`, so a response cannot be told apart by type.
    #[error(
        "Missing __typename: {type_name} has type-specific selections and must select __typename"
    )]
    MissingTypename { type_name: String },
    /// Two structurally different shapes were registered under one name.
    #[error(
        "Generated type name collision on {name}: {} conflicts with {}",
        .existing.summary(),
        .conflicting.summary()
    )]
    NameCollision {
        name: String,
        existing: Box<GeneratedType>,
        conflicting: Box<GeneratedType>,
    },
    /// The query document failed to parse.
    #[error("Syntax errors in query document: {}", .messages.join("; "))]
    Syntax { messages: Vec<String> },
}
