//! Read-only index over a GraphQL schema's type system.
//!
//! Built once per run from SDL text and never mutated during generation.

use crate::document::OperationKind;
use crate::error::{CodegenError, Result};
use apollo_parser::cst;
use apollo_parser::Parser;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// What kind of GraphQL type a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Scalar,
    Enum,
    Object,
    InputObject,
    Interface,
    Union,
}

impl TypeKind {
    /// Object, interface and union types require a sub-selection.
    pub fn is_composite(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface | TypeKind::Union)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Enum => "enum",
            TypeKind::Object => "object",
            TypeKind::InputObject => "input object",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
        };
        f.write_str(tag)
    }
}

/// A field (or input field) declared on a schema type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: GqlType,
}

impl FieldDef {
    /// The `__typename` meta-field every composite type exposes.
    pub fn typename() -> Self {
        FieldDef {
            name: TYPENAME_FIELD.to_string(),
            description: None,
            ty: GqlType::NonNull(Box::new(GqlType::Named("String".to_string()))),
        }
    }
}

/// Name of the introspection meta-field allowed on every composite type.
pub const TYPENAME_FIELD: &str = "__typename";

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDef {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDef {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDef {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarDef {
    pub name: String,
    pub description: Option<String>,
}

/// A named schema type.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTypeDef {
    Scalar(ScalarDef),
    Enum(EnumDef),
    Object(ObjectDef),
    InputObject(InputDef),
    Interface(InterfaceDef),
    Union(UnionDef),
}

impl SchemaTypeDef {
    pub fn name(&self) -> &str {
        match self {
            SchemaTypeDef::Scalar(s) => &s.name,
            SchemaTypeDef::Enum(e) => &e.name,
            SchemaTypeDef::Object(o) => &o.name,
            SchemaTypeDef::InputObject(i) => &i.name,
            SchemaTypeDef::Interface(i) => &i.name,
            SchemaTypeDef::Union(u) => &u.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            SchemaTypeDef::Scalar(_) => TypeKind::Scalar,
            SchemaTypeDef::Enum(_) => TypeKind::Enum,
            SchemaTypeDef::Object(_) => TypeKind::Object,
            SchemaTypeDef::InputObject(_) => TypeKind::InputObject,
            SchemaTypeDef::Interface(_) => TypeKind::Interface,
            SchemaTypeDef::Union(_) => TypeKind::Union,
        }
    }

    pub fn description(&self) -> Option<&str> {
        let description = match self {
            SchemaTypeDef::Scalar(s) => &s.description,
            SchemaTypeDef::Enum(e) => &e.description,
            SchemaTypeDef::Object(o) => &o.description,
            SchemaTypeDef::InputObject(i) => &i.description,
            SchemaTypeDef::Interface(i) => &i.description,
            SchemaTypeDef::Union(u) => &u.description,
        };
        description.as_deref()
    }
}

/// Represents a GraphQL type reference (NamedType, List, NonNull wrapping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GqlType {
    Named(String),
    List(Box<GqlType>),
    NonNull(Box<GqlType>),
}

impl GqlType {
    /// Get the base (innermost) named type.
    pub fn base_name(&self) -> &str {
        match self {
            GqlType::Named(name) => name,
            GqlType::List(inner) => inner.base_name(),
            GqlType::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, GqlType::NonNull(_))
    }
}

impl fmt::Display for GqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GqlType::Named(name) => f.write_str(name),
            GqlType::List(inner) => write!(f, "[{}]", inner),
            GqlType::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// Names of the root operation types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOperations {
    pub query: String,
    pub mutation: String,
    pub subscription: String,
}

impl Default for RootOperations {
    fn default() -> Self {
        RootOperations {
            query: "Query".to_string(),
            mutation: "Mutation".to_string(),
            subscription: "Subscription".to_string(),
        }
    }
}

/// Host type used for custom scalars without an explicit mapping.
pub const UNKNOWN_SCALAR: &str = "serde_json::Value";

/// Built-in GraphQL scalar names with their default host types.
const BUILTIN_SCALARS: &[(&str, &str)] = &[
    ("String", "String"),
    ("Int", "i32"),
    ("Float", "f64"),
    ("Boolean", "bool"),
    ("ID", "String"),
];

/// Scalar name to host type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMappings {
    table: IndexMap<String, String>,
}

impl Default for ScalarMappings {
    fn default() -> Self {
        let table = BUILTIN_SCALARS
            .iter()
            .map(|(name, host)| (name.to_string(), host.to_string()))
            .collect();
        ScalarMappings { table }
    }
}

impl ScalarMappings {
    /// Map `scalar` to `host`, replacing any earlier mapping.
    pub fn insert(&mut self, scalar: impl Into<String>, host: impl Into<String>) {
        self.table.insert(scalar.into(), host.into());
    }

    /// Host type for `scalar`, falling back to [`UNKNOWN_SCALAR`].
    pub fn get(&self, scalar: &str) -> &str {
        self.table
            .get(scalar)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SCALAR)
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ScalarMappings {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (scalar, host) in iter {
            self.insert(scalar, host);
        }
    }
}

/// Parsed and indexed schema.
#[derive(Debug, Clone)]
pub struct Schema {
    types: IndexMap<String, SchemaTypeDef>,
    roots: RootOperations,
    scalars: ScalarMappings,
}

impl Schema {
    /// Parse SDL text. Syntax errors are logged and parsing continues
    /// (apollo-parser is error-resilient).
    pub fn parse(sdl: &str) -> Schema {
        let tree = Parser::new(sdl).parse();
        for err in tree.errors() {
            tracing::warn!(index = err.index(), "Schema parse warning: {}", err.message());
        }

        let mut types: IndexMap<String, SchemaTypeDef> = IndexMap::new();
        let mut roots = RootOperations::default();

        for (name, _) in BUILTIN_SCALARS {
            types.insert(
                name.to_string(),
                SchemaTypeDef::Scalar(ScalarDef {
                    name: name.to_string(),
                    description: None,
                }),
            );
        }

        for def in tree.document().definitions() {
            let parsed = match def {
                cst::Definition::ScalarTypeDefinition(s) => SchemaTypeDef::Scalar(ScalarDef {
                    name: extract_name(&s.name()),
                    description: extract_description(&s.description()),
                }),
                cst::Definition::EnumTypeDefinition(e) => SchemaTypeDef::Enum(extract_enum(&e)),
                cst::Definition::ObjectTypeDefinition(o) => SchemaTypeDef::Object(ObjectDef {
                    name: extract_name(&o.name()),
                    description: extract_description(&o.description()),
                    interfaces: extract_interfaces(&o.implements_interfaces()),
                    fields: extract_fields(&o.fields_definition()),
                }),
                cst::Definition::InterfaceTypeDefinition(i) => {
                    SchemaTypeDef::Interface(InterfaceDef {
                        name: extract_name(&i.name()),
                        description: extract_description(&i.description()),
                        interfaces: extract_interfaces(&i.implements_interfaces()),
                        fields: extract_fields(&i.fields_definition()),
                    })
                }
                cst::Definition::UnionTypeDefinition(u) => SchemaTypeDef::Union(UnionDef {
                    name: extract_name(&u.name()),
                    description: extract_description(&u.description()),
                    members: u
                        .union_member_types()
                        .map(|m| {
                            m.named_types()
                                .map(|nt| extract_name(&nt.name()))
                                .collect()
                        })
                        .unwrap_or_default(),
                }),
                cst::Definition::InputObjectTypeDefinition(i) => {
                    SchemaTypeDef::InputObject(extract_input(&i))
                }
                cst::Definition::SchemaDefinition(s) => {
                    for root in s.root_operation_type_definitions() {
                        let Some(named) = root.named_type() else {
                            continue;
                        };
                        let name = extract_name(&named.name());
                        match root.operation_type().map(|op| OperationKind::from_cst(&op)) {
                            Some(OperationKind::Mutation) => roots.mutation = name,
                            Some(OperationKind::Subscription) => roots.subscription = name,
                            _ => roots.query = name,
                        }
                    }
                    continue;
                }
                _ => continue,
            };
            types.insert(parsed.name().to_string(), parsed);
        }

        tracing::debug!(types = types.len(), "Parsed schema");
        Schema {
            types,
            roots,
            scalars: ScalarMappings::default(),
        }
    }

    /// Replace the scalar mapping table.
    pub fn with_scalar_mappings(mut self, scalars: ScalarMappings) -> Self {
        self.scalars = scalars;
        self
    }

    pub fn scalar_mappings_mut(&mut self) -> &mut ScalarMappings {
        &mut self.scalars
    }

    /// Look up a type by name without failing.
    pub fn get(&self, name: &str) -> Option<&SchemaTypeDef> {
        self.types.get(name)
    }

    /// Look up a type by name. A missing type means the schema and the query
    /// document disagree.
    pub fn resolve(&self, name: &str) -> Result<&SchemaTypeDef> {
        self.types.get(name).ok_or_else(|| CodegenError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Declared fields of an object, interface or input type, in schema order.
    /// Scalars, enums and unions declare none.
    pub fn fields_of(&self, name: &str) -> Result<&[FieldDef]> {
        Ok(match self.resolve(name)? {
            SchemaTypeDef::Object(o) => &o.fields,
            SchemaTypeDef::Interface(i) => &i.fields,
            SchemaTypeDef::InputObject(i) => &i.fields,
            SchemaTypeDef::Scalar(_) | SchemaTypeDef::Enum(_) | SchemaTypeDef::Union(_) => &[],
        })
    }

    /// Host type for a scalar.
    pub fn scalar_mapping(&self, scalar: &str) -> &str {
        self.scalars.get(scalar)
    }

    /// Object types a value of type `name` can be at runtime.
    pub fn possible_types(&self, name: &str) -> Vec<&str> {
        match self.types.get(name) {
            Some(SchemaTypeDef::Object(o)) => vec![o.name.as_str()],
            Some(SchemaTypeDef::Interface(_)) => self
                .types
                .values()
                .filter_map(|t| match t {
                    SchemaTypeDef::Object(o) if o.interfaces.iter().any(|i| i == name) => {
                        Some(o.name.as_str())
                    }
                    _ => None,
                })
                .collect(),
            Some(SchemaTypeDef::Union(u)) => u.members.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Name of the root type for an operation kind.
    pub fn root_type_name(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Query => &self.roots.query,
            OperationKind::Mutation => &self.roots.mutation,
            OperationKind::Subscription => &self.roots.subscription,
        }
    }

    /// All types in definition order, built-in scalars first.
    pub fn types(&self) -> impl Iterator<Item = &SchemaTypeDef> {
        self.types.values()
    }
}

pub(crate) fn extract_name(name: &Option<cst::Name>) -> String {
    name.as_ref()
        .map(|n| n.text().to_string())
        .unwrap_or_default()
}

fn extract_description(desc: &Option<cst::Description>) -> Option<String> {
    desc.as_ref()
        .and_then(|d| d.string_value())
        .map(String::from)
        .filter(|s| !s.is_empty())
}

pub(crate) fn extract_type(ty: &Option<cst::Type>) -> GqlType {
    match ty {
        None => GqlType::Named("String".to_string()),
        Some(t) => match t {
            cst::Type::NamedType(nt) => GqlType::Named(extract_name(&nt.name())),
            cst::Type::ListType(lt) => GqlType::List(Box::new(extract_type(&lt.ty()))),
            cst::Type::NonNullType(nnt) => {
                if let Some(named) = nnt.named_type() {
                    GqlType::NonNull(Box::new(GqlType::Named(extract_name(&named.name()))))
                } else if let Some(list) = nnt.list_type() {
                    let inner = extract_type(&list.ty());
                    GqlType::NonNull(Box::new(GqlType::List(Box::new(inner))))
                } else {
                    GqlType::NonNull(Box::new(GqlType::Named("String".to_string())))
                }
            }
        },
    }
}

fn extract_interfaces(implements: &Option<cst::ImplementsInterfaces>) -> Vec<String> {
    implements
        .as_ref()
        .map(|i| i.named_types().map(|nt| extract_name(&nt.name())).collect())
        .unwrap_or_default()
}

fn extract_fields(fields_def: &Option<cst::FieldsDefinition>) -> Vec<FieldDef> {
    let Some(fd) = fields_def else {
        return Vec::new();
    };
    fd.field_definitions()
        .map(|f| FieldDef {
            name: extract_name(&f.name()),
            description: extract_description(&f.description()),
            ty: extract_type(&f.ty()),
        })
        .collect()
}

fn extract_enum(e: &cst::EnumTypeDefinition) -> EnumDef {
    let values = e
        .enum_values_definition()
        .map(|evd| {
            evd.enum_value_definitions()
                .map(|ev| EnumValueDef {
                    name: ev
                        .enum_value()
                        .map(|v| v.text().to_string())
                        .unwrap_or_default(),
                    description: extract_description(&ev.description()),
                })
                .collect()
        })
        .unwrap_or_default();

    EnumDef {
        name: extract_name(&e.name()),
        description: extract_description(&e.description()),
        values,
    }
}

fn extract_input(i: &cst::InputObjectTypeDefinition) -> InputDef {
    let fields = i
        .input_fields_definition()
        .map(|ifd| {
            ifd.input_value_definitions()
                .map(|iv| FieldDef {
                    name: extract_name(&iv.name()),
                    description: extract_description(&iv.description()),
                    ty: extract_type(&iv.ty()),
                })
                .collect()
        })
        .unwrap_or_default();

    InputDef {
        name: extract_name(&i.name()),
        description: extract_description(&i.description()),
        fields,
    }
}
