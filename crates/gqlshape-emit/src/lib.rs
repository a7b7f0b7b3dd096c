//! Render a [`Generation`] as Rust source.
//!
//! Output shapes become `Deserialize` structs, interfaces and unions with
//! type-specific selections become `__typename`-tagged enums, schema enums
//! become `Copy` enums, and input objects and operation variables become
//! `Serialize` structs.

pub mod naming;

use gqlshape_codegen::{
    BaseType, GeneratedKind, GeneratedOperation, GeneratedProperty, GeneratedType, Generation,
    OperationKind, PropertyType, Variant,
};
use heck::ToShoutySnakeCase;
use naming::{doc_comment_tokens, field_name, ident, type_name};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// First line of every emitted file.
pub const HEADER: &str = "// @generated by gqlshape. Do not edit.\n";

#[derive(Debug, Error)]
pub enum EmitError {
    /// A scalar mapping names something that is not a Rust type.
    #[error("Invalid host type for scalar {scalar}: {host}")]
    InvalidHostType {
        scalar: String,
        host: String,
        #[source]
        source: syn::Error,
    },
    /// The assembled tokens are not a valid Rust file.
    #[error("Generated code does not parse: {0}")]
    Syntax(#[from] syn::Error),
}

/// Render every type and operation of `generation` as one Rust file.
pub fn emit(generation: &Generation) -> Result<String, EmitError> {
    let kinds: HashMap<&str, &GeneratedKind> = generation
        .types
        .iter()
        .map(|t| (t.name.as_str(), &t.kind))
        .collect();
    let emitter = Emitter { kinds };

    let mut items = Vec::new();
    for ty in &generation.types {
        items.push(emitter.generated_type(ty)?);
    }
    for op in &generation.operations {
        items.push(emitter.operation(op)?);
    }

    let tokens = quote! {
        #![allow(dead_code, clippy::all)]

        use serde::{Deserialize, Serialize};

        #(#items)*
    };
    let file: syn::File = syn::parse2(tokens)?;
    tracing::debug!(
        types = generation.types.len(),
        operations = generation.operations.len(),
        "Emitted Rust source"
    );
    Ok(format!("{}\n{}", HEADER, prettyplease::unparse(&file)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldMode {
    /// Response data: deserialized.
    Output,
    /// Input object fields: serialized, `None` skipped.
    Input,
    /// Operation variables: like input fields, but never self-referencing.
    Variables,
}

struct Emitter<'g> {
    kinds: HashMap<&'g str, &'g GeneratedKind>,
}

impl Emitter<'_> {
    fn generated_type(&self, ty: &GeneratedType) -> Result<TokenStream, EmitError> {
        match &ty.kind {
            GeneratedKind::Enum { values } => Ok(enumeration(ty, values)),
            GeneratedKind::InputObject => self.input_struct(ty),
            GeneratedKind::Interface { variants } | GeneratedKind::Union { variants }
                if !variants.is_empty() =>
            {
                Ok(tagged_enum(ty, variants))
            }
            _ => self.output_struct(ty),
        }
    }

    fn output_struct(&self, ty: &GeneratedType) -> Result<TokenStream, EmitError> {
        let doc = doc_comment_tokens(ty.description.as_deref());
        let name = ident(&type_name(&ty.name));
        let fields = self.fields(&ty.properties, FieldMode::Output)?;
        Ok(quote! {
            #doc
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #name {
                #(#fields)*
            }
        })
    }

    fn input_struct(&self, ty: &GeneratedType) -> Result<TokenStream, EmitError> {
        let doc = doc_comment_tokens(ty.description.as_deref());
        let name = ident(&type_name(&ty.name));
        let fields = self.fields(&ty.properties, FieldMode::Input)?;
        Ok(quote! {
            #doc
            #[derive(Debug, Clone, PartialEq, Serialize)]
            pub struct #name {
                #(#fields)*
            }
        })
    }

    /// One struct field per property.
    fn fields(
        &self,
        properties: &[GeneratedProperty],
        mode: FieldMode,
    ) -> Result<Vec<TokenStream>, EmitError> {
        let input = mode != FieldMode::Output;
        let mut taken = HashSet::new();
        let mut fields = Vec::with_capacity(properties.len());
        for prop in properties {
            let mut rust_name = field_name(&prop.name);
            let mut n = 1;
            while !taken.insert(rust_name.clone()) {
                n += 1;
                rust_name = format!("{}_{}", field_name(&prop.name), n);
            }

            let doc = doc_comment_tokens(prop.description.as_deref());
            let name = ident(&rust_name);
            let ty = self.rust_type(&prop.ty, mode == FieldMode::Input)?;
            let rename = (rust_name != prop.name).then(|| {
                let key = &prop.name;
                quote! { #[serde(rename = #key)] }
            });
            let skip = (input && prop.ty.is_nullable())
                .then(|| quote! { #[serde(skip_serializing_if = "Option::is_none")] });
            // Tagged enums consume `__typename` before the variant sees it.
            let default = (!input && prop.field_name == "__typename")
                .then(|| quote! { #[serde(default)] });
            fields.push(quote! {
                #doc
                #rename
                #skip
                #default
                pub #name: #ty,
            });
        }
        Ok(fields)
    }

    /// `boxed` puts input objects that are not behind a list in a `Box`, so
    /// self-referencing input types have a finite size.
    fn rust_type(&self, ty: &PropertyType, boxed: bool) -> Result<TokenStream, EmitError> {
        let (inner, nullable) = match ty {
            PropertyType::Named { base, nullable } => (self.base_type(base, boxed)?, *nullable),
            PropertyType::List { element, nullable } => {
                let element = self.rust_type(element, false)?;
                (quote! { Vec<#element> }, *nullable)
            }
        };
        Ok(if nullable {
            quote! { Option<#inner> }
        } else {
            inner
        })
    }

    fn base_type(&self, base: &BaseType, boxed: bool) -> Result<TokenStream, EmitError> {
        match base {
            BaseType::Scalar { name, host } => {
                let path: syn::Type =
                    syn::parse_str(host).map_err(|source| EmitError::InvalidHostType {
                        scalar: name.clone(),
                        host: host.clone(),
                        source,
                    })?;
                Ok(quote! { #path })
            }
            BaseType::Generated { name } => {
                let id = ident(&type_name(name));
                let is_input = matches!(
                    self.kinds.get(name.as_str()),
                    Some(GeneratedKind::InputObject)
                );
                Ok(if boxed && is_input {
                    quote! { Box<#id> }
                } else {
                    quote! { #id }
                })
            }
        }
    }

    fn operation(&self, op: &GeneratedOperation) -> Result<TokenStream, EmitError> {
        let stem = op.data_type.strip_suffix("Data").unwrap_or(&op.data_type);
        let suffix = match op.kind {
            OperationKind::Query => "QUERY",
            OperationKind::Mutation => "MUTATION",
            OperationKind::Subscription => "SUBSCRIPTION",
        };
        let const_name = ident(&format!("{}_{}", stem.to_shouty_snake_case(), suffix));
        let source = &op.source;
        let doc = format!(" `{}` {}, returning [`{}`].", stem, op.kind, type_name(&op.data_type));

        let variables = if op.variables.is_empty() {
            TokenStream::new()
        } else {
            let name = ident(&format!("{}Variables", type_name(stem)));
            let fields = self.fields(&op.variables, FieldMode::Variables)?;
            quote! {
                #[derive(Debug, Clone, PartialEq, Serialize)]
                pub struct #name {
                    #(#fields)*
                }
            }
        };

        Ok(quote! {
            #[doc = #doc]
            pub const #const_name: &str = #source;

            #variables
        })
    }
}

fn enumeration(ty: &GeneratedType, values: &[gqlshape_codegen::GeneratedEnumValue]) -> TokenStream {
    let doc = doc_comment_tokens(ty.description.as_deref());
    let name = ident(&type_name(&ty.name));
    let names: Vec<String> = values.iter().map(|v| type_name(&v.name)).collect();
    let fallback = fallback_variant(&names);

    let variants = values.iter().zip(&names).map(|(value, variant)| {
        let doc = doc_comment_tokens(value.description.as_deref());
        let variant = ident(variant);
        let wire = &value.name;
        quote! {
            #doc
            #[serde(rename = #wire)]
            #variant,
        }
    });
    quote! {
        #doc
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum #name {
            #(#variants)*
            /// A value added to the schema after generation.
            #[serde(other)]
            #fallback,
        }
    }
}

/// Catch-all variant name that does not clash with `names`.
fn fallback_variant(names: &[String]) -> proc_macro2::Ident {
    ident(if names.iter().any(|n| n == "Unknown") {
        "UnknownValue"
    } else {
        "Unknown"
    })
}

fn tagged_enum(ty: &GeneratedType, variants: &[Variant]) -> TokenStream {
    let doc = doc_comment_tokens(ty.description.as_deref());
    let name = ident(&type_name(&ty.name));
    let names: Vec<String> = variants.iter().map(|v| type_name(&v.typename)).collect();
    let fallback = fallback_variant(&names);
    let arms = variants.iter().zip(&names).map(|(v, variant)| {
        let variant = ident(variant);
        let inner = ident(&type_name(&v.type_name));
        let wire = &v.typename;
        quote! {
            #[serde(rename = #wire)]
            #variant(#inner),
        }
    });
    quote! {
        #doc
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "__typename")]
        pub enum #name {
            #(#arms)*
            /// A runtime type without type-specific selections.
            #[serde(other)]
            #fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlshape_codegen::{generate, QueryDocument, Schema};

    const SCHEMA: &str = r#"
        scalar DateTime
        "Issue state." enum State { OPEN IN_PROGRESS }
        interface Node { id: ID! }
        "A person." type User implements Node { id: ID! "Shown name." displayName: String type: String createdAt: DateTime }
        type Bot implements Node { id: ID! }
        input Filter { state: State! next: Filter and: [Filter!] }
        type Query { node: Node users(filter: Filter): [User!]! state: State }
    "#;

    fn emit_query(query: &str) -> String {
        let schema = Schema::parse(SCHEMA);
        let document = QueryDocument::parse(query).unwrap();
        emit(&generate(&schema, &document).unwrap()).unwrap()
    }

    #[test]
    fn output_struct_fields_and_renames() {
        let out = emit_query("query Users { users { id displayName type createdAt } }");
        assert!(out.starts_with(HEADER));
        assert!(out.contains("/// A person."));
        assert!(out.contains("pub struct User {"));
        assert!(out.contains("pub id: String,"));
        assert!(out.contains("/// Shown name."));
        assert!(out.contains("#[serde(rename = \"displayName\")]"));
        assert!(out.contains("pub display_name: Option<String>,"));
        assert!(out.contains("pub r#type: Option<String>,"));
        assert!(out.contains("pub created_at: Option<serde_json::Value>,"));
        assert!(out.contains("pub users: Vec<User>,"));
    }

    #[test]
    fn enum_with_fallback() {
        let out = emit_query("query S { state }");
        assert!(out.contains("pub enum State {"));
        assert!(out.contains("#[serde(rename = \"IN_PROGRESS\")]"));
        assert!(out.contains("InProgress,"));
        assert!(out.contains("#[serde(other)]"));
        assert!(out.contains("Unknown,"));
        assert!(out.contains("pub state: Option<State>,"));
    }

    #[test]
    fn tagged_enum_for_variants() {
        let out = emit_query("query N { node { __typename id ... on User { displayName } } }");
        assert!(out.contains("#[serde(tag = \"__typename\")]"));
        assert!(out.contains("pub enum Node {"));
        assert!(out.contains("User(User),"));
        assert!(out.contains("Bot(Bot),"));
        assert!(out.contains("#[serde(default)]"));
    }

    #[test]
    fn tagged_enum_fallback_avoids_member_named_unknown() {
        let schema = Schema::parse(
            r#"
            type Unknown { id: ID! }
            type Known { id: ID! }
            union Thing = Unknown | Known
            type Query { thing: Thing }
            "#,
        );
        let document = QueryDocument::parse(
            "query T { thing { __typename ... on Unknown { id } ... on Known { id } } }",
        )
        .unwrap();
        let out = emit(&generate(&schema, &document).unwrap()).unwrap();
        assert!(out.contains("Unknown(Unknown),"));
        assert!(out.contains("Known(Known),"));
        assert!(out.contains("UnknownValue,"));
        assert!(!out.contains("    Unknown,"));
    }

    #[test]
    fn operation_const_and_variables() {
        let out = emit_query("query ListUsers($filter: Filter) { users(filter: $filter) { id } }");
        assert!(out.contains("pub const LIST_USERS_QUERY: &str ="));
        assert!(out.contains("query ListUsers($filter: Filter)"));
        assert!(out.contains("pub struct ListUsersVariables {"));
        assert!(out.contains("pub filter: Option<Filter>,"));
        assert!(out.contains("pub struct Filter {"));
        assert!(out.contains("pub state: State,"));
        assert!(out.contains("pub next: Option<Box<Filter>>,"));
        assert!(out.contains("pub and: Option<Vec<Filter>>,"));
        assert!(out.contains("skip_serializing_if = \"Option::is_none\""));
    }

    #[test]
    fn invalid_host_type_is_reported() {
        let mut schema = Schema::parse(SCHEMA);
        schema.scalar_mappings_mut().insert("DateTime", "not a type!");
        let document = QueryDocument::parse("query Q { users { createdAt } }").unwrap();
        let err = emit(&generate(&schema, &document).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            EmitError::InvalidHostType { scalar, .. } if scalar == "DateTime"
        ));
    }
}
