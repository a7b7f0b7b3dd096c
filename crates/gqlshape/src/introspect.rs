//! Fetch a schema over HTTP via introspection and convert it to SDL.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      kind
      name
      description
      fields(includeDeprecated: true) {
        name
        description
        args {
          name
          description
          type { ...TypeRef }
          defaultValue
        }
        type { ...TypeRef }
        isDeprecated
        deprecationReason
      }
      inputFields {
        name
        description
        type { ...TypeRef }
        defaultValue
      }
      interfaces { ...TypeRef }
      enumValues(includeDeprecated: true) {
        name
        description
        isDeprecated
        deprecationReason
      }
      possibleTypes { ...TypeRef }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("introspection endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("introspection query failed: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("no __schema in introspection response")]
    MissingSchema,
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Where and how to run the introspection query.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

/// Run the introspection query against `endpoint` and return the schema as SDL.
pub fn fetch_sdl(endpoint: &Endpoint) -> Result<String, IntrospectError> {
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(endpoint.connect_timeout)
        .timeout(endpoint.read_timeout)
        .default_headers(header_map(&endpoint.headers)?)
        .build()?;
    let body = serde_json::json!({
        "operationName": "IntrospectionQuery",
        "query": INTROSPECTION_QUERY,
    });

    tracing::info!(url = %endpoint.url, "Fetching schema");
    let response = client.post(&endpoint.url).json(&body).send()?;
    if !response.status().is_success() {
        return Err(IntrospectError::Status(response.status()));
    }
    let json: Value = response.json()?;

    if let Some(errors) = json["errors"].as_array().filter(|e| !e.is_empty()) {
        let messages = errors
            .iter()
            .map(|e| e["message"].as_str().unwrap_or("unknown error").to_string())
            .collect();
        return Err(IntrospectError::GraphQl(messages));
    }
    let schema = &json["data"]["__schema"];
    if schema.is_null() {
        return Err(IntrospectError::MissingSchema);
    }
    Ok(introspection_to_sdl(schema))
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, IntrospectError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |reason: String| IntrospectError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let key = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Convert an introspection `__schema` object to SDL.
///
/// Types are sorted by kind then name for stable output. A `schema` block is
/// written only when a root type has a non-default name.
pub fn introspection_to_sdl(schema: &Value) -> String {
    let mut sdl = String::new();
    emit_schema_block(&mut sdl, schema);

    let empty = Vec::new();
    let mut types: Vec<&Value> = schema["types"]
        .as_array()
        .unwrap_or(&empty)
        .iter()
        .filter(|t| !t["name"].as_str().unwrap_or("").starts_with("__"))
        .collect();
    types.sort_by_key(|t| {
        (
            kind_order(t["kind"].as_str().unwrap_or("")),
            t["name"].as_str().unwrap_or(""),
        )
    });

    for ty in types {
        let name = ty["name"].as_str().unwrap_or("");
        match ty["kind"].as_str().unwrap_or("") {
            "SCALAR" => {
                if matches!(name, "String" | "Int" | "Float" | "Boolean" | "ID") {
                    continue;
                }
                emit_description(&mut sdl, ty, "");
                sdl.push_str(&format!("scalar {}\n\n", name));
            }
            "ENUM" => {
                emit_description(&mut sdl, ty, "");
                sdl.push_str(&format!("enum {} {{\n", name));
                for value in ty["enumValues"].as_array().unwrap_or(&empty) {
                    emit_description(&mut sdl, value, "  ");
                    sdl.push_str("  ");
                    sdl.push_str(value["name"].as_str().unwrap_or(""));
                    emit_deprecated(&mut sdl, value);
                    sdl.push('\n');
                }
                sdl.push_str("}\n\n");
            }
            "INPUT_OBJECT" => {
                emit_description(&mut sdl, ty, "");
                sdl.push_str(&format!("input {} {{\n", name));
                for field in ty["inputFields"].as_array().unwrap_or(&empty) {
                    emit_description(&mut sdl, field, "  ");
                    sdl.push_str(&format!(
                        "  {}: {}",
                        field["name"].as_str().unwrap_or(""),
                        render_type_ref(&field["type"])
                    ));
                    emit_default(&mut sdl, field);
                    sdl.push('\n');
                }
                sdl.push_str("}\n\n");
            }
            kind @ ("OBJECT" | "INTERFACE") => {
                emit_description(&mut sdl, ty, "");
                let keyword = if kind == "OBJECT" { "type" } else { "interface" };
                sdl.push_str(&format!("{} {}", keyword, name));
                emit_interfaces(&mut sdl, ty);
                sdl.push_str(" {\n");
                emit_fields(&mut sdl, ty);
                sdl.push_str("}\n\n");
            }
            "UNION" => {
                emit_description(&mut sdl, ty, "");
                let members: Vec<&str> = ty["possibleTypes"]
                    .as_array()
                    .unwrap_or(&empty)
                    .iter()
                    .filter_map(|t| t["name"].as_str())
                    .collect();
                sdl.push_str(&format!("union {} = {}\n\n", name, members.join(" | ")));
            }
            _ => {}
        }
    }
    sdl
}

fn emit_schema_block(sdl: &mut String, schema: &Value) {
    let roots: Vec<(&str, &str, &str)> = [
        ("query", "queryType", "Query"),
        ("mutation", "mutationType", "Mutation"),
        ("subscription", "subscriptionType", "Subscription"),
    ]
    .into_iter()
    .filter_map(|(op, key, default)| {
        schema[key]["name"]
            .as_str()
            .map(|name| (op, name, default))
    })
    .collect();
    if roots.iter().all(|(_, name, default)| name == default) {
        return;
    }
    sdl.push_str("schema {\n");
    for (op, name, _) in roots {
        sdl.push_str(&format!("  {}: {}\n", op, name));
    }
    sdl.push_str("}\n\n");
}

fn kind_order(kind: &str) -> u8 {
    match kind {
        "SCALAR" => 0,
        "ENUM" => 1,
        "INPUT_OBJECT" => 2,
        "INTERFACE" => 3,
        "OBJECT" => 4,
        "UNION" => 5,
        _ => 6,
    }
}

fn emit_description(sdl: &mut String, val: &Value, indent: &str) {
    let Some(desc) = val["description"].as_str().filter(|d| !d.is_empty()) else {
        return;
    };
    if desc.contains('\n') || desc.contains('"') {
        sdl.push_str(&format!(
            "{}\"\"\"\n{}\n{}\"\"\"\n",
            indent,
            desc.replace("\"\"\"", "\\\"\"\""),
            indent
        ));
    } else {
        sdl.push_str(&format!("{}\"{}\"\n", indent, desc));
    }
}

fn emit_deprecated(sdl: &mut String, val: &Value) {
    if val["isDeprecated"].as_bool() != Some(true) {
        return;
    }
    match val["deprecationReason"].as_str() {
        Some(reason) => sdl.push_str(&format!(
            " @deprecated(reason: \"{}\")",
            reason.replace('\\', "\\\\").replace('"', "\\\"")
        )),
        None => sdl.push_str(" @deprecated"),
    }
}

fn emit_default(sdl: &mut String, val: &Value) {
    if let Some(default) = val["defaultValue"].as_str().filter(|d| !d.is_empty()) {
        sdl.push_str(&format!(" = {}", default));
    }
}

fn emit_interfaces(sdl: &mut String, ty: &Value) {
    let names: Vec<&str> = ty["interfaces"]
        .as_array()
        .map(|ifaces| ifaces.iter().filter_map(|i| i["name"].as_str()).collect())
        .unwrap_or_default();
    if !names.is_empty() {
        sdl.push_str(&format!(" implements {}", names.join(" & ")));
    }
}

fn emit_fields(sdl: &mut String, ty: &Value) {
    let Some(fields) = ty["fields"].as_array() else {
        return;
    };
    for field in fields {
        emit_description(sdl, field, "  ");
        sdl.push_str("  ");
        sdl.push_str(field["name"].as_str().unwrap_or(""));
        let args = field["args"].as_array().filter(|a| !a.is_empty());
        if let Some(args) = args {
            let rendered: Vec<String> = args
                .iter()
                .map(|arg| {
                    let mut out = format!(
                        "{}: {}",
                        arg["name"].as_str().unwrap_or(""),
                        render_type_ref(&arg["type"])
                    );
                    emit_default(&mut out, arg);
                    out
                })
                .collect();
            sdl.push_str(&format!("({})", rendered.join(", ")));
        }
        sdl.push_str(&format!(": {}", render_type_ref(&field["type"])));
        emit_deprecated(sdl, field);
        sdl.push('\n');
    }
}

fn render_type_ref(ty: &Value) -> String {
    match ty["kind"].as_str() {
        Some("NON_NULL") => format!("{}!", render_type_ref(&ty["ofType"])),
        Some("LIST") => format!("[{}]", render_type_ref(&ty["ofType"])),
        _ => ty["name"].as_str().unwrap_or("Unknown").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlshape_codegen::{Schema, SchemaTypeDef, TypeKind};
    use serde_json::json;

    fn named(kind: &str, name: &str) -> Value {
        json!({ "kind": kind, "name": name })
    }

    fn non_null(inner: Value) -> Value {
        json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
    }

    fn list(inner: Value) -> Value {
        json!({ "kind": "LIST", "name": null, "ofType": inner })
    }

    fn sample() -> Value {
        json!({
            "queryType": { "name": "Query" },
            "mutationType": null,
            "subscriptionType": null,
            "types": [
                { "kind": "OBJECT", "name": "__Schema", "fields": [] },
                { "kind": "SCALAR", "name": "String" },
                { "kind": "SCALAR", "name": "DateTime", "description": "An ISO-8601 timestamp." },
                {
                    "kind": "OBJECT", "name": "Query",
                    "fields": [{
                        "name": "user",
                        "args": [{ "name": "id", "type": non_null(named("SCALAR", "ID")), "defaultValue": null }],
                        "type": named("OBJECT", "User"),
                        "isDeprecated": false
                    }],
                    "interfaces": []
                },
                {
                    "kind": "OBJECT", "name": "User", "description": "A user.",
                    "fields": [
                        { "name": "id", "args": [], "type": non_null(named("SCALAR", "ID")), "isDeprecated": false },
                        { "name": "tags", "args": [], "type": non_null(list(non_null(named("SCALAR", "String")))), "isDeprecated": false },
                        { "name": "login", "args": [], "type": named("SCALAR", "String"), "isDeprecated": true, "deprecationReason": "Use \"handle\"." },
                        { "name": "role", "args": [], "type": named("ENUM", "Role"), "isDeprecated": false }
                    ],
                    "interfaces": [named("INTERFACE", "Node")]
                },
                {
                    "kind": "INTERFACE", "name": "Node",
                    "fields": [{ "name": "id", "args": [], "type": non_null(named("SCALAR", "ID")), "isDeprecated": false }],
                    "interfaces": []
                },
                {
                    "kind": "ENUM", "name": "Role",
                    "enumValues": [
                        { "name": "ADMIN", "isDeprecated": false },
                        { "name": "GUEST", "description": "Read only.", "isDeprecated": true, "deprecationReason": null }
                    ]
                },
                {
                    "kind": "INPUT_OBJECT", "name": "UserFilter",
                    "inputFields": [{ "name": "first", "type": named("SCALAR", "Int"), "defaultValue": "10" }]
                },
                { "kind": "UNION", "name": "Actor", "possibleTypes": [named("OBJECT", "User")] }
            ]
        })
    }

    #[test]
    fn sdl_is_sorted_by_kind_then_name() {
        let sdl = introspection_to_sdl(&sample());
        let pos = |needle: &str| sdl.find(needle).unwrap_or_else(|| panic!("{needle} missing:\n{sdl}"));
        assert!(pos("scalar DateTime") < pos("enum Role"));
        assert!(pos("enum Role") < pos("input UserFilter"));
        assert!(pos("input UserFilter") < pos("interface Node"));
        assert!(pos("interface Node") < pos("type Query"));
        assert!(pos("type Query") < pos("type User"));
        assert!(pos("type User") < pos("union Actor"));
        assert!(!sdl.contains("__Schema"));
        assert!(!sdl.contains("scalar String"));
        assert!(!sdl.contains("schema {"));
    }

    #[test]
    fn sdl_renders_fields_args_and_directives() {
        let sdl = introspection_to_sdl(&sample());
        assert!(sdl.contains("type User implements Node {"));
        assert!(sdl.contains("  user(id: ID!): User\n"));
        assert!(sdl.contains("  tags: [String!]!\n"));
        assert!(sdl.contains("  login: String @deprecated(reason: \"Use \\\"handle\\\".\")"));
        assert!(sdl.contains("  GUEST @deprecated\n"));
        assert!(sdl.contains("  first: Int = 10\n"));
        assert!(sdl.contains("union Actor = User"));
        assert!(sdl.contains("\"An ISO-8601 timestamp.\"\nscalar DateTime"));
    }

    #[test]
    fn sdl_round_trips_through_the_schema_model() {
        let schema = Schema::parse(&introspection_to_sdl(&sample()));
        assert_eq!(schema.resolve("User").unwrap().kind(), TypeKind::Object);
        assert_eq!(schema.resolve("Actor").unwrap().kind(), TypeKind::Union);
        assert_eq!(schema.resolve("User").unwrap().description(), Some("A user."));
        let fields = schema.fields_of("User").unwrap();
        assert_eq!(fields[1].ty.to_string(), "[String!]!");
        let Some(SchemaTypeDef::Enum(role)) = schema.get("Role") else {
            panic!("Role should be an enum");
        };
        assert_eq!(role.values.len(), 2);
        assert_eq!(role.values[1].description.as_deref(), Some("Read only."));
    }

    #[test]
    fn custom_root_names_get_a_schema_block() {
        let schema = json!({
            "queryType": { "name": "Root" },
            "mutationType": { "name": "Mutation" },
            "subscriptionType": null,
            "types": [
                { "kind": "OBJECT", "name": "Root", "fields": [
                    { "name": "ok", "args": [], "type": named("SCALAR", "Boolean") }
                ], "interfaces": [] }
            ]
        });
        let sdl = introspection_to_sdl(&schema);
        assert!(sdl.starts_with("schema {\n  query: Root\n  mutation: Mutation\n}\n"));
        let parsed = Schema::parse(&sdl);
        assert_eq!(
            parsed.root_type_name(gqlshape_codegen::OperationKind::Query),
            "Root"
        );
    }

    #[test]
    fn multiline_descriptions_use_block_strings() {
        let mut sdl = String::new();
        emit_description(&mut sdl, &json!({ "description": "Line one.\nLine two." }), "  ");
        assert_eq!(sdl, "  \"\"\"\nLine one.\nLine two.\n  \"\"\"\n");
    }

    #[test]
    fn invalid_header_is_reported() {
        let err = header_map(&[("bad header".to_string(), "x".to_string())]).unwrap_err();
        assert!(matches!(err, IntrospectError::InvalidHeader { name, .. } if name == "bad header"));
    }
}
