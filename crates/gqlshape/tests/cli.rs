//! Offline CLI tests for gqlshape: help, generation, config handling and errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn gqlshape() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("gqlshape").unwrap()
}

const SCHEMA: &str = r#"
scalar DateTime

"A person."
type User {
  id: ID!
  name: String
  createdAt: DateTime!
}

type Query {
  viewer: User!
  user(id: ID!): User
}
"#;

const VIEWER: &str = "query Viewer { viewer { id name createdAt } }\n";

/// A temp dir holding `schema.graphql` and `viewer.graphql`.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "schema.graphql", SCHEMA);
    write(dir.path(), "viewer.graphql", VIEWER);
    dir
}

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

// ── Help ────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    gqlshape()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("introspect"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn generate_help_shows_flags() {
    gqlshape()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--scalar"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("-o"));
}

#[test]
fn no_subcommand_is_a_usage_error() {
    gqlshape()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ── Generate ────────────────────────────────────────────────────────────────

#[test]
fn generate_rust_to_stdout() {
    let dir = project();
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql", "viewer.graphql"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("// @generated by gqlshape"))
        .stdout(predicate::str::contains("/// A person."))
        .stdout(predicate::str::contains("pub struct User {"))
        .stdout(predicate::str::contains("pub struct ViewerData {"))
        .stdout(predicate::str::contains("pub viewer: User,"))
        .stdout(predicate::str::contains("pub created_at: serde_json::Value,"))
        .stdout(predicate::str::contains("pub const VIEWER_QUERY: &str ="));
}

#[test]
fn generate_with_scalar_flag() {
    let dir = project();
    gqlshape()
        .current_dir(dir.path())
        .args([
            "generate",
            "--schema",
            "schema.graphql",
            "--scalar",
            "DateTime=String",
            "viewer.graphql",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("pub created_at: String,"));
}

#[test]
fn generate_rejects_malformed_scalar_flag() {
    let dir = project();
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql", "--scalar", "DateTime", "viewer.graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=TYPE"));
}

#[test]
fn generate_json_format() {
    let dir = project();
    let output = gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--format", "json", "--schema", "schema.graphql", "viewer.graphql"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operations"][0]["name"], "Viewer");
    assert_eq!(json["operations"][0]["data_type"], "ViewerData");
    let names: Vec<&str> = json["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["User", "ViewerData"]);
}

#[test]
fn generate_to_file() {
    let dir = project();
    gqlshape()
        .current_dir(dir.path())
        .args([
            "generate",
            "--schema",
            "schema.graphql",
            "-o",
            "src/generated.rs",
            "viewer.graphql",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = std::fs::read_to_string(dir.path().join("src/generated.rs")).unwrap();
    assert!(written.contains("pub struct ViewerData {"));
}

#[test]
fn fragments_can_live_in_another_file() {
    let dir = project();
    write(dir.path(), "ops.graphql", "query Who { user(id: \"1\") { ...UserBits } }\n");
    write(dir.path(), "fragments.graphql", "fragment UserBits on User { id name }\n");
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql", "ops.graphql", "fragments.graphql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pub user: Option<User>,"))
        .stdout(predicate::str::contains("fragment UserBits on User"));
}

// ── Config file ─────────────────────────────────────────────────────────────

#[test]
fn generate_from_default_config() {
    let dir = project();
    write(
        dir.path(),
        "gqlshape.toml",
        r#"
schema = "schema.graphql"
queries = ["viewer.graphql"]
output = "out/types.rs"

[scalars]
DateTime = "String"
"#,
    );
    gqlshape()
        .current_dir(dir.path())
        .arg("generate")
        .assert()
        .success();
    let written = std::fs::read_to_string(dir.path().join("out/types.rs")).unwrap();
    assert!(written.contains("pub created_at: String,"));
}

#[test]
fn flags_override_config() {
    let dir = project();
    write(
        dir.path(),
        "gqlshape.toml",
        "schema = \"schema.graphql\"\nqueries = [\"viewer.graphql\"]\n\n[scalars]\nDateTime = \"String\"\n",
    );
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--scalar", "DateTime=i64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pub created_at: i64,"));
}

#[test]
fn explicit_config_paths_are_relative_to_the_file() {
    let dir = project();
    let nested = dir.path().join("config");
    std::fs::create_dir(&nested).unwrap();
    write(
        &nested,
        "codegen.toml",
        "schema = \"../schema.graphql\"\nqueries = [\"../viewer.graphql\"]\n",
    );
    gqlshape()
        .args(["--config"])
        .arg(nested.join("codegen.toml"))
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("pub struct ViewerData {"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = project();
    write(dir.path(), "gqlshape.toml", "shema = \"typo\"\n");
    gqlshape()
        .current_dir(dir.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config file"));
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn missing_schema_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "viewer.graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: no schema given"));
}

#[test]
fn missing_queries_is_an_error() {
    let dir = project();
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no query documents"));
}

#[test]
fn unreadable_query_file_names_the_path() {
    let dir = project();
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql", "nope.graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.graphql"));
}

#[test]
fn unknown_field_fails_with_message() {
    let dir = project();
    write(dir.path(), "bad.graphql", "query Bad { viewer { id email } }\n");
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql", "bad.graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field: User has no field named email"));
}

#[test]
fn empty_selection_fails_with_message() {
    let dir = project();
    write(dir.path(), "bad.graphql", "query Bad { viewer }\n");
    gqlshape()
        .current_dir(dir.path())
        .args(["generate", "--schema", "schema.graphql", "bad.graphql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid selection set"));
}

#[test]
fn introspect_without_endpoint_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    gqlshape()
        .current_dir(dir.path())
        .arg("introspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no endpoint given"));
}
