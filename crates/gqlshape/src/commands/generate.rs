use anyhow::{bail, Context};
use clap::Args;
use gqlshape_codegen::{QueryDocument, ScalarMappings, Schema};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output::{self, Format};

/// Generate Rust types for the operations in one or more query documents.
///
/// Examples:
///   gqlshape generate --schema schema.graphql queries/*.graphql
///   gqlshape generate --scalar DateTime=chrono::DateTime<chrono::Utc> -o src/gql.rs q.graphql
///   gqlshape generate --format json q.graphql
#[derive(Debug, Args)]
pub struct GenerateCmd {
    /// Query documents. Defaults to `queries` from the config file.
    pub queries: Vec<PathBuf>,
    /// Schema SDL file. Defaults to `schema` from the config file.
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// Map a custom scalar to a Rust type, as NAME=TYPE. Repeatable.
    #[arg(long = "scalar", value_name = "NAME=TYPE", value_parser = parse_scalar)]
    pub scalars: Vec<(String, String)>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Rust)]
    pub format: Format,
    /// Output file. Defaults to `output` from the config file, then stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_scalar(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, host)) if !name.trim().is_empty() && !host.trim().is_empty() => {
            Ok((name.trim().to_string(), host.trim().to_string()))
        }
        _ => Err(format!("expected NAME=TYPE, got `{}`", s)),
    }
}

pub fn run(cmd: GenerateCmd, config: &Config) -> anyhow::Result<()> {
    let schema_path = cmd
        .schema
        .as_deref()
        .or(config.schema.as_deref())
        .context("no schema given (use --schema or set `schema` in gqlshape.toml)")?;
    let queries = if cmd.queries.is_empty() {
        &config.queries
    } else {
        &cmd.queries
    };
    if queries.is_empty() {
        bail!("no query documents given (pass files or set `queries` in gqlshape.toml)");
    }

    let mut scalars = ScalarMappings::default();
    scalars.extend(config.scalars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    scalars.extend(cmd.scalars.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let schema = Schema::parse(&read(schema_path)?).with_scalar_mappings(scalars);
    let document = QueryDocument::parse(&concat_documents(queries)?)?;
    let generation = gqlshape_codegen::generate(&schema, &document)?;
    tracing::info!(
        operations = generation.operations.len(),
        types = generation.types.len(),
        "Generated"
    );

    let text = match cmd.format {
        Format::Rust => gqlshape_emit::emit(&generation)?,
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&generation)?;
            json.push('\n');
            json
        }
    };
    output::write_output(&text, cmd.output.as_deref().or(config.output.as_deref()))
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

/// Fragments may be defined in any of the files, so all documents are parsed
/// as one.
fn concat_documents(paths: &[PathBuf]) -> anyhow::Result<String> {
    let mut text = String::new();
    for path in paths {
        tracing::debug!(path = %path.display(), "Reading query document");
        text.push_str(&read(path)?);
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_flag_parsing() {
        assert_eq!(
            parse_scalar("DateTime=chrono::DateTime<chrono::Utc>").unwrap(),
            (
                "DateTime".to_string(),
                "chrono::DateTime<chrono::Utc>".to_string()
            )
        );
        assert!(parse_scalar("DateTime").is_err());
        assert!(parse_scalar("=String").is_err());
        assert!(parse_scalar("JSON=").is_err());
    }

    #[test]
    fn documents_are_concatenated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.graphql");
        let b = dir.path().join("b.graphql");
        std::fs::write(&a, "query A { viewer { ...U } }").unwrap();
        std::fs::write(&b, "fragment U on User { id }").unwrap();
        let text = concat_documents(&[a, b]).unwrap();
        assert!(text.find("query A").unwrap() < text.find("fragment U").unwrap());
    }
}
