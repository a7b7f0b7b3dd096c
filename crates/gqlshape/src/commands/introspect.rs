use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::introspect::{self, Endpoint};
use crate::output;

/// Download a schema from a GraphQL endpoint and save it as SDL.
///
/// Examples:
///   gqlshape introspect --endpoint https://api.example.com/graphql
///   gqlshape introspect --endpoint http://localhost:4000 --header "Authorization: Bearer $TOKEN"
#[derive(Debug, Args)]
pub struct IntrospectCmd {
    /// GraphQL endpoint URL. Defaults to `introspection.endpoint` from the config file.
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Extra request header, as "NAME: VALUE". Repeatable.
    #[arg(long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
    /// Connect timeout in milliseconds.
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,
    /// Total request timeout in milliseconds.
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,
    /// Where to write the SDL. Use `-` for stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME: VALUE, got `{}`", s)),
    }
}

pub fn run(cmd: IntrospectCmd, config: &Config) -> anyhow::Result<()> {
    let settings = &config.introspection;
    let url = cmd
        .endpoint
        .or_else(|| settings.endpoint.clone())
        .context("no endpoint given (use --endpoint or set `introspection.endpoint` in gqlshape.toml)")?;

    // Flag headers override config headers of the same name.
    let mut headers: Vec<(String, String)> = settings
        .headers
        .iter()
        .filter(|(name, _)| {
            !cmd.headers
                .iter()
                .any(|(flag, _)| flag.eq_ignore_ascii_case(name))
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.extend(cmd.headers);

    let endpoint = Endpoint {
        url,
        headers,
        connect_timeout: Duration::from_millis(
            cmd.connect_timeout_ms.unwrap_or(settings.connect_timeout_ms),
        ),
        read_timeout: Duration::from_millis(cmd.read_timeout_ms.unwrap_or(settings.read_timeout_ms)),
    };
    let sdl = introspect::fetch_sdl(&endpoint)?;

    let path = cmd.output.unwrap_or_else(|| settings.output.clone());
    let path = (path.as_os_str() != "-").then_some(path);
    output::write_output(&sdl, path.as_deref())
}
