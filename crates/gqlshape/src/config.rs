//! `gqlshape.toml` settings. Command-line flags take precedence.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gqlshape.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema SDL file.
    pub schema: Option<PathBuf>,
    /// Query documents, concatenated in order.
    pub queries: Vec<PathBuf>,
    /// Where `generate` writes; stdout when unset.
    pub output: Option<PathBuf>,
    /// GraphQL scalar name to Rust type path.
    pub scalars: BTreeMap<String, String>,
    pub introspection: IntrospectionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectionConfig {
    pub endpoint: Option<String>,
    pub output: PathBuf,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub headers: BTreeMap<String, String>,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        IntrospectionConfig {
            endpoint: None,
            output: PathBuf::from("schema.graphql"),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 15_000,
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load `path`, or `gqlshape.toml` if it exists. Without either, every
    /// setting has its default.
    ///
    /// Relative paths inside the file are taken relative to the file.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Config::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config = Config::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.rebase(dir);
        }
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    fn rebase(&mut self, dir: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        if let Some(schema) = &mut self.schema {
            join(schema);
        }
        for query in &mut self.queries {
            join(query);
        }
        if let Some(output) = &mut self.output {
            join(output);
        }
        join(&mut self.introspection.output);
    }
}
