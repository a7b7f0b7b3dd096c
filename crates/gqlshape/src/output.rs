use anyhow::Context;
use std::path::Path;

/// What `generate` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// Rust source with serde derives.
    #[default]
    Rust,
    /// The generated types and operations as JSON.
    Json,
}

/// Write `text` to `path`, or to stdout when no path is given.
pub fn write_output(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("could not create {}", dir.display()))?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("could not write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "Wrote output");
        }
        None => print!("{}", text),
    }
    Ok(())
}
