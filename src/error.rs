use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while locating, reading or parsing a properties resource.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("resource `{name}` not found (searched: {})", display_dirs(.searched))]
    ResourceNotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to read resource `{name}`: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed properties at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "<none>".to_string();
    }
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
