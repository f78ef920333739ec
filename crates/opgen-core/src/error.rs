use std::path::PathBuf;

use thiserror::Error;

use crate::resolver::ArtifactKind;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation path must start with '/': {0}")]
    InvalidPath(String),
}

/// Failure of the name or file resolution service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("cannot resolve an empty {kind} name for plugin {plugin}")]
    EmptyName { plugin: String, kind: ArtifactKind },
}

#[derive(Debug, Error)]
pub enum ManagerError {
    /// The generation context lacks a collaborator the pipeline cannot run without.
    #[error("configuration error: plugin {plugin} has no schema extractor")]
    MissingExtractor { plugin: String },

    #[error("failed to resolve {kind} name {name:?} of operation {operation} for plugin {plugin}")]
    Resolution {
        operation: String,
        plugin: String,
        kind: ArtifactKind,
        name: String,
        #[source]
        source: ResolveError,
    },
}

impl ManagerError {
    /// Configuration errors abort the whole run; everything else only the
    /// affected operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ManagerError::MissingExtractor { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
