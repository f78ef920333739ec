use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Identifier of an output-artifact family (`ts`, `zod`, `swr`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginKey(String);

impl PluginKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Category of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    File,
    Function,
    Type,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::File => "file",
            ArtifactKind::Function => "function",
            ArtifactKind::Type => "type",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveNameParams<'a> {
    /// Logical (pre-resolution) name.
    pub name: &'a str,
    pub plugin_key: &'a PluginKey,
    pub kind: ArtifactKind,
}

/// Deterministic, collision-avoiding identifier resolution.
///
/// Implementations are shared between worker threads; resolving the same
/// `(name, plugin_key, kind)` twice must return the same identifier, and two
/// different logical names must never resolve to the same identifier within
/// one plugin and kind.
pub trait NameResolver: Send + Sync {
    fn resolve_name(&self, params: &ResolveNameParams<'_>) -> Result<String, ResolveError>;
}

#[derive(Debug, Clone, Copy)]
pub struct FileRequest<'a> {
    /// Already resolved file name, without extension.
    pub name: &'a str,
    pub extension: &'a str,
    pub plugin_key: &'a PluginKey,
    /// Grouping tag; files of the same tag may be placed together.
    pub tag: Option<&'a str>,
}

/// Where a file lives. Paths always use `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileLocation {
    pub base_name: String,
    pub path: String,
}

/// Deterministic file placement. Resolving a file also registers it with the
/// service; registering the same location twice is a no-op.
pub trait FileResolver: Send + Sync {
    fn resolve_file(&self, request: &FileRequest<'_>) -> Result<FileLocation, ResolveError>;
}
