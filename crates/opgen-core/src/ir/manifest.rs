use serde::{Deserialize, Serialize};

use super::operations::Operation;
use crate::error::ParseError;

/// A list of already-parsed operations, as produced by the upstream
/// document parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Parse an operation manifest from YAML.
pub fn from_yaml(input: &str) -> Result<OperationManifest, ParseError> {
    let manifest: OperationManifest = serde_yaml_ng::from_str(input)?;
    validate_paths(&manifest)?;
    Ok(manifest)
}

/// Parse an operation manifest from JSON.
pub fn from_json(input: &str) -> Result<OperationManifest, ParseError> {
    let manifest: OperationManifest = serde_json::from_str(input)?;
    validate_paths(&manifest)?;
    Ok(manifest)
}

fn validate_paths(manifest: &OperationManifest) -> Result<(), ParseError> {
    if let Some(op) = manifest.operations.iter().find(|op| !op.path.starts_with('/')) {
        return Err(ParseError::InvalidPath(op.path.clone()));
    }
    Ok(())
}
