pub mod config;
pub mod context;
pub mod error;
pub mod file;
pub mod ir;
pub mod manager;
pub mod naming;
pub mod registry;
pub mod resolver;
pub mod schema;

use serde::Serialize;

use crate::context::PluginContext;
use crate::ir::Operation;

/// A generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// An operation whose artifact was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOperation {
    pub operation: String,
    pub reason: String,
}

/// Outcome of one generation run: the files produced, in input order, and
/// the operations that failed without affecting the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub files: Vec<GeneratedFile>,
    pub skipped: Vec<SkippedOperation>,
}

/// Trait for code generators that produce files from a set of operations.
pub trait CodeGenerator {
    type Config;
    type Error: std::error::Error;

    fn generate(
        &self,
        operations: &[Operation],
        context: PluginContext<'_>,
        config: &Self::Config,
    ) -> Result<Generation, Self::Error>;
}
