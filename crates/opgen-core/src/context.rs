use crate::resolver::{FileResolver, NameResolver, PluginKey};
use crate::schema::SchemaExtractor;

/// The collaborators one plugin works with while processing an operation.
///
/// Passed explicitly to every component; fixed for the duration of one
/// operation and never mutated by the pipeline.
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
    /// The active plugin; default scope of every resolution.
    pub plugin: &'a PluginKey,
    pub resolver: &'a dyn NameResolver,
    pub files: &'a dyn FileResolver,
    pub extractor: Option<&'a dyn SchemaExtractor>,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        plugin: &'a PluginKey,
        resolver: &'a dyn NameResolver,
        files: &'a dyn FileResolver,
    ) -> Self {
        Self {
            plugin,
            resolver,
            files,
            extractor: None,
        }
    }

    pub fn with_extractor(mut self, extractor: &'a dyn SchemaExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }
}

impl std::fmt::Debug for PluginContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin", self.plugin)
            .field("extractor", &self.extractor.is_some())
            .finish_non_exhaustive()
    }
}
