use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::context::PluginContext;
use crate::error::{ManagerError, ResolveError};
use crate::ir::{Operation, StatusKey};
use crate::resolver::{ArtifactKind, FileRequest, PluginKey, ResolveNameParams};
use crate::schema::{SchemaBundle, SchemaExtractor, SchemaRef};

/// Default extension of generated files.
pub const DEFAULT_EXTENSION: &str = ".ts";

/// Which plugin and artifact kind a name is resolved for. Without a plugin
/// key the active plugin is used.
#[derive(Debug, Clone, Copy)]
pub struct NameOptions<'a> {
    pub plugin_key: Option<&'a PluginKey>,
    pub kind: ArtifactKind,
}

impl<'a> NameOptions<'a> {
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            plugin_key: None,
            kind,
        }
    }

    pub fn for_plugin(plugin_key: &'a PluginKey, kind: ArtifactKind) -> Self {
        Self {
            plugin_key: Some(plugin_key),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions<'a> {
    pub plugin_key: Option<&'a PluginKey>,
    pub extension: Option<&'a str>,
}

impl<'a> FileOptions<'a> {
    pub fn for_plugin(plugin_key: &'a PluginKey) -> Self {
        Self {
            plugin_key: Some(plugin_key),
            extension: None,
        }
    }
}

/// Metadata attached to a resolved file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeta {
    /// Resolved artifact name the file was named after.
    pub name: String,
    pub plugin_key: PluginKey,
    /// First tag of the operation, used to group files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A file an artifact belongs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFile {
    pub base_name: String,
    pub path: String,
    pub meta: FileMeta,
}

/// Resolved names of the path, query and header parameter schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterNames {
    pub path: Option<String>,
    pub query: Option<String>,
    pub header: Option<String>,
}

/// Resolved schema names of one operation for one plugin and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNames {
    pub request: Option<String>,
    pub parameters: ParameterNames,
    /// Primary response first, then errors, keyed by status code (or
    /// `default` when the primary response has none).
    pub responses: IndexMap<StatusKey, String>,
    /// Key of the primary response in `responses`.
    pub response_key: StatusKey,
}

impl ResolvedNames {
    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            with_query_params: self.parameters.query.is_some(),
            with_data: self.request.is_some(),
            with_path_params: self.parameters.path.is_some(),
            with_headers: self.parameters.header.is_some(),
        }
    }

    /// Name of the primary response.
    pub fn response(&self) -> Option<&str> {
        self.responses.get(&self.response_key).map(String::as_str)
    }

    /// Names of the error responses, in order.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.responses
            .iter()
            .filter(|(key, _)| **key != self.response_key)
            .map(|(_, name)| name.as_str())
    }

    /// Every resolved name, de-duplicated, in a stable order: request, path,
    /// query, header, then responses.
    pub fn all(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let candidates = self
            .request
            .iter()
            .chain(self.parameters.path.iter())
            .chain(self.parameters.query.iter())
            .chain(self.parameters.header.iter())
            .chain(self.responses.values());
        for name in candidates {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

/// Schema-presence flags driving template selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    pub with_query_params: bool,
    pub with_data: bool,
    pub with_path_params: bool,
    pub with_headers: bool,
}

/// Name, file and schema resolution for operations, on behalf of the active
/// plugin.
#[derive(Clone, Copy)]
pub struct OperationManager<'a> {
    context: PluginContext<'a>,
    extractor: &'a dyn SchemaExtractor,
}

impl std::fmt::Debug for OperationManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationManager")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<'a> OperationManager<'a> {
    /// Fails when the context has no schema extractor: nothing can be
    /// grouped or synthesized without it.
    pub fn new(context: PluginContext<'a>) -> Result<Self, ManagerError> {
        let extractor = context
            .extractor
            .ok_or_else(|| ManagerError::MissingExtractor {
                plugin: context.plugin.to_string(),
            })?;
        Ok(Self { context, extractor })
    }

    /// Canonical name of `operation` for a plugin and artifact kind.
    pub fn resolve_name(
        &self,
        operation: &Operation,
        options: NameOptions<'_>,
    ) -> Result<String, ManagerError> {
        self.resolve(operation, &operation.id(), options)
    }

    /// Canonical name of one of the operation's schemas.
    pub fn resolve_schema_name(
        &self,
        operation: &Operation,
        schema: &SchemaRef,
        options: NameOptions<'_>,
    ) -> Result<String, ManagerError> {
        self.resolve(operation, &schema.name, options)
    }

    /// The file the operation's artifact of a plugin lives in. Registers the
    /// file with the file service.
    pub fn resolve_file(
        &self,
        operation: &Operation,
        options: FileOptions<'_>,
    ) -> Result<ResolvedFile, ManagerError> {
        let plugin_key = options.plugin_key.unwrap_or(self.context.plugin);
        let extension = options.extension.unwrap_or(DEFAULT_EXTENSION);
        let tag = operation.first_tag();
        let name = self.resolve_name(
            operation,
            NameOptions::for_plugin(plugin_key, ArtifactKind::File),
        )?;

        let location = self
            .context
            .files
            .resolve_file(&FileRequest {
                name: &name,
                extension,
                plugin_key,
                tag,
            })
            .map_err(|source| self.resolution_error(operation, plugin_key, ArtifactKind::File, &name, source))?;

        Ok(ResolvedFile {
            base_name: location.base_name,
            path: location.path,
            meta: FileMeta {
                name,
                plugin_key: plugin_key.clone(),
                tag: tag.map(String::from),
            },
        })
    }

    /// Resolve the name of every schema role of the operation.
    ///
    /// Errors are folded into `responses` by status code; errors without a
    /// status code cannot be addressed by key and are left out.
    pub fn group_schemas(
        &self,
        operation: &Operation,
        options: NameOptions<'_>,
    ) -> Result<ResolvedNames, ManagerError> {
        let schemas = self.get_schemas(operation, None);
        let resolve = |schema: &Option<SchemaRef>| -> Result<Option<String>, ManagerError> {
            schema
                .as_ref()
                .map(|s| self.resolve_schema_name(operation, s, options))
                .transpose()
        };

        let response_key = StatusKey::from_code(schemas.response.status_code);
        let mut responses = IndexMap::new();
        responses.insert(
            response_key,
            self.resolve_schema_name(operation, &schemas.response, options)?,
        );

        for error in &schemas.errors {
            let Some(code) = error.status_code else {
                debug!(
                    "dropping error schema {} of {}: no status code",
                    error.name,
                    operation.id()
                );
                continue;
            };
            responses.insert(
                StatusKey::Code(code),
                self.resolve_schema_name(operation, error, options)?,
            );
        }

        Ok(ResolvedNames {
            request: resolve(&schemas.request)?,
            parameters: ParameterNames {
                path: resolve(&schemas.path_params)?,
                query: resolve(&schemas.query_params)?,
                header: resolve(&schemas.header_params)?,
            },
            responses,
            response_key,
        })
    }

    /// The operation's schemas, optionally narrowed to one status code.
    pub fn get_schemas(&self, operation: &Operation, status_code: Option<u16>) -> SchemaBundle {
        self.extractor.extract(operation, status_code)
    }

    fn resolve(
        &self,
        operation: &Operation,
        name: &str,
        options: NameOptions<'_>,
    ) -> Result<String, ManagerError> {
        let plugin_key = options.plugin_key.unwrap_or(self.context.plugin);
        self.context
            .resolver
            .resolve_name(&ResolveNameParams {
                name,
                plugin_key,
                kind: options.kind,
            })
            .map_err(|source| self.resolution_error(operation, plugin_key, options.kind, name, source))
    }

    fn resolution_error(
        &self,
        operation: &Operation,
        plugin_key: &PluginKey,
        kind: ArtifactKind,
        name: &str,
        source: ResolveError,
    ) -> ManagerError {
        ManagerError::Resolution {
            operation: operation.id(),
            plugin: plugin_key.to_string(),
            kind,
            name: name.to_string(),
            source,
        }
    }
}
