use log::{debug, info, warn};
use opgen_core::context::PluginContext;
use opgen_core::ir::Operation;
use opgen_core::manager::{FileOptions, NameOptions, OperationManager, ResolvedFile};
use opgen_core::resolver::ArtifactKind;
use opgen_core::{CodeGenerator, GeneratedFile, Generation, SkippedOperation};
use rayon::prelude::*;

use crate::composer::{ComposeInput, LocalNames, compose, localize};
use crate::error::SwrError;
use crate::mutation::{FormBinding, MutationInput, MutationTemplate, SwrMutationTemplate, synthesize};
use crate::options::SwrOptions;
use crate::schema_type::{client_alias, factory_types};

/// SWR mutation hook generator: one file per operation.
pub struct SwrGenerator {
    template: Box<dyn MutationTemplate>,
}

/// Every name and file an operation needs, resolved before synthesis.
#[derive(Debug, Clone)]
struct Prepared<'o> {
    operation: &'o Operation,
    file: ResolvedFile,
    types_file: ResolvedFile,
    name: String,
    factory: String,
    type_names: LocalNames,
    path_params: Vec<String>,
    form: Option<FormBinding>,
}

impl SwrGenerator {
    pub fn new() -> Self {
        Self::with_template(SwrMutationTemplate)
    }

    /// Generate with a different hook template.
    pub fn with_template(template: impl MutationTemplate + 'static) -> Self {
        Self {
            template: Box::new(template),
        }
    }

    fn prepare<'o>(
        manager: &OperationManager<'_>,
        operation: &'o Operation,
        options: &SwrOptions,
    ) -> Result<Prepared<'o>, SwrError> {
        let extension = Some(options.extension.as_str());
        let file = manager.resolve_file(
            operation,
            FileOptions {
                plugin_key: None,
                extension,
            },
        )?;
        let types_file = manager.resolve_file(
            operation,
            FileOptions {
                plugin_key: Some(&options.types_plugin),
                extension,
            },
        )?;
        let name = manager.resolve_name(operation, NameOptions::new(ArtifactKind::Function))?;
        let factory = manager.resolve_name(operation, NameOptions::new(ArtifactKind::Type))?;
        let type_names = manager.group_schemas(
            operation,
            NameOptions::for_plugin(&options.types_plugin, ArtifactKind::Type),
        )?;
        let type_names = localize(
            &type_names,
            &[factory.as_str(), client_alias(&factory).as_str(), name.as_str()],
        );

        let schemas = manager.get_schemas(operation, None);
        let path_params = schemas
            .path_params
            .map(|schema| schema.properties)
            .unwrap_or_default();

        let form = match (&options.validator_plugin, &schemas.request) {
            (Some(validator), Some(request)) => Some(FormBinding {
                validation_schema: manager.resolve_schema_name(
                    operation,
                    request,
                    NameOptions::for_plugin(validator, ArtifactKind::Function),
                )?,
                validator_file: manager.resolve_file(
                    operation,
                    FileOptions {
                        plugin_key: Some(validator),
                        extension,
                    },
                )?,
            }),
            _ => None,
        };

        Ok(Prepared {
            operation,
            file,
            types_file,
            name,
            factory,
            type_names,
            path_params,
            form,
        })
    }

    fn render(&self, prepared: Prepared<'_>, options: &SwrOptions) -> Result<GeneratedFile, SwrError> {
        let functions = synthesize(
            MutationInput {
                operation: prepared.operation,
                name: &prepared.name,
                factory: &prepared.factory,
                names: &prepared.type_names.names,
                path_params: &prepared.path_params,
                data_return_type: options.data_return_type,
                form: prepared.form,
            },
            self.template.as_ref(),
        )?;

        let path = prepared.file.path.clone();
        let file = compose(ComposeInput {
            file: prepared.file,
            types_file: &prepared.types_file,
            type_names: &prepared.type_names,
            client_import_path: &options.client_import_path,
            data_return_type: options.data_return_type,
            types: factory_types(
                &prepared.factory,
                &prepared.type_names.names,
                options.data_return_type,
            ),
            functions,
        });

        let content = opgen_typescript::print_file(&file)?;
        Ok(GeneratedFile { path, content })
    }

    fn render_all<'o>(
        &self,
        prepared: Vec<Prepared<'o>>,
        options: &SwrOptions,
    ) -> Vec<(String, Result<GeneratedFile, SwrError>)> {
        prepared
            .into_par_iter()
            .map(|p| (p.operation.id(), self.render(p, options)))
            .collect()
    }
}

impl Default for SwrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for SwrGenerator {
    type Config = SwrOptions;
    type Error = SwrError;

    fn generate(
        &self,
        operations: &[Operation],
        context: PluginContext<'_>,
        config: &SwrOptions,
    ) -> Result<Generation, SwrError> {
        let manager = OperationManager::new(context)?;
        let mut generation = Generation::default();

        // Names are claimed in input order so collision suffixes do not
        // depend on scheduling.
        let mut prepared = Vec::with_capacity(operations.len());
        for operation in operations {
            match Self::prepare(&manager, operation, config) {
                Ok(p) => prepared.push(Some(p)),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!("skipping operation {}: {err}", operation.id());
                    generation.skipped.push(SkippedOperation {
                        operation: operation.id(),
                        reason: err.to_string(),
                    });
                    prepared.push(None);
                }
            }
        }

        let prepared: Vec<Prepared<'_>> = prepared.into_iter().flatten().collect();
        debug!("rendering {} operations", prepared.len());

        let rendered = match config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.render_all(prepared, config)),
            None => self.render_all(prepared, config),
        };

        for (operation, result) in rendered {
            match result {
                Ok(file) => {
                    info!("generated {}", file.path);
                    generation.files.push(file);
                }
                Err(err) => {
                    warn!("skipping operation {operation}: {err}");
                    generation.skipped.push(SkippedOperation {
                        operation,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(generation)
    }
}
