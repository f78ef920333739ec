use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use log::{debug, warn};

use opgen_core::config::{self, CONFIG_FILE_NAME, OpgenConfig};
use opgen_core::context::PluginContext;
use opgen_core::ir::{self, Operation};
use opgen_core::manager::{FileOptions, NameOptions, OperationManager};
use opgen_core::registry::PluginRegistry;
use opgen_core::resolver::ArtifactKind;
use opgen_core::schema::ConventionalExtractor;
use opgen_core::{CodeGenerator, GeneratedFile};
use opgen_swr::{SwrGenerator, SwrOptions};

#[derive(Parser)]
#[command(name = "opgen", about = "Typed SWR hook generator for API operations", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate hook files from an operations manifest
    Generate {
        /// Path to the operations manifest (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory generated files are written under
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an operations manifest
    Validate {
        /// Path to the operations manifest
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the names, files and schemas resolved for every operation
    Inspect {
        /// Path to the operations manifest
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new opgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input, output } => cmd_generate(input, output),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "opgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OpgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    Ok(config::load_config(&config_path)?)
}

fn load_operations(path: &Path) -> Result<Vec<Operation>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let manifest = match ext {
        "json" => ir::from_json(&content),
        _ => ir::from_yaml(&content),
    }
    .with_context(|| format!("invalid operations manifest {}", path.display()))?;

    debug!("loaded {} operations from {}", manifest.operations.len(), path.display());
    Ok(manifest.operations)
}

/// Registry and generator options from the project config.
fn pipeline(cfg: &OpgenConfig) -> Result<(PluginRegistry, SwrOptions)> {
    let options = SwrOptions::from_value(&cfg.generator)?;
    let registry = PluginRegistry::new(cfg.plugins.clone());
    if !registry.contains(&options.plugin) {
        anyhow::bail!(
            "generator plugin {} is not configured; add it to `plugins`",
            options.plugin
        );
    }
    Ok((registry, options))
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

/// Generate the "do not edit" README.
fn readme_content() -> &'static str {
    r#"# Generated Code: Do Not Edit

This directory is **auto-generated** by opgen.
Any manual changes will be overwritten the next time `opgen generate` is run.

To regenerate, run:
```
opgen generate
```

To customize the generated output, edit your `.opgen.yaml` configuration file.
"#
}

fn cmd_generate(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let operations = load_operations(&input)?;
    let (registry, options) = pipeline(&cfg)?;

    eprintln!("Generating {} → {}", options.plugin, output_dir.display());
    let context = PluginContext::new(&options.plugin, &registry, &registry)
        .with_extractor(&ConventionalExtractor);
    let generation = SwrGenerator::new().generate(&operations, context, &options)?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(&output_dir, &generation.files)?;

    let readme_path = output_dir.join("README.md");
    fs::write(&readme_path, readme_content())
        .with_context(|| format!("failed to write {}", readme_path.display()))?;
    eprintln!("  wrote {}", readme_path.display());

    eprintln!(
        "Generated {} files in {}",
        generation.files.len() + 1, // +1 for README
        output_dir.display()
    );

    if !generation.skipped.is_empty() {
        for skipped in &generation.skipped {
            eprintln!("  skipped {}: {}", skipped.operation, skipped.reason);
        }
        anyhow::bail!(
            "{} of {} operations could not be generated",
            generation.skipped.len(),
            operations.len()
        );
    }
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let operations = load_operations(&input)?;

    let mut seen = HashSet::new();
    let duplicates: Vec<String> = operations
        .iter()
        .map(Operation::id)
        .filter(|id| !seen.insert(id.clone()))
        .collect();
    for id in &duplicates {
        warn!("duplicate operation id {id}");
    }

    let tags: HashSet<&str> = operations.iter().filter_map(Operation::first_tag).collect();
    let with_body = operations.iter().filter(|op| op.request_body.is_some()).count();

    eprintln!("Valid operations manifest: {}", input.display());
    eprintln!("  Operations: {}", operations.len());
    eprintln!("  With request body: {with_body}");
    eprintln!("  Tags: {}", tags.len());

    if !duplicates.is_empty() {
        anyhow::bail!("duplicate operation ids: {}", duplicates.join(", "));
    }
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let operations = load_operations(&input)?;
    let (registry, options) = pipeline(&cfg)?;

    let summary = build_inspect_summary(&operations, &registry, &options)?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(
    operations: &[Operation],
    registry: &PluginRegistry,
    options: &SwrOptions,
) -> Result<IndexMap<String, serde_json::Value>> {
    let context =
        PluginContext::new(&options.plugin, registry, registry).with_extractor(&ConventionalExtractor);
    let manager = OperationManager::new(context)?;
    let extension = Some(options.extension.as_str());

    let mut summary = IndexMap::new();
    for op in operations {
        let file = manager.resolve_file(
            op,
            FileOptions {
                plugin_key: None,
                extension,
            },
        )?;
        let types_file = manager.resolve_file(
            op,
            FileOptions {
                plugin_key: Some(&options.types_plugin),
                extension,
            },
        )?;
        let schemas = manager.group_schemas(
            op,
            NameOptions::for_plugin(&options.types_plugin, ArtifactKind::Type),
        )?;

        summary.insert(
            op.id(),
            serde_json::json!({
                "method": op.method.as_str(),
                "path": op.path,
                "tag": op.first_tag(),
                "function": manager.resolve_name(op, NameOptions::new(ArtifactKind::Function))?,
                "factory": manager.resolve_name(op, NameOptions::new(ArtifactKind::Type))?,
                "file": file,
                "types_file": types_file.path,
                "schemas": schemas,
                "features": schemas.features(),
            }),
        );
    }
    Ok(summary)
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
