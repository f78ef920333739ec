use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::naming::{Casing, NamingRule};
use crate::resolver::{ArtifactKind, PluginKey};

/// Key of the built-in types plugin.
pub const TYPES_PLUGIN: &str = "ts";
/// Key of the built-in validation-schema plugin.
pub const VALIDATORS_PLUGIN: &str = "zod";
/// Key of the built-in hooks plugin.
pub const HOOKS_PLUGIN: &str = "swr";

/// Top-level project configuration loaded from `.opgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpgenConfig {
    /// Operations manifest (YAML or JSON).
    pub input: String,
    /// Root directory all plugin outputs are written under.
    pub output: String,
    pub plugins: Vec<PluginConfig>,
    /// Generator-specific options, interpreted by the generator itself.
    pub generator: serde_json::Value,
}

impl Default for OpgenConfig {
    fn default() -> Self {
        Self {
            input: "operations.yaml".to_string(),
            output: "src/gen".to_string(),
            plugins: PluginConfig::builtin(),
            generator: serde_json::Value::Null,
        }
    }
}

/// Naming and placement of one plugin's artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub key: PluginKey,
    /// Directory of the plugin's files, relative to the project output.
    pub output: String,
    /// Place files in a sub-directory named after the operation's first tag.
    #[serde(default)]
    pub group_by_tag: bool,
    #[serde(default)]
    pub naming: NamingConvention,
}

impl PluginConfig {
    pub fn new(key: &str, output: &str) -> Self {
        Self {
            key: PluginKey::new(key),
            output: output.to_string(),
            group_by_tag: false,
            naming: NamingConvention::default(),
        }
    }

    /// TypeScript types: `PetStatus`, file `listPets.ts`.
    pub fn types() -> Self {
        Self::new(TYPES_PLUGIN, "types")
    }

    /// Zod schemas: `createPetRequestSchema`, file `createPet.ts`.
    pub fn validators() -> Self {
        let mut plugin = Self::new(VALIDATORS_PLUGIN, "zod");
        plugin.naming.function = NamingRule::new(Casing::Camel).with_suffix("schema");
        plugin
    }

    /// SWR hooks: `useCreatePet`, file `useCreatePet.ts`.
    pub fn hooks() -> Self {
        let mut plugin = Self::new(HOOKS_PLUGIN, "hooks");
        plugin.naming.function = NamingRule::new(Casing::Camel).with_prefix("use");
        plugin.naming.file = NamingRule::new(Casing::Camel).with_prefix("use");
        plugin
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::types(), Self::validators(), Self::hooks()]
    }
}

/// One naming rule per artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConvention {
    pub file: NamingRule,
    pub function: NamingRule,
    #[serde(rename = "type")]
    pub type_name: NamingRule,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            file: NamingRule::new(Casing::Camel),
            function: NamingRule::new(Casing::Camel),
            type_name: NamingRule::new(Casing::Pascal),
        }
    }
}

impl NamingConvention {
    pub fn rule(&self, kind: ArtifactKind) -> &NamingRule {
        match kind {
            ArtifactKind::File => &self.file,
            ArtifactKind::Function => &self.function,
            ArtifactKind::Type => &self.type_name,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".opgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OpgenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: OpgenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# opgen configuration
input: operations.yaml
output: src/gen

plugins:
  - key: ts
    output: types
  - key: zod
    output: zod
    naming:
      function: { case: camel, suffix: schema }
  - key: swr
    output: hooks
    group_by_tag: false
    naming:
      file: { case: camel, prefix: use }
      function: { case: camel, prefix: use }

generator:
  plugin: swr
  types_plugin: ts
  validator_plugin: zod   # null skips the react-hook-form wrapper
  client_import_path: "@opgen/client"
  data_return_type: data  # data | full
  extension: .ts
"#
}
