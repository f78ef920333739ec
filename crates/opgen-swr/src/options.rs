use opgen_core::config::{HOOKS_PLUGIN, TYPES_PLUGIN, VALIDATORS_PLUGIN};
use opgen_core::resolver::PluginKey;
use serde::Deserialize;

use crate::error::SwrError;

/// What a generated hook resolves to: the response body, or the whole
/// client response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataReturnType {
    #[default]
    Data,
    Full,
}

impl DataReturnType {
    /// Expression the mutation fetcher returns.
    pub fn result_expression(&self) -> &'static str {
        match self {
            DataReturnType::Data => "res.data",
            DataReturnType::Full => "res",
        }
    }
}

/// Options of the SWR generator, read from the `generator` section of the
/// project config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwrOptions {
    /// Plugin the hooks are generated for.
    pub plugin: PluginKey,
    /// Plugin whose types the hooks import.
    pub types_plugin: PluginKey,
    /// Plugin providing request validation schemas; `None` disables the
    /// form wrapper.
    pub validator_plugin: Option<PluginKey>,
    /// Module the HTTP client is imported from.
    pub client_import_path: String,
    pub data_return_type: DataReturnType,
    pub extension: String,
    /// Worker threads used for synthesis; defaults to the global rayon
    /// pool.
    pub threads: Option<usize>,
}

impl Default for SwrOptions {
    fn default() -> Self {
        Self {
            plugin: PluginKey::new(HOOKS_PLUGIN),
            types_plugin: PluginKey::new(TYPES_PLUGIN),
            validator_plugin: Some(PluginKey::new(VALIDATORS_PLUGIN)),
            client_import_path: "@opgen/client".to_string(),
            data_return_type: DataReturnType::Data,
            extension: ".ts".to_string(),
            threads: None,
        }
    }
}

impl SwrOptions {
    /// Parse options from a config value; `null` yields the defaults.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SwrError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(value)?)
    }

    pub fn without_validator(mut self) -> Self {
        self.validator_plugin = None;
        self
    }
}
