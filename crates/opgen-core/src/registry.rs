use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use log::debug;

use crate::config::PluginConfig;
use crate::error::ResolveError;
use crate::naming::{Casing, apply_case};
use crate::resolver::{
    ArtifactKind, FileLocation, FileRequest, FileResolver, NameResolver, PluginKey,
    ResolveNameParams,
};

/// Name and file resolution for a fixed set of plugins.
///
/// All mutable state (claimed identifiers, registered files) sits behind a
/// single mutex, so one registry can serve operations processed on several
/// threads.
pub struct PluginRegistry {
    plugins: IndexMap<PluginKey, PluginConfig>,
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    scopes: HashMap<(PluginKey, ArtifactKind), NameScope>,
    files: IndexMap<String, FileLocation>,
}

/// Identifiers claimed within one plugin and artifact kind.
#[derive(Default)]
struct NameScope {
    by_logical: HashMap<String, String>,
    taken: HashSet<String>,
}

impl NameScope {
    fn claim(&mut self, logical: &str, candidate: String) -> String {
        if let Some(existing) = self.by_logical.get(logical) {
            return existing.clone();
        }

        let mut resolved = candidate.clone();
        let mut counter = 2;
        while self.taken.contains(&resolved) {
            resolved = format!("{candidate}{counter}");
            counter += 1;
        }

        self.taken.insert(resolved.clone());
        self.by_logical
            .insert(logical.to_string(), resolved.clone());
        resolved
    }
}

impl PluginRegistry {
    /// Build a registry; a later plugin with an already used key replaces the
    /// earlier one.
    pub fn new(plugins: impl IntoIterator<Item = PluginConfig>) -> Self {
        let plugins = plugins
            .into_iter()
            .map(|plugin| (plugin.key.clone(), plugin))
            .collect();
        Self {
            plugins,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Registry with the built-in `ts`, `zod` and `swr` plugins.
    pub fn with_defaults() -> Self {
        Self::new(PluginConfig::builtin())
    }

    pub fn plugin(&self, key: &PluginKey) -> Option<&PluginConfig> {
        self.plugins.get(key)
    }

    pub fn contains(&self, key: &PluginKey) -> bool {
        self.plugins.contains_key(key)
    }

    /// Every file resolved so far, in first-registration order.
    pub fn files(&self) -> Vec<FileLocation> {
        self.lock().files.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // The state stays consistent across a panic: every mutation is a
        // single insert.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn plugin_or_err(&self, key: &PluginKey) -> Result<&PluginConfig, ResolveError> {
        self.plugins
            .get(key)
            .ok_or_else(|| ResolveError::UnknownPlugin(key.to_string()))
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl NameResolver for PluginRegistry {
    fn resolve_name(&self, params: &ResolveNameParams<'_>) -> Result<String, ResolveError> {
        let plugin = self.plugin_or_err(params.plugin_key)?;
        if params.name.trim().is_empty() {
            return Err(ResolveError::EmptyName {
                plugin: params.plugin_key.to_string(),
                kind: params.kind,
            });
        }

        let candidate = plugin.naming.rule(params.kind).apply(params.name);
        let resolved = self
            .lock()
            .scopes
            .entry((params.plugin_key.clone(), params.kind))
            .or_default()
            .claim(params.name, candidate);

        debug!(
            "resolved {} {:?} for {} → {}",
            params.kind, params.name, params.plugin_key, resolved
        );
        Ok(resolved)
    }
}

impl FileResolver for PluginRegistry {
    fn resolve_file(&self, request: &FileRequest<'_>) -> Result<FileLocation, ResolveError> {
        let plugin = self.plugin_or_err(request.plugin_key)?;

        let base_name = format!("{}{}", request.name, request.extension);
        let mut segments: Vec<String> = plugin
            .output
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(String::from)
            .collect();
        if plugin.group_by_tag
            && let Some(tag) = request.tag
        {
            segments.push(apply_case(tag, Casing::Camel));
        }
        segments.push(base_name.clone());

        let location = FileLocation {
            base_name,
            path: segments.join("/"),
        };

        let mut state = self.lock();
        if !state.files.contains_key(&location.path) {
            debug!("registered file {} for {}", location.path, request.plugin_key);
            state
                .files
                .insert(location.path.clone(), location.clone());
        }

        Ok(location)
    }
}
