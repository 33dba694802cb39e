//! Adapter registration and lookup.
//!
//! Adapters are keyed by MIME type. Registering an adapter for a MIME type that
//! is already taken replaces the previous owner for that type (last writer
//! wins); an adapter left with no MIME types is shut down.

use crate::plugins::DocumentAdapter;
use crate::{AnyExtractError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Validate a plugin name before registration.
///
/// # Rules
///
/// - Name cannot be empty
/// - Name cannot contain whitespace
fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AnyExtractError::Plugin {
            message: "Plugin name cannot be empty".to_string(),
            plugin_name: String::new(),
        });
    }

    if name.contains(char::is_whitespace) {
        return Err(AnyExtractError::Plugin {
            message: format!("Plugin name '{}' cannot contain whitespace", name),
            plugin_name: name.to_string(),
        });
    }

    Ok(())
}

/// MIME type to adapter mapping, in registration order.
pub struct AdapterRegistry {
    adapters: IndexMap<String, Arc<dyn DocumentAdapter>>,
    name_index: HashMap<String, Vec<String>>,
}

impl AdapterRegistry {
    /// Create a new empty adapter registry.
    pub fn new() -> Self {
        Self {
            adapters: IndexMap::new(),
            name_index: HashMap::new(),
        }
    }

    /// Register an adapter for every MIME type it supports.
    ///
    /// Calls `initialize()` first; a failing adapter is not registered.
    pub fn register(&mut self, adapter: Arc<dyn DocumentAdapter>) -> Result<()> {
        let name = adapter.name().to_string();
        validate_plugin_name(&name)?;

        adapter.initialize()?;

        if self.name_index.contains_key(&name) {
            self.detach(&name)?;
        }

        let mime_types: Vec<String> = adapter.supported_mime_types().iter().map(|s| s.to_string()).collect();
        for mime_type in &mime_types {
            if let Some(previous) = self.adapters.insert(mime_type.clone(), Arc::clone(&adapter)) {
                self.release_mime(previous.name(), mime_type, &previous)?;
            }
        }

        tracing::debug!(adapter = %name, mime_types = ?mime_types, "registered adapter");
        self.name_index.insert(name, mime_types);

        Ok(())
    }

    /// Adapter registered for `mime_type`.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` naming the MIME type when nothing is registered.
    pub fn get(&self, mime_type: &str) -> Result<Arc<dyn DocumentAdapter>> {
        self.adapters
            .get(mime_type)
            .cloned()
            .ok_or_else(|| AnyExtractError::UnsupportedFormat(mime_type.to_string()))
    }

    pub fn contains(&self, mime_type: &str) -> bool {
        self.adapters.contains_key(mime_type)
    }

    /// Registered MIME types, in registration order.
    pub fn mime_types(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// Names of registered adapters.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove an adapter and every MIME type it owns.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        match self.detach(name)? {
            Some(adapter) => adapter.shutdown(),
            None => Ok(()),
        }
    }

    /// Shutdown all adapters and clear the registry.
    pub fn shutdown_all(&mut self) -> Result<()> {
        for name in self.list() {
            self.remove(&name)?;
        }
        Ok(())
    }

    fn detach(&mut self, name: &str) -> Result<Option<Arc<dyn DocumentAdapter>>> {
        let Some(mime_types) = self.name_index.remove(name) else {
            return Ok(None);
        };

        let mut detached = None;
        for mime_type in mime_types {
            if let Some(adapter) = self.adapters.shift_remove(&mime_type) {
                detached.get_or_insert(adapter);
            }
        }
        Ok(detached)
    }

    /// Drop `mime_type` from a replaced adapter, shutting it down when it owns
    /// nothing anymore.
    fn release_mime(&mut self, name: &str, mime_type: &str, adapter: &Arc<dyn DocumentAdapter>) -> Result<()> {
        let Some(owned) = self.name_index.get_mut(name) else {
            return Ok(());
        };
        owned.retain(|m| m != mime_type);
        if owned.is_empty() {
            self.name_index.remove(name);
            tracing::debug!(adapter = %name, "adapter replaced for all MIME types");
            adapter.shutdown()?;
        }
        Ok(())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("mime_types", &self.mime_types())
            .finish()
    }
}
