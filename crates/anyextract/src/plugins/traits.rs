//! Base plugin trait definition.
//!
//! Document adapters and OCR backends share the `Plugin` lifecycle: a stable
//! name used for registration, a version, and `initialize`/`shutdown` hooks
//! called by the registry.

use crate::Result;

pub trait Plugin: Send + Sync {
    /// Unique, whitespace-free name, e.g. `docx-adapter`.
    fn name(&self) -> &str;

    fn version(&self) -> String;

    /// Called once when the plugin is registered.
    fn initialize(&self) -> Result<()>;

    /// Called when the plugin is removed or replaced.
    fn shutdown(&self) -> Result<()>;

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }
}
