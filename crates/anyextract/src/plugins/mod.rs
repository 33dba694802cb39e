//! Plugin system: format adapters and OCR backends.
//!
//! # Plugin Types
//!
//! - [`Plugin`] - Base trait with name, version and lifecycle hooks
//! - [`DocumentAdapter`] - Turns one family of formats into ordered text
//! - [`OcrBackend`] - Recognizes text in images
//!
//! Adapters are stored as `Arc<dyn DocumentAdapter>` in an [`AdapterRegistry`]
//! owned by the [`Engine`](crate::Engine).
//!
//! # Example: Custom Adapter
//!
//! ```rust
//! use anyextract::plugins::{AdapterContext, DocumentAdapter, Plugin};
//! use anyextract::{Engine, ExtractorConfig, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct CsvAdapter;
//!
//! impl Plugin for CsvAdapter {
//!     fn name(&self) -> &str { "csv-adapter" }
//!     fn version(&self) -> String { "1.0.0".to_string() }
//!     fn initialize(&self) -> Result<()> { Ok(()) }
//!     fn shutdown(&self) -> Result<()> { Ok(()) }
//! }
//!
//! #[async_trait]
//! impl DocumentAdapter for CsvAdapter {
//!     fn supported_mime_types(&self) -> &[&str] { &["text/csv"] }
//!
//!     async fn extract(&self, content: &[u8], _ctx: &AdapterContext<'_>) -> Result<String> {
//!         Ok(String::from_utf8_lossy(content).replace(',', " | "))
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut engine = Engine::new(ExtractorConfig::default())?;
//! engine.register_adapter(Arc::new(CsvAdapter))?;
//! assert!(engine.list_registered_mime_types().contains(&"text/csv".to_string()));
//! # Ok(())
//! # }
//! ```

mod adapter;
mod ocr;
pub mod registry;
mod traits;

pub use adapter::{AdapterContext, DocumentAdapter, ImageDescriber, NoImages};
pub use ocr::{OcrBackend, OcrBackendType};
pub use registry::AdapterRegistry;
pub use traits::Plugin;
