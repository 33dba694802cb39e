//! Engine, configuration, MIME detection and byte acquisition.
//!
//! [`Engine`] is the entry point: it reads bytes from memory, disk or HTTP,
//! sniffs their MIME type with a [`MimeDetector`](mime::MimeDetector) and hands
//! them to the adapter registered for that type.

pub mod config;
pub mod engine;
pub mod io;
pub mod mime;

pub use config::{
    ConfluenceConfig, ExtractionOptions, ExtractorConfig, HttpSettings, ImageExtractionMethod, Limits, OcrSettings,
    VisionConfig, VisionProvider, WikiDeployment, WikiExtractionOptions,
};
pub use engine::{Engine, ParseInput};
