//! Optical character recognition.
//!
//! The default backend drives the `tesseract` executable as a subprocess,
//! streaming image bytes through stdin and reading recognized text from stdout.
//! Any other engine can be plugged in by implementing
//! [`OcrBackend`](crate::plugins::OcrBackend).

pub mod languages;
mod tesseract_backend;

pub use languages::{SUPPORTED_LANGUAGES, is_supported_language};
pub use tesseract_backend::TesseractCliBackend;
