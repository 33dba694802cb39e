//! Error types for AnyExtract.
//!
//! Every fallible operation in the crate returns [`AnyExtractError`]. Errors fall
//! into two groups:
//!
//! **Fatal errors bubble up to the caller:**
//! - `Io` - unreadable files and missing paths, always surfaced unchanged
//! - `Archive` - container bytes that are not a readable zip package
//! - `CorruptedDocument` - a readable container missing a mandatory part, or
//!   holding an out-of-range cross-reference
//! - `MalformedDocument` - markup that cannot be tokenized, or nests beyond the
//!   walker's depth ceiling
//! - `UnsupportedFormat` - a MIME type was detected but no adapter is registered
//! - `Configuration` - an operation needs credentials or settings that are absent
//! - `UpstreamService` - a remote service (wiki, vision provider, download) failed
//! - `Ocr` - the OCR backend could not run or rejected the image
//!
//! **Per-item failures are degraded, not raised.** Image description failures are
//! logged with `tracing::warn!` by the adapter and contribute an empty string.
//!
//! # Example
//!
//! ```rust
//! use anyextract::{AnyExtractError, Result};
//!
//! fn main_part(parts: &[(&str, &[u8])]) -> Result<Vec<u8>> {
//!     parts
//!         .iter()
//!         .find(|(path, _)| *path == "word/document.xml")
//!         .map(|(_, bytes)| bytes.to_vec())
//!         .ok_or_else(|| AnyExtractError::corrupted_document("word/document.xml is missing"))
//! }
//! # assert!(main_part(&[]).is_err());
//! ```
use thiserror::Error;

/// Result type alias using `AnyExtractError`.
pub type Result<T> = std::result::Result<T, AnyExtractError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all AnyExtract operations.
#[derive(Debug, Error)]
pub enum AnyExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {message}")]
    Archive {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Corrupted document: {message}")]
    CorruptedDocument {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Malformed document: {message}")]
    MalformedDocument {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("No extraction method registered for MIME type '{0}'")]
    UnsupportedFormat(String),

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Upstream service error: {message}")]
    UpstreamService {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AnyExtractError {
    fn from(err: serde_json::Error) -> Self {
        AnyExtractError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<zip::result::ZipError> for AnyExtractError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => AnyExtractError::Io(io_err),
            other => AnyExtractError::Archive {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

impl From<reqwest::Error> for AnyExtractError {
    fn from(err: reqwest::Error) -> Self {
        let message = match err.url() {
            Some(url) => format!("request to {} failed: {}", url, err),
            None => format!("request failed: {}", err),
        };
        AnyExtractError::UpstreamService {
            message,
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl AnyExtractError {
    error_constructor!(archive, Archive);
    error_constructor!(corrupted_document, CorruptedDocument);
    error_constructor!(malformed_document, MalformedDocument);
    error_constructor!(configuration, Configuration);
    error_constructor!(upstream_service, UpstreamService);
    error_constructor!(ocr, Ocr);
    error_constructor!(serialization, Serialization);

    /// Create an error reporting that a file or directory does not exist.
    pub fn not_found(path: impl std::fmt::Display) -> Self {
        AnyExtractError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File or directory does not exist: {}", path),
        ))
    }
}
