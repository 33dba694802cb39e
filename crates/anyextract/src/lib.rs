//! AnyExtract - ordered plain-text extraction from heterogeneous documents
//!
//! AnyExtract turns Word, PowerPoint, Excel, OpenDocument, PDF, plain-text and
//! image inputs, plus Confluence wiki pages, into plain text that keeps the
//! reading order of the source. Embedded images can be run through OCR or a
//! vision model and their descriptions spliced in where the image appears.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use anyextract::{Engine, ExtractionOptions, ExtractorConfig, ImageExtractionMethod};
//!
//! # async fn example() -> anyextract::Result<()> {
//! let engine = Engine::new(ExtractorConfig::default())?;
//!
//! let plain = engine.parse("report.docx", None, None).await?;
//! println!("{plain}");
//!
//! let options = ExtractionOptions::with_images(ImageExtractionMethod::Ocr);
//! let with_images = engine.parse("slides.pptx", None, Some(&options)).await?;
//! println!("{with_images}");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): the [`Engine`], MIME detection, configuration and byte acquisition
//! - **Adapters** (`adapters`): one [`DocumentAdapter`](plugins::DocumentAdapter) per format family
//! - **Extraction** (`extraction`): archive reading, markup parsing and the ordered tree walker
//! - **Plugins** (`plugins`): adapter and OCR backend traits plus the MIME registry
//! - **OCR / Vision** (`ocr`, `vision`): image text recognition and vision-model descriptions
//! - **Wiki** (`wiki`): Confluence storage-format retrieval and walking

#![deny(unsafe_code)]

pub mod adapters;
pub mod core;
pub mod error;
pub mod extraction;
pub mod ocr;
pub mod plugins;
pub mod types;
pub mod vision;
pub mod wiki;

pub use error::{AnyExtractError, Result};
pub use types::*;

pub use core::engine::{Engine, ParseInput};

pub use core::config::{
    ConfluenceConfig, ExtractionOptions, ExtractorConfig, ImageExtractionMethod, VisionConfig, VisionProvider,
    WikiDeployment, WikiExtractionOptions,
};

pub use core::mime::{
    DOCX_MIME_TYPE, EXCEL_MIME_TYPE, JSON_MIME_TYPE, PDF_MIME_TYPE, PLAIN_TEXT_MIME_TYPE, POWER_POINT_MIME_TYPE,
    detect_mime_type_from_bytes,
};
