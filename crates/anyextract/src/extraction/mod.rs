//! Format-level extraction: archive reading, markup parsing and the ordered
//! walks over each document model.
//!
//! Nothing here performs I/O beyond reading an archive or decides how images
//! are described. Walks return ordered items plus the raw media bytes they
//! reference; the adapters in [`crate::adapters`] resolve those references and
//! render the final text.

pub mod archive;
pub mod docx;
pub mod drawingml;
pub mod excel;
pub mod markup;
pub mod odf;
pub mod pptx;
pub mod relationships;
pub mod walker;

pub use archive::{ArchiveSource, read_selected_parts};
pub use markup::{Element, MarkupNode, parse_markup};
pub use relationships::{image_targets, notes_slide_target, resolve_relationships};
pub use walker::{Dispatch, DispatchTable, Walker};
