//! MIME type detection.
//!
//! Detection is content based: magic bytes via `infer`, refined for zip containers
//! by looking at the package layout (the ODF `mimetype` entry, or the Office Open
//! XML top-level directories). Plain text and JSON carry no magic bytes and are
//! reported as undetected.

use std::io::{Cursor, Read};

pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const POWER_POINT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

pub const ODF_TEXT_MIME_TYPE: &str = "application/vnd.oasis.opendocument.text";
pub const ODF_SPREADSHEET_MIME_TYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";
pub const ODF_PRESENTATION_MIME_TYPE: &str = "application/vnd.oasis.opendocument.presentation";
pub const ODF_GRAPHICS_MIME_TYPE: &str = "application/vnd.oasis.opendocument.graphics";
pub const ODF_FORMULA_MIME_TYPE: &str = "application/vnd.oasis.opendocument.formula";

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const ZIP_MIME_TYPE: &str = "application/zip";

pub const JPEG_MIME_TYPE: &str = "image/jpeg";
pub const PNG_MIME_TYPE: &str = "image/png";
pub const WEBP_MIME_TYPE: &str = "image/webp";

pub const ODF_MIME_TYPES: &[&str] = &[
    ODF_TEXT_MIME_TYPE,
    ODF_SPREADSHEET_MIME_TYPE,
    ODF_PRESENTATION_MIME_TYPE,
    ODF_GRAPHICS_MIME_TYPE,
    ODF_FORMULA_MIME_TYPE,
];

pub const IMAGE_MIME_TYPES: &[&str] = &[JPEG_MIME_TYPE, PNG_MIME_TYPE, WEBP_MIME_TYPE];

/// Content-based MIME sniffing.
pub trait MimeDetector: Send + Sync {
    /// Detect the MIME type of `bytes`, or `None` when nothing is recognized.
    fn detect(&self, bytes: &[u8]) -> Option<String>;
}

/// Default detector: `infer` magic bytes plus zip package refinement.
#[derive(Debug, Default, Clone, Copy)]
pub struct InferMimeDetector;

impl MimeDetector for InferMimeDetector {
    fn detect(&self, bytes: &[u8]) -> Option<String> {
        detect_mime_type_from_bytes(bytes)
    }
}

/// Detect a MIME type from content.
///
/// Zip containers are inspected first so that every OpenDocument flavour and
/// every Office Open XML package resolves to its precise type.
pub fn detect_mime_type_from_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(b"PK\x03\x04")
        && let Some(mime) = refine_zip_container(bytes)
    {
        return Some(mime.to_string());
    }

    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// Declared ODF types are well under 100 bytes.
const MAX_MIMETYPE_ENTRY_BYTES: u64 = 256;

fn refine_zip_container(bytes: &[u8]) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;

    if let Ok(entry) = archive.by_name("mimetype") {
        let mut declared = Vec::new();
        if entry.take(MAX_MIMETYPE_ENTRY_BYTES).read_to_end(&mut declared).is_ok() {
            let declared = String::from_utf8_lossy(&declared);
            let declared = declared.trim();
            if declared.starts_with("application/vnd.oasis.opendocument") {
                return Some(declared.to_string());
            }
        }
    }

    let mut office: Option<&'static str> = None;
    for name in archive.file_names() {
        if name.starts_with("word/") {
            office = Some(DOCX_MIME_TYPE);
        } else if name.starts_with("xl/") {
            office = Some(EXCEL_MIME_TYPE);
        } else if name.starts_with("ppt/") {
            office = Some(POWER_POINT_MIME_TYPE);
        }
        if office.is_some() {
            break;
        }
    }

    office.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            for (name, data) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_detect_docx_package() {
        let bytes = zip_with(&[
            ("[Content_Types].xml", b"<Types/>"),
            ("word/document.xml", b"<w:document/>"),
        ]);
        assert_eq!(detect_mime_type_from_bytes(&bytes).as_deref(), Some(DOCX_MIME_TYPE));
    }

    #[test]
    fn test_detect_xlsx_and_pptx_packages() {
        let xlsx = zip_with(&[("xl/workbook.xml", b"<workbook/>")]);
        assert_eq!(detect_mime_type_from_bytes(&xlsx).as_deref(), Some(EXCEL_MIME_TYPE));

        let pptx = zip_with(&[("ppt/presentation.xml", b"<p:presentation/>")]);
        assert_eq!(detect_mime_type_from_bytes(&pptx).as_deref(), Some(POWER_POINT_MIME_TYPE));
    }

    #[test]
    fn test_detect_every_odf_flavour() {
        for mime in ODF_MIME_TYPES {
            let bytes = zip_with(&[("mimetype", mime.as_bytes()), ("content.xml", b"<office:document-content/>")]);
            assert_eq!(detect_mime_type_from_bytes(&bytes).as_deref(), Some(*mime));
        }
    }

    #[test]
    fn test_oversized_mimetype_entry_read_is_bounded() {
        let padded = format!("{}{}", ODF_TEXT_MIME_TYPE, " ".repeat(4 * 1024 * 1024));
        let bytes = zip_with(&[("mimetype", padded.as_bytes()), ("content.xml", b"<office:document-content/>")]);
        assert_eq!(detect_mime_type_from_bytes(&bytes).as_deref(), Some(ODF_TEXT_MIME_TYPE));

        let junk = "x".repeat(1024 * 1024);
        let bytes = zip_with(&[("mimetype", junk.as_bytes()), ("word/document.xml", b"<w:document/>")]);
        assert_eq!(detect_mime_type_from_bytes(&bytes).as_deref(), Some(DOCX_MIME_TYPE));
    }

    #[test]
    fn test_plain_zip_stays_zip() {
        let bytes = zip_with(&[("notes/readme.txt", b"hello")]);
        assert_eq!(detect_mime_type_from_bytes(&bytes).as_deref(), Some(ZIP_MIME_TYPE));
    }

    #[test]
    fn test_detect_images_and_pdf() {
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        assert_eq!(detect_mime_type_from_bytes(png).as_deref(), Some(PNG_MIME_TYPE));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(detect_mime_type_from_bytes(&jpeg).as_deref(), Some(JPEG_MIME_TYPE));

        let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n";
        assert_eq!(detect_mime_type_from_bytes(pdf).as_deref(), Some(PDF_MIME_TYPE));
    }

    #[test]
    fn test_plain_text_and_json_undetected() {
        assert_eq!(detect_mime_type_from_bytes(b"just some words"), None);
        assert_eq!(detect_mime_type_from_bytes(br#"{"name": "Sample"}"#), None);
    }

    #[test]
    fn test_detector_trait_object() {
        let detector: Box<dyn MimeDetector> = Box::new(InferMimeDetector);
        assert_eq!(detector.detect(b"plain"), None);
    }
}
