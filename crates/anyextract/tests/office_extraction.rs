//! End-to-end extraction of Office Open XML and OpenDocument packages through
//! the engine, including image descriptions routed through a registered image
//! adapter.

use anyextract::core::mime::{IMAGE_MIME_TYPES, ODF_PRESENTATION_MIME_TYPE, ODF_TEXT_MIME_TYPE};
use anyextract::plugins::{AdapterContext, DocumentAdapter, Plugin};
use anyextract::{AnyExtractError, Engine, ExtractionOptions, ExtractorConfig, ImageExtractionMethod, Result};
use async_trait::async_trait;
use helpers::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

mod helpers;

/// Names an image after the byte appended to the shared PNG header, so each
/// picture gets a distinguishable description.
struct LabelImages {
    calls: AtomicUsize,
}

impl LabelImages {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Plugin for LabelImages {
    fn name(&self) -> &str {
        "label-images"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl DocumentAdapter for LabelImages {
    fn supported_mime_types(&self) -> &[&str] {
        IMAGE_MIME_TYPES
    }

    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !ctx.options.extract_images {
            return Ok(String::new());
        }
        let label = content.last().copied().map(char::from).unwrap_or('?');
        Ok(format!("picture {}", label))
    }
}

fn png(label: u8) -> Vec<u8> {
    let mut bytes = PNG_BYTES.to_vec();
    bytes.push(label);
    bytes
}

fn engine_with_labels() -> (Engine, Arc<LabelImages>) {
    let mut engine = Engine::new(ExtractorConfig::default()).unwrap();
    let labels = Arc::new(LabelImages::new());
    engine.register_adapter(labels.clone()).unwrap();
    (engine, labels)
}

fn image_options() -> ExtractionOptions {
    ExtractionOptions::with_images(ImageExtractionMethod::Ocr)
}

#[tokio::test]
async fn test_docx_text_in_document_order() {
    let body = [
        docx_paragraph("Quarterly report"),
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Region</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Total</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#.to_string(),
        docx_paragraph("Closing words"),
    ]
    .concat();
    let bytes = docx_package(&body, &png(b'A'), &png(b'B'));

    let engine = Engine::new(ExtractorConfig::default()).unwrap();
    let text = engine.parse(bytes, None, None).await.unwrap();

    let report = text.find("Quarterly report").unwrap();
    let table = text.find("Region").unwrap();
    let closing = text.find("Closing words").unwrap();
    assert!(report < table && table < closing, "unexpected order: {text}");
    assert!(text.contains("Total"));
}

#[tokio::test]
async fn test_docx_image_descriptions_stay_in_place() {
    init_tracing();
    let body = format!(
        "<w:p><w:r><w:t>Intro</w:t></w:r>{}</w:p>{}<w:p>{}</w:p>",
        docx_drawing("rId6"),
        docx_paragraph("Middle"),
        docx_drawing("rId5")
    );
    let bytes = docx_package(&body, &png(b'A'), &png(b'B'));
    let (engine, labels) = engine_with_labels();

    let text = engine.parse(bytes, None, Some(&image_options())).await.unwrap();

    assert_eq!(text, "Intro\n[Image: picture B]\nMiddle\n[Image: picture A]");
    assert_eq!(labels.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_docx_images_skipped_without_extract_images() {
    let body = format!("<w:p><w:r><w:t>Intro</w:t></w:r>{}</w:p>", docx_drawing("rId5"));
    let bytes = docx_package(&body, &png(b'A'), &png(b'B'));
    let (engine, labels) = engine_with_labels();

    let text = engine.parse(bytes, None, None).await.unwrap();

    assert_eq!(text, "Intro");
    assert_eq!(labels.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_docx_without_main_part_is_corrupted() {
    let bytes = zip_package(&[
        ("[Content_Types].xml", b"<Types/>"),
        ("word/_rels/document.xml.rels", DOCX_RELS.as_bytes()),
    ]);
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let err = engine.parse(bytes, None, None).await.unwrap_err();
    assert!(matches!(err, AnyExtractError::CorruptedDocument { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_docx_extraction_is_idempotent() {
    let body = [docx_paragraph("One"), docx_paragraph("Two")].concat();
    let bytes = docx_package(&body, &png(b'A'), &png(b'B'));
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let first = engine.parse(bytes.clone(), None, None).await.unwrap();
    let second = engine.parse(bytes, None, None).await.unwrap();
    assert_eq!(first, "One\nTwo");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_pptx_slides_in_numeric_order_with_notes() {
    let bytes = zip_package(&[
        ("ppt/presentation.xml", b"<p:presentation/>"),
        ("ppt/slides/slide10.xml", &pptx_slide(&["Ten"])),
        ("ppt/slides/slide2.xml", &pptx_slide(&["Two"])),
        ("ppt/slides/slide1.xml", &pptx_slide(&["One"])),
        ("ppt/notesSlides/notesSlide2.xml", &pptx_slide(&["Remember two"])),
    ]);
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let text = engine.parse(bytes, None, None).await.unwrap();
    assert_eq!(text, "One\nTwo\nRemember two\nTen");
}

#[tokio::test]
async fn test_pptx_slide_images_described() {
    let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/></Relationships>"#;
    let image = png(b'C');
    let bytes = zip_package(&[
        ("ppt/slides/slide1.xml", &pptx_slide(&["Chart slide"])),
        ("ppt/slides/_rels/slide1.xml.rels", rels.as_bytes()),
        ("ppt/media/image1.png", &image),
        ("ppt/slides/slide2.xml", &pptx_slide(&["Thanks"])),
    ]);
    let (engine, _) = engine_with_labels();

    let text = engine.parse(bytes, None, Some(&image_options())).await.unwrap();
    assert_eq!(text, "Chart slide\n[Image]: picture C\nThanks");
}

#[tokio::test]
async fn test_xlsx_cells_resolved_through_shared_strings() {
    let sheet = xlsx_sheet(
        r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>North</t></is></c><c r="B2"><v>1200.5</v></c></row>"#,
    );
    let bytes = zip_package(&[
        ("xl/workbook.xml", b"<workbook/>"),
        ("xl/worksheets/sheet1.xml", &sheet),
        ("xl/sharedStrings.xml", &xlsx_shared_strings(&["Region", "Revenue"])),
    ]);
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let text = engine.parse(bytes, None, None).await.unwrap();
    assert_eq!(text, "Region\nRevenue\nNorth\n1200.5");
}

#[tokio::test]
async fn test_xlsx_shared_string_out_of_range_is_corrupted() {
    let sheet = xlsx_sheet(r#"<row r="1"><c r="A1" t="s"><v>7</v></c></row>"#);
    let bytes = zip_package(&[
        ("xl/workbook.xml", b"<workbook/>"),
        ("xl/worksheets/sheet1.xml", &sheet),
        ("xl/sharedStrings.xml", &xlsx_shared_strings(&["Only"])),
    ]);
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let err = engine.parse(bytes, None, None).await.unwrap_err();
    assert!(matches!(err, AnyExtractError::CorruptedDocument { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_odt_paragraphs() {
    let content = r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text><text:h text:outline-level="1">Minutes</text:h><text:p>Attendees<text:tab/>4</text:p><text:p>Decisions &amp; actions</text:p></office:text></office:body></office:document-content>"#;
    let bytes = odf_package(ODF_TEXT_MIME_TYPE, content);
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let text = engine.parse(bytes, None, None).await.unwrap();
    assert_eq!(text, "Minutes\nAttendees\t4\nDecisions & actions");
}

#[tokio::test]
async fn test_odp_speaker_notes_after_slides() {
    let content = r#"<office:document-content xmlns:office="o" xmlns:text="t" xmlns:draw="d" xmlns:presentation="p"><office:body><office:presentation><draw:page><draw:frame><draw:text-box><text:p>Welcome</text:p></draw:text-box></draw:frame><presentation:notes><draw:frame><draw:text-box><text:p>Greet the room</text:p></draw:text-box></draw:frame></presentation:notes></draw:page><draw:page><draw:frame><draw:text-box><text:p>Agenda</text:p></draw:text-box></draw:frame></draw:page></office:presentation></office:body></office:document-content>"#;
    let bytes = odf_package(ODF_PRESENTATION_MIME_TYPE, content);
    let engine = Engine::new(ExtractorConfig::default()).unwrap();

    let text = engine.parse(bytes, None, None).await.unwrap();
    assert_eq!(text, "Welcome\nAgenda\n\nGreet the room");
}
