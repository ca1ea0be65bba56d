use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use std::io::Write;
use time::OffsetDateTime;

use crate::document::{DocumentMetadata, PageSize, Placement};
use crate::encoding::{decode_win_ansi, encode_win_ansi};
use crate::error::{ContextError, GenerationError};
use crate::renderer::{Canvas, Renderer, COLLABORATOR_NAME};

/// The resource name under which the font is registered on every page.
const FONT_RESOURCE_NAME: &str = "F1";
/// The standard font used for all the text, it doesn't need to be embedded.
const FONT_BASE_NAME: &str = "Helvetica";
/// The size of the font in points.
pub const FONT_SIZE: f32 = 12.0;

/// The `Renderer` backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRenderer;

impl Renderer for LopdfRenderer {
    fn name(&self) -> &'static str {
        COLLABORATOR_NAME
    }

    fn create_canvas(
        &self,
        page_size: PageSize,
        metadata: &DocumentMetadata,
    ) -> Result<Box<dyn Canvas>, GenerationError> {
        Ok(Box::new(PdfDocument::new(page_size, metadata.clone())))
    }
}

/// The representation of a sealed PDF page, it holds the operations of its content stream.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// The number of the page in the document, starting from 1.
    pub(crate) number: usize,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// The operations composing the content stream of the page.
    pub(crate) operations: Vec<Operation>,
}

impl PdfPage {
    /// Encodes the operations into an uncompressed content stream.
    fn content_stream(&self) -> Result<lopdf::Stream, ContextError> {
        let content = Content {
            operations: self.operations.clone(),
        };
        let content_bytes = content.encode().map_err(|error| {
            ContextError::with_error(
                format!("Failed to encode the content of page {}", self.number),
                &error,
            )
        })?;

        // Page contents should not be compressed
        Ok(lopdf::Stream::new(lopdf::Dictionary::new(), content_bytes).with_compression(false))
    }
}

/// This struct represents the PDF document on a high-level: the pages sealed so far, the
/// operations of the pending page and the underlying `lopdf::Document`, which is only
/// populated when the document is saved.
pub struct PdfDocument {
    /// The underlying PDF document.
    inner_document: lopdf::Document,
    /// The size shared by all the pages.
    page_size: PageSize,
    /// The information written into the `Info` dictionary and the trailer.
    metadata: DocumentMetadata,
    /// The sealed pages of the PDF document.
    pages: Vec<PdfPage>,
    /// The operations drawn on the page which has not been sealed yet.
    pending_operations: Vec<Operation>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` defaulting the underlying PDF document to version 1.5
    /// of the PDF specification.
    pub fn new(page_size: PageSize, metadata: DocumentMetadata) -> Self {
        PdfDocument {
            inner_document: lopdf::Document::with_version("1.5"),
            page_size,
            metadata,
            pages: Vec::new(),
            pending_operations: Vec::new(),
        }
    }

    /// Build the object graph of the document out of the sealed pages.
    fn write_all(&mut self) -> Result<(), ContextError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        // The dates are pinned so that generating twice yields the same document
        let timestamp = to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH);
        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", "False".into()),
            ("CreationDate", String(timestamp.clone().into_bytes(), Literal)),
            ("ModDate", String(timestamp.into_bytes(), Literal)),
            ("Title", text_string(&self.metadata.title)),
            ("Author", text_string(&self.metadata.author)),
            ("Subject", text_string(&self.metadata.subject)),
            ("Creator", text_string(&self.metadata.creator)),
            ("Producer", text_string(&self.metadata.producer)),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        let pages_id = self.inner_document.new_object_id();
        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);
        let catalog_id = self.inner_document.add_object(catalog);

        self.inner_document
            .trailer
            .set("Root", Reference(catalog_id));
        self.inner_document
            .trailer
            .set("Info", Reference(document_info_id));
        let identifier = self.metadata.identifier.clone().into_bytes();
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(identifier.clone(), Literal),
                String(identifier, Literal),
            ]),
        );

        // A single standard font shared by every page
        let font_id = self
            .inner_document
            .add_object(lopdf::Dictionary::from_iter(vec![
                ("Type", Name("Font".into())),
                ("Subtype", "Type1".into()),
                ("BaseFont", FONT_BASE_NAME.into()),
                ("Encoding", "WinAnsiEncoding".into()),
            ]));
        let resources_id = self
            .inner_document
            .add_object(lopdf::Dictionary::from_iter(vec![(
                "Font",
                Dictionary(lopdf::Dictionary::from_iter(vec![(
                    FONT_RESOURCE_NAME,
                    Reference(font_id),
                )])),
            )]));

        let mut page_ids = Vec::<lopdf::Object>::with_capacity(self.pages.len());
        for page in self.pages.iter() {
            let media_box: lopdf::Object =
                vec![0.into(), 0.into(), page.width.into(), page.height.into()].into();
            let page_content_id = self.inner_document.add_object(page.content_stream()?);
            let page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                ("MediaBox", media_box.clone()),
                ("CropBox", media_box),
                ("Parent", Reference(pages_id)),
                ("Resources", Reference(resources_id)),
                ("Contents", Reference(page_content_id)),
            ]);

            let page_id = self.inner_document.add_object(page_dictionary);
            page_ids.push(Reference(page_id));
        }

        // The pages dictionary is inserted last because it needs all the page references
        let pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(page_ids.len() as i64)),
            ("Kids", Array(page_ids)),
        ]);
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        Ok(())
    }
}

impl Canvas for PdfDocument {
    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<(), ContextError> {
        self.pending_operations.extend(vec![
            Operation::new("BT", vec![]), // Begin text section
            Operation::new(
                "Tf",
                vec![FONT_RESOURCE_NAME.into(), FONT_SIZE.into()],
            ), // Set the font and the font size
            Operation::new("Td", vec![x.into(), y.into()]), // Set the position of the baseline
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]), // End text section
        ]);

        Ok(())
    }

    fn show_page(&mut self) -> Result<(), ContextError> {
        let page = PdfPage {
            number: self.pages.len() + 1,
            width: self.page_size.width,
            height: self.page_size.height,
            operations: std::mem::take(&mut self.pending_operations),
        };
        log::debug!(
            "Sealed page {} with {} operations",
            page.number,
            page.operations.len()
        );
        self.pages.push(page);

        Ok(())
    }

    fn save_to(&mut self, mut writer: &mut dyn Write) -> Result<(), ContextError> {
        if !self.pending_operations.is_empty() {
            return Err(ContextError::with_context(
                "Unable to save the PDF document while a page is still pending",
            ));
        }

        self.write_all()?;
        self.inner_document.save_to(&mut writer).map_err(|error| {
            ContextError::with_error("Error while saving the PDF document", &error)
        })?;

        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Reads a PDF document from its bytes and returns, page by page, the text placements found
/// in the content streams. Only the `Td` and `Tj` operators are interpreted.
pub fn read_placements(pdf_bytes: &[u8]) -> Result<Vec<Vec<Placement>>, ContextError> {
    let document = lopdf::Document::load_mem(pdf_bytes)
        .map_err(|error| ContextError::with_error("Failed to load the PDF document", &error))?;

    let mut pages = Vec::new();
    for (page_number, page_id) in document.get_pages() {
        let content_bytes = document.get_page_content(page_id).map_err(|error| {
            ContextError::with_error(
                format!("Failed to read the content of page {}", page_number),
                &error,
            )
        })?;
        let content = Content::decode(&content_bytes).map_err(|error| {
            ContextError::with_error(
                format!("Failed to decode the content of page {}", page_number),
                &error,
            )
        })?;

        let mut caret = (0.0, 0.0);
        let mut placements = Vec::new();
        for operation in content.operations {
            match (operation.operator.as_str(), operation.operands.as_slice()) {
                ("BT", _) => caret = (0.0, 0.0),
                ("Td", [x, y]) => {
                    let (Ok(x), Ok(y)) = (x.as_float(), y.as_float()) else {
                        return Err(ContextError::with_context(format!(
                            "Invalid text position on page {}",
                            page_number
                        )));
                    };
                    caret = (caret.0 + x, caret.1 + y);
                }
                ("Tj", [Object::String(bytes, _)]) => placements.push(Placement {
                    x: caret.0,
                    y: caret.1,
                    text: decode_win_ansi(bytes),
                }),
                _ => {}
            }
        }
        pages.push(placements);
    }

    Ok(pages)
}

/// Wraps a piece of metadata into a literal PDF string.
fn text_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

/// Formats the given time so that it matches what the PDF specification expects.
/// An example of it is the following: D:20170505150224+02'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_canvas() -> PdfDocument {
        PdfDocument::new(PageSize::LETTER, DocumentMetadata::default())
    }

    #[test]
    fn epoch_timestamp_is_formatted_for_pdf() {
        assert_eq!(
            to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH),
            "D:19700101000000+00'00'"
        );
    }

    #[test]
    fn saving_with_a_pending_page_fails() {
        let mut canvas = sample_canvas();
        canvas.draw_string(10.0, 10.0, "pending").unwrap();

        let mut bytes = Vec::new();
        assert!(canvas.save_to(&mut bytes).is_err());
    }

    #[test]
    fn placements_are_read_back_in_order() {
        let mut canvas = sample_canvas();
        canvas.draw_string(100.0, 750.0, "first").unwrap();
        canvas.draw_string(100.0, 720.0, "(second)").unwrap();
        canvas.show_page().unwrap();
        canvas.draw_string(-40.0, 900.0, "off the page").unwrap();
        canvas.show_page().unwrap();
        assert_eq!(canvas.page_count(), 2);

        let mut bytes = Vec::new();
        canvas.save_to(&mut bytes).unwrap();
        let pages = read_placements(&bytes).unwrap();

        similar_asserts::assert_eq!(
            pages,
            vec![
                vec![
                    Placement::new(100.0, 750.0, "first"),
                    Placement::new(100.0, 720.0, "(second)"),
                ],
                vec![Placement::new(-40.0, 900.0, "off the page")],
            ]
        );
    }

    #[test]
    fn non_finite_positions_are_not_rejected() {
        let mut canvas = sample_canvas();
        canvas
            .draw_string(f32::NAN, f32::INFINITY, "nowhere")
            .unwrap();
        canvas.show_page().unwrap();

        let mut bytes = Vec::new();
        canvas.save_to(&mut bytes).unwrap();
        let pages = read_placements(&bytes).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 1);
        assert_eq!(pages[0][0].text, "nowhere");
    }

    #[test]
    fn pages_carry_the_requested_media_box() {
        let page_size = PageSize {
            width: 300.0,
            height: 500.0,
        };
        let mut canvas = PdfDocument::new(page_size, DocumentMetadata::default());
        canvas.show_page().unwrap();

        let mut bytes = Vec::new();
        canvas.save_to(&mut bytes).unwrap();
        let document = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = *document.get_pages().get(&1).unwrap();
        let media_box = document
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|value| value.as_float().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(media_box, vec![0.0, 0.0, 300.0, 500.0]);
    }

    #[test]
    fn garbage_is_not_a_pdf() {
        assert!(read_placements(b"definitely not a PDF").is_err());
    }
}
