use std::path::Path;

use crate::document::{Document, DocumentBuilder, DocumentMetadata, PageSize};
use crate::error::GenerationError;
use crate::renderer::{self, Renderer};

/// Where the fixture is written, relative to the working directory.
pub const FIXTURE_PATH: &str = "test_document.pdf";

/// The horizontal position shared by every line of the fixture.
const LEFT_MARGIN: f32 = 100.0;

/// The lines of every page of the fixture, from the top of the page to the bottom.
pub const FIXTURE_PAGES: [&[(f32, &str)]; 3] = [
    &[
        (750.0, "IApdf Test Document"),
        (720.0, "Page 1 of 3"),
        (680.0, "This is a test document for the IApdf application."),
        (650.0, "It contains sample text across multiple pages."),
        (620.0, "You can use this to test PDF processing with AI."),
    ],
    &[
        (750.0, "Page 2 - Technical Content"),
        (720.0, "Here we have some technical information:"),
        (680.0, "• PDF processing using pdftoppm"),
        (650.0, "• AI analysis with OpenRouter API"),
        (620.0, "• Electron-based desktop application"),
        (590.0, "• Modern web technologies"),
    ],
    &[
        (750.0, "Page 3 - Conclusion"),
        (720.0, "This test document demonstrates:"),
        (680.0, "1. Multi-page PDF processing"),
        (650.0, "2. Conversational AI context"),
        (620.0, "3. Document analysis capabilities"),
        (590.0, "Thank you for testing IApdf!"),
    ],
];

/// The metadata of the fixture, constant so that two generations produce the same document.
pub fn fixture_metadata() -> DocumentMetadata {
    DocumentMetadata {
        identifier: "IApdfTestDocumentFixture00000001".into(),
        title: "IApdf Test Document".into(),
        author: "IApdf".into(),
        subject: "Multi-page test fixture for the IApdf application".into(),
        ..DocumentMetadata::default()
    }
}

/// Generates the fixture at the given path with the renderer compiled into this build.
pub fn generate<P: AsRef<Path>>(output_path: P) -> Result<Document, GenerationError> {
    let renderer = renderer::load()?;
    generate_with(renderer.as_ref(), output_path)
}

/// Generates the fixture at the given path through the given renderer.
pub fn generate_with<P: AsRef<Path>>(
    renderer: &dyn Renderer,
    output_path: P,
) -> Result<Document, GenerationError> {
    let mut builder = DocumentBuilder::open_with(
        renderer,
        output_path,
        PageSize::LETTER,
        fixture_metadata(),
    )?;

    for (page_index, lines) in FIXTURE_PAGES.iter().enumerate() {
        for &(y, text) in lines.iter() {
            builder.place_text(LEFT_MARGIN, y, text)?;
        }
        // The last page is closed by `finalize`
        if page_index + 1 < FIXTURE_PAGES.len() {
            builder.end_page()?;
        }
    }

    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_run_from_the_top_of_the_page_downwards() {
        for lines in FIXTURE_PAGES.iter() {
            assert!((4..=6).contains(&lines.len()));
            assert!(lines.windows(2).all(|pair| pair[0].0 > pair[1].0));
        }
    }

    #[test]
    fn fixture_identifier_is_32_characters_long() {
        assert_eq!(fixture_metadata().identifier.len(), 32);
    }

    #[cfg(feature = "lopdf-renderer")]
    #[test]
    fn generated_fixture_has_three_pages() {
        let directory = tempfile::tempdir().unwrap();
        let output_path = directory.path().join(FIXTURE_PATH);

        let document = generate(&output_path).unwrap();

        assert_eq!(document.page_count(), 3);
        assert_eq!(
            document.pages()[0].texts().next(),
            Some("IApdf Test Document")
        );
        assert_eq!(
            document.pages()[2].texts().last(),
            Some("Thank you for testing IApdf!")
        );
        assert!(output_path.exists());
    }
}
