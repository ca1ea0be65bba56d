use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use crate::error::{ContextError, GenerationError};
use crate::renderer::{self, Canvas, Renderer};

/// The size of the pages of a document, in points (1/72 of an inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US letter, 8.5 by 11 inches.
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
    /// ISO A4, 210 by 297 millimeters.
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };
}

/// The information describing the document as a whole rather than its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// The identifier of the document, it is used in order to set the PDF `ID` tag.
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub producer: String,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        DocumentMetadata {
            identifier: "00000000000000000000000000000000".into(),
            title: "Untitled".into(),
            author: "Unknown".into(),
            subject: String::new(),
            creator: env!("CARGO_PKG_NAME").into(),
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A single string drawn at a position of a page, the origin being the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl Placement {
    pub fn new<S: Into<String>>(x: f32, y: f32, text: S) -> Self {
        Placement {
            x,
            y,
            text: text.into(),
        }
    }
}

/// A closed page of a document. Its placements can be read but no longer extended.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    placements: Vec<Placement>,
}

impl Page {
    /// The placements of the page, in the order they were placed.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The placed strings, in the order they were placed.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.placements
            .iter()
            .map(|placement| placement.text.as_str())
    }
}

/// The finalized document: its pages in the order they were closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub output_path: PathBuf,
    pub page_size: PageSize,
    pub metadata: DocumentMetadata,
    pages: Vec<Page>,
}

impl Document {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Builds a document page after page and persists it at the output path once finalized.
///
/// The output file is acquired when the builder is opened and is owned by it until
/// `finalize` consumes the builder. Dropping the builder, on any path, releases the file.
pub struct DocumentBuilder {
    /// The file the document is written to.
    output: BufWriter<File>,
    /// The canvas of the rendering collaborator, which receives every operation.
    canvas: Box<dyn Canvas>,
    /// The pages closed so far.
    document: Document,
    /// The placements of the page which is currently open.
    open_page: Page,
}

impl DocumentBuilder {
    /// Opens a builder writing to the given path, with the renderer compiled into this build.
    /// If no renderer is available, the output path is never touched.
    pub fn open<P: AsRef<Path>>(output_path: P, page_size: PageSize) -> Result<Self, GenerationError> {
        let renderer = renderer::load()?;
        Self::open_with(
            renderer.as_ref(),
            output_path,
            page_size,
            DocumentMetadata::default(),
        )
    }

    /// Opens a builder writing to the given path through the given renderer.
    pub fn open_with<P: AsRef<Path>>(
        renderer: &dyn Renderer,
        output_path: P,
        page_size: PageSize,
        metadata: DocumentMetadata,
    ) -> Result<Self, GenerationError> {
        let output_path = output_path.as_ref().to_path_buf();
        // The canvas comes first so that a failing renderer leaves no file behind
        let canvas = renderer.create_canvas(page_size, &metadata)?;
        let output_file = File::create(&output_path).map_err(|error| {
            ContextError::with_error(
                format!("Failed to create the output file {:?}", output_path),
                &error,
            )
        })?;
        log::debug!(
            "Opened {:?} for a {}x{} document rendered by {}",
            output_path,
            page_size.width,
            page_size.height,
            renderer.name()
        );

        Ok(DocumentBuilder {
            output: BufWriter::new(output_file),
            canvas,
            document: Document {
                output_path,
                page_size,
                metadata,
                pages: Vec::new(),
            },
            open_page: Page::default(),
        })
    }

    /// Places the text at the given position of the open page. The position is not checked
    /// against the page bounds, neither are overlapping placements.
    pub fn place_text<S: Into<String>>(&mut self, x: f32, y: f32, text: S) -> Result<(), GenerationError> {
        let placement = Placement::new(x, y, text);
        log::trace!(
            "Placing {:?} at ({}, {}) on page {}",
            placement.text,
            x,
            y,
            self.document.pages.len() + 1
        );
        self.canvas.draw_string(x, y, &placement.text)?;
        self.open_page.placements.push(placement);

        Ok(())
    }

    /// Closes the open page and opens a new empty one for the following placements.
    pub fn end_page(&mut self) -> Result<(), GenerationError> {
        self.canvas.show_page()?;
        let page = std::mem::take(&mut self.open_page);
        log::debug!(
            "Closed page {} with {} placements",
            self.document.pages.len() + 1,
            page.placements.len()
        );
        self.document.pages.push(page);

        Ok(())
    }

    /// The number of pages closed so far.
    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    /// Closes the open page if anything was placed on it, writes all the pages to the output
    /// file in the order they were opened and releases the file.
    pub fn finalize(mut self) -> Result<Document, GenerationError> {
        if !self.open_page.placements.is_empty() {
            self.end_page()?;
        }

        let output_path = &self.document.output_path;
        self.canvas.save_to(&mut self.output)?;
        self.output.flush().map_err(|error| {
            ContextError::with_error(
                format!("Failed to flush the output file {:?}", output_path),
                &error,
            )
        })?;
        log::info!(
            "Saved {} pages to {:?}",
            self.canvas.page_count(),
            output_path
        );

        Ok(self.document)
    }
}
