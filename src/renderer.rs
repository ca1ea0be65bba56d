use std::io::Write;

use crate::document::{DocumentMetadata, PageSize};
use crate::error::{ContextError, GenerationError};

/// The name of the collaborator which renders the documents in this crate.
pub const COLLABORATOR_NAME: &str = "lopdf";

/// What the user should run when the collaborator has not been compiled in.
pub const COLLABORATOR_HINT: &str = "cargo build --features lopdf-renderer";

/// A drawing surface handed out by a `Renderer`. Its coordinate system has the origin at the
/// bottom-left corner of the page and is expressed in points.
pub trait Canvas {
    /// Draws the text with its baseline starting at the given position on the pending page.
    /// Positions outside of the page are accepted, the text is simply not visible. Non-finite
    /// positions are not rejected either, what they turn into is up to the renderer.
    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<(), ContextError>;

    /// Seals the pending page, the following drawings go onto a new page.
    fn show_page(&mut self) -> Result<(), ContextError>;

    /// Serializes all the sealed pages, in the order they were sealed, into the writer.
    fn save_to(&mut self, writer: &mut dyn Write) -> Result<(), ContextError>;

    /// The number of pages sealed so far.
    fn page_count(&self) -> usize;
}

/// The external library which turns placements into an actual document.
pub trait Renderer {
    /// The name of the library, used when reporting.
    fn name(&self) -> &'static str;

    /// Creates an empty canvas whose pages all have the given size.
    fn create_canvas(
        &self,
        page_size: PageSize,
        metadata: &DocumentMetadata,
    ) -> Result<Box<dyn Canvas>, GenerationError>;
}

/// Retrieve the renderer compiled into this build.
#[cfg(feature = "lopdf-renderer")]
pub fn load() -> Result<Box<dyn Renderer>, GenerationError> {
    log::debug!("Using the {} renderer", COLLABORATOR_NAME);
    Ok(Box::new(crate::pdf::LopdfRenderer))
}

/// Retrieve the renderer compiled into this build, which in this case is none.
#[cfg(not(feature = "lopdf-renderer"))]
pub fn load() -> Result<Box<dyn Renderer>, GenerationError> {
    Err(missing_collaborator())
}

/// The error reported when the rendering collaborator is not available.
pub fn missing_collaborator() -> GenerationError {
    GenerationError::MissingDependency {
        collaborator: COLLABORATOR_NAME.into(),
        hint: COLLABORATOR_HINT.into(),
    }
}
