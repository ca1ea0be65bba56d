//! Generation of the deterministic PDF document the IApdf application is tested against.
//!
//! The document is three letter-sized pages of fixed text. Its content lives in the `fixture`
//! module and is placed through a `DocumentBuilder`, which hands every operation over to a
//! rendering collaborator. The collaborator shipped with this crate is built on top of `lopdf`
//! and is compiled in through the `lopdf-renderer` feature, enabled by default.

/// The module where the `DocumentBuilder` is presented, together with the data model of the
/// documents it produces.
///
/// # Introduction
///
/// A builder is opened on an output path, text is placed on the open page with `place_text`,
/// pages are closed with `end_page` and the whole document is written with `finalize`. The
/// output file is held by the builder for its whole lifetime and released when the builder is
/// dropped, whether the generation succeeded or not.
pub mod document;

/// The WinAnsi encoding used by the standard PDF fonts.
pub mod encoding;

/// This module contains the `ContextError` type, the error type used throughout this library,
/// and `GenerationError`, which tells apart a missing rendering collaborator from any other
/// failure.
pub mod error;

/// The fixed content of the IApdf test document.
pub mod fixture;

/// The `lopdf` implementation of the rendering collaborator, and a reader returning the text
/// placements of an existing PDF document.
#[cfg(feature = "lopdf-renderer")]
pub mod pdf;

/// The interface between the `DocumentBuilder` and the library which actually renders the pages.
pub mod renderer;
