//! Error types for the richmark library.
//!
//! Every pipeline stage is a total function over arbitrary strings, so the
//! pipeline itself has no error taxonomy. The only condition worth surfacing
//! is the Markdown engine failing, reported as
//! [`RenderError::EngineFailed`]. The file-level entry points in
//! [`crate::convert`] add the two I/O variants.
//!
//! Callers that would rather degrade than fail (the post page, the editor
//! preview) use [`crate::Renderer::render_lossy`], which turns an engine
//! failure into escaped raw content.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the richmark library.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The Markdown engine returned an error or panicked.
    #[error("Rendering failed in markdown engine '{engine}': {detail}")]
    EngineFailed { engine: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input file.
    #[error("Failed to read input file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Whether this is the "rendering failed" condition callers fall back on.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, RenderError::EngineFailed { .. })
    }
}
