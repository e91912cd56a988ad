//! The Markdown conversion step.
//!
//! The pipeline does not parse Markdown itself. It hands the normalised text
//! to a [`MarkdownEngine`] and post-processes whatever HTML comes back. The
//! engine must pass raw HTML through unescaped and support tables,
//! strikethrough and heading ids; [`ComrakEngine`] is the default.
//!
//! The engine is the only step that can fail. An engine error or panic becomes
//! [`RenderError::EngineFailed`]; nothing else in the pipeline returns a
//! `Result`.

use crate::error::RenderError;
use std::panic::{self, AssertUnwindSafe};

/// A CommonMark-like Markdown to HTML converter.
pub trait MarkdownEngine: Send + Sync {
    /// Short name used in logs and in [`RenderError::EngineFailed`].
    fn name(&self) -> &str;

    /// Convert `markdown` to HTML. `markdown` always ends with a newline.
    fn to_html(&self, markdown: &str) -> Result<String, RenderError>;
}

/// [`comrak`] with the GFM table, strikethrough and autolink extensions,
/// heading ids, and raw HTML passthrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakEngine;

impl MarkdownEngine for ComrakEngine {
    fn name(&self) -> &str {
        "comrak"
    }

    fn to_html(&self, markdown: &str) -> Result<String, RenderError> {
        let mut options = comrak::Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.header_ids = Some(String::new());
        options.render.r#unsafe = true;

        panic::catch_unwind(AssertUnwindSafe(|| {
            comrak::markdown_to_html(markdown, &options)
        }))
        .map_err(|payload| RenderError::EngineFailed {
            engine: self.name().to_string(),
            detail: panic_message(payload.as_ref()),
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "engine panicked".to_string()
    }
}

/// Run `engine` over `input`, adding the trailing newline it expects.
pub(crate) fn convert(engine: &dyn MarkdownEngine, input: &str) -> Result<String, RenderError> {
    if input.ends_with('\n') {
        engine.to_html(input)
    } else {
        engine.to_html(&format!("{input}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comrak_extensions() {
        let html = convert(&ComrakEngine, "| a | b |\n| --- | --- |\n| 1 | 2 |\n\n~~gone~~").unwrap();
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("<del>gone</del>"), "{html}");
    }

    #[test]
    fn test_comrak_passes_raw_html_through() {
        let html = convert(&ComrakEngine, "<div class=\"x\">**raw**</div>").unwrap();
        assert!(html.contains("<div class=\"x\">**raw**</div>"), "{html}");
    }

    #[test]
    fn test_comrak_heading_ids() {
        let html = convert(&ComrakEngine, "## Hello World").unwrap();
        assert!(html.contains("id=\"hello-world\""), "{html}");
    }

    struct Panicking;

    impl MarkdownEngine for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn to_html(&self, _: &str) -> Result<String, RenderError> {
            panic::catch_unwind(|| -> String { panic!("boom") }).map_err(|p| {
                RenderError::EngineFailed {
                    engine: self.name().to_string(),
                    detail: panic_message(p.as_ref()),
                }
            })
        }
    }

    #[test]
    fn test_panic_becomes_engine_failed() {
        let err = convert(&Panicking, "x").unwrap_err();
        assert!(err.is_engine_failure());
        assert!(err.to_string().contains("boom"), "{err}");
    }
}
