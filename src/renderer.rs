//! The renderer: runs the fixed stage order over one piece of content.
//!
//! A [`Renderer`] holds nothing but its options and its Markdown engine, both
//! fixed at construction. Rendering takes `&self`, so one renderer can serve
//! any number of threads at once.

use crate::config::RendererOptions;
use crate::error::RenderError;
use crate::output::{RenderOutput, StageTrace};
use crate::pipeline::blocks::escape_code;
use crate::pipeline::markdown::{self, ComrakEngine, MarkdownEngine};
use crate::pipeline::{Stage, MARKDOWN_STAGE, POST_STAGES, PRE_STAGES, RAW_STAGE};
use crate::preview;
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Turns author content into ready-to-embed HTML.
///
/// # Example
/// ```rust
/// use richmark::{Renderer, RendererOptions};
///
/// let renderer = Renderer::new(RendererOptions::default());
/// let html = renderer.render("- [x] Done").unwrap();
/// assert!(html.contains(r#"type="checkbox""#));
/// ```
pub struct Renderer {
    options: RendererOptions,
    engine: Box<dyn MarkdownEngine>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererOptions::default())
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl Renderer {
    /// A renderer using [`ComrakEngine`].
    pub fn new(options: RendererOptions) -> Self {
        Self::with_engine(options, ComrakEngine)
    }

    /// A renderer using a caller-supplied Markdown engine.
    pub fn with_engine(options: RendererOptions, engine: impl MarkdownEngine + 'static) -> Self {
        Self {
            options,
            engine: Box::new(engine),
        }
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Render `content` to HTML.
    ///
    /// # Errors
    /// [`RenderError::EngineFailed`] when the Markdown engine fails. Callers
    /// that prefer degraded output use [`Renderer::render_lossy`].
    pub fn render(&self, content: &str) -> Result<String, RenderError> {
        self.run(content, None)
    }

    /// Render `content`, recording every stage's output when `capture` is set.
    ///
    /// Without `capture` the trace stays empty and no per-stage copies are
    /// made.
    pub fn render_with_trace(
        &self,
        content: &str,
        capture: bool,
    ) -> Result<RenderOutput, RenderError> {
        let mut trace = StageTrace::new();
        let html = self.run(content, capture.then_some(&mut trace))?;
        Ok(RenderOutput { html, trace })
    }

    /// Render `content`, falling back to its escaped source when the engine
    /// fails.
    pub fn render_lossy(&self, content: &str) -> String {
        match self.render(content) {
            Ok(html) => html,
            Err(e) => {
                warn!("Falling back to escaped content: {}", e);
                format!(
                    "<pre class=\"render-fallback\">{}</pre>",
                    escape_code(content)
                )
            }
        }
    }

    /// Render the preview cut of `content` (see [`preview::preview_source`]).
    pub fn render_preview(&self, content: &str) -> Result<String, RenderError> {
        let source = preview::preview_source(self, content)?;
        self.render(&source)
    }

    fn run(
        &self,
        content: &str,
        mut trace: Option<&mut StageTrace>,
    ) -> Result<String, RenderError> {
        let start = Instant::now();
        debug!(bytes = content.len(), capture = trace.is_some(), "Rendering content");

        if let Some(t) = trace.as_deref_mut() {
            t.record(RAW_STAGE, content);
        }

        let text = self.apply(&PRE_STAGES, content.to_string(), &mut trace);

        let html = markdown::convert(self.engine.as_ref(), &text).inspect_err(|e| {
            warn!(engine = self.engine.name(), "Markdown conversion failed: {}", e);
        })?;
        trace!(stage = MARKDOWN_STAGE, bytes = html.len(), "Stage done");
        if let Some(t) = trace.as_deref_mut() {
            t.record(MARKDOWN_STAGE, &html);
        }

        let html = self.apply(&POST_STAGES, html, &mut trace);

        let stages_run = PRE_STAGES
            .iter()
            .chain(POST_STAGES.iter())
            .filter(|s| s.is_enabled(&self.options))
            .count();
        debug!(
            in_bytes = content.len(),
            stages = stages_run + 1,
            out_bytes = html.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Rendered content"
        );
        Ok(html)
    }

    fn apply(
        &self,
        stages: &[Stage],
        mut current: String,
        trace: &mut Option<&mut StageTrace>,
    ) -> String {
        for stage in stages.iter().filter(|s| s.is_enabled(&self.options)) {
            current = (stage.apply)(&current);
            trace!(stage = stage.name, bytes = current.len(), "Stage done");
            if let Some(t) = trace.as_deref_mut() {
                t.record(stage.name, &current);
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl MarkdownEngine for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn to_html(&self, _: &str) -> Result<String, RenderError> {
            Err(RenderError::EngineFailed {
                engine: "failing".into(),
                detail: "unavailable".into(),
            })
        }
    }

    /// Echoes its input so stage effects can be checked without an engine.
    struct Echo;

    impl MarkdownEngine for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn to_html(&self, markdown: &str) -> Result<String, RenderError> {
            Ok(markdown.to_string())
        }
    }

    #[test]
    fn test_trace_names_in_order() {
        let r = Renderer::default();
        let out = r.render_with_trace("Hello", true).unwrap();
        let names = out.trace.names();
        assert_eq!(names.first(), Some(&"00_raw"));
        assert_eq!(names.last(), Some(&"16_lightbox"));
        assert_eq!(names.len(), 17);
        assert_eq!(out.trace.final_output(), Some(out.html.as_str()));
        assert_eq!(out.trace.get("00_raw"), Some("Hello"));
    }

    #[test]
    fn test_trace_off_is_empty() {
        let out = Renderer::default().render_with_trace("Hello", false).unwrap();
        assert!(out.trace.is_empty());
        assert!(out.html.contains("Hello"));
    }

    #[test]
    fn test_disabled_stages_missing_from_trace() {
        let r = Renderer::new(RendererOptions::none());
        let names = r.render_with_trace("x", true).unwrap().trace.names();
        assert!(!names.contains(&"02_strip_style_snippets"));
        assert!(!names.contains(&"16_lightbox"));
        assert!(names.contains(&"09_markdown"));
        assert!(names.contains(&"15_inline_emphasis"));
    }

    #[test]
    fn test_render_matches_traced_render() {
        let r = Renderer::default();
        let input = "# T\n\n- [ ] a\n\n> q";
        assert_eq!(r.render(input).unwrap(), r.render_with_trace(input, true).unwrap().html);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let r = Renderer::with_engine(RendererOptions::default(), Failing);
        let err = r.render("x").unwrap_err();
        assert!(err.is_engine_failure());
    }

    #[test]
    fn test_render_lossy_escapes_source() {
        let r = Renderer::with_engine(RendererOptions::default(), Failing);
        assert_eq!(
            r.render_lossy("<b>a & b</b>"),
            "<pre class=\"render-fallback\">&lt;b&gt;a &amp; b&lt;/b&gt;</pre>"
        );
    }

    #[test]
    fn test_engine_sees_trailing_newline() {
        let r = Renderer::with_engine(RendererOptions::none(), Echo);
        assert_eq!(r.render("plain").unwrap(), "plain\n");
    }

    #[test]
    fn test_renderer_is_shareable_across_threads() {
        let r = std::sync::Arc::new(Renderer::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let r = r.clone();
                std::thread::spawn(move || r.render(&format!("**{i}**")).unwrap())
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert!(h.join().unwrap().contains(&format!("<strong>{i}</strong>")));
        }
    }
}
