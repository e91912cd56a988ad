//! # richmark
//!
//! Render author-supplied rich text into presentation-ready HTML.
//!
//! ## Why this crate?
//!
//! Blog content is rarely clean Markdown. Authors mix hand-typed Markdown with
//! whatever a WYSIWYG editor produced: list items wrapped one per `<div>`,
//! headings typed inside `<p>`, non-breaking spaces, pasted CSS rules, tables
//! collapsed onto a single line. A Markdown engine alone renders most of that
//! as literal text. This crate wraps the engine in an ordered set of repair
//! stages so the output looks like what the author meant.
//!
//! ## Pipeline Overview
//!
//! ```text
//! raw content
//!  │
//!  ├─ 1. Pre-stages   whitespace, pasted CSS, read-more marker, list
//!  │                  containers, loose Markdown in HTML, pipe tables, fences
//!  ├─ 2. Markdown     comrak (tables, strikethrough, heading ids, raw HTML)
//!  ├─ 3. Post-stages  mermaid, task lists, YouTube, list/quote classes,
//!  │                  emphasis repair, lightbox
//!  └─ 4. Output       final HTML, plus an optional per-stage trace
//! ```
//!
//! Code samples are protected throughout: fenced blocks, `<pre>` and `<code>`
//! reach the output byte for byte (fences are HTML-escaped exactly once).
//!
//! ## Quick Start
//!
//! ```rust
//! use richmark::{Renderer, RendererOptions};
//!
//! let renderer = Renderer::new(RendererOptions::default());
//! let html = renderer.render("<div>- one</div><div>- two</div>").unwrap();
//! assert!(html.contains("<li class=\"mb-2\">one</li>"));
//!
//! // Debug: every intermediate stage
//! let out = renderer.render_with_trace("> quoted", true).unwrap();
//! for (stage, content) in out.trace.iter() {
//!     eprintln!("{stage}: {} bytes", content.len());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `richmark` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! richmark = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod renderer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RendererOptions, RendererOptionsBuilder, Switch};
pub use convert::{render_file, render_to_file};
pub use error::RenderError;
pub use output::{RenderOutput, StageTrace};
pub use pipeline::markdown::{ComrakEngine, MarkdownEngine};
pub use preview::{excerpt, preview_source, strip_html};
pub use renderer::Renderer;
