//! Pipeline stages for rich-text to HTML rendering.
//!
//! Each submodule implements one group of transformations. Every stage is a
//! pure `&str → String` function with no I/O and no shared state, so each is
//! independently testable and the renderer is safe to share across threads.
//!
//! ## Data Flow
//!
//! ```text
//! raw ──▶ pre-stages ──▶ markdown ──▶ post-stages ──▶ HTML
//!         (text fixes)   (engine)    (HTML fixes)
//! ```
//!
//! 1. [`normalize`]   — whitespace, pasted CSS, read-more marker, list
//!    containers, list separation
//! 2. [`loose_html`]  — Markdown typed inside editor HTML, nested-list indents
//! 3. [`blocks`]      — collapsed pipe tables, fenced code → `<pre><code>`
//! 4. [`markdown`]    — the [`markdown::MarkdownEngine`] call; the only
//!    fallible step
//! 5. [`postprocess`] — mermaid, task lists, YouTube, classes, lightbox
//! 6. [`emphasis`]    — emphasis markers left in raw-HTML text nodes
//!
//! [`protect`] is the shared region protector that keeps code samples out of
//! the broad substitutions above.
//!
//! The order is fixed and lives in [`PRE_STAGES`] and [`POST_STAGES`]; options
//! can only switch individual gated stages off.

pub mod blocks;
pub mod emphasis;
pub mod loose_html;
pub mod markdown;
pub mod normalize;
pub mod postprocess;
pub mod protect;

use crate::config::{RendererOptions, Switch};

/// Which side of the Markdown engine a stage runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageGroup {
    Pre,
    Post,
}

/// One named step of the fixed pipeline.
#[derive(Clone, Copy)]
pub struct Stage {
    /// Stable name, used as the stage trace key.
    pub name: &'static str,
    pub group: StageGroup,
    /// The option gating this stage; `None` means it always runs.
    pub switch: Option<Switch>,
    pub apply: fn(&str) -> String,
}

impl Stage {
    pub fn is_enabled(&self, options: &RendererOptions) -> bool {
        self.switch.is_none_or(|s| options.is_enabled(s))
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("switch", &self.switch)
            .finish_non_exhaustive()
    }
}

/// Trace key of the unmodified input.
pub const RAW_STAGE: &str = "00_raw";
/// Trace key of the Markdown engine's output.
pub const MARKDOWN_STAGE: &str = "09_markdown";

const fn pre(name: &'static str, switch: Option<Switch>, apply: fn(&str) -> String) -> Stage {
    Stage {
        name,
        group: StageGroup::Pre,
        switch,
        apply,
    }
}

const fn post(name: &'static str, switch: Option<Switch>, apply: fn(&str) -> String) -> Stage {
    Stage {
        name,
        group: StageGroup::Post,
        switch,
        apply,
    }
}

/// Text-level stages, run before the Markdown engine.
pub static PRE_STAGES: [Stage; 8] = [
    pre("01_normalize_whitespace", None, normalize::normalize_whitespace),
    pre(
        "02_strip_style_snippets",
        Some(Switch::StripInlineCss),
        normalize::strip_style_snippets,
    ),
    pre("03_more_marker", None, normalize::remove_more_marker),
    pre("04_unwrap_list_containers", None, normalize::unwrap_list_containers),
    pre("05_list_separation", None, normalize::ensure_list_separation),
    pre("06_loose_markdown_html", None, loose_html::preprocess_loose_markdown),
    pre("07_inline_pipe_tables", None, blocks::normalize_inline_pipe_tables),
    pre("08_fences", None, blocks::convert_fences),
];

/// HTML-level stages, run on the engine's output.
pub static POST_STAGES: [Stage; 7] = [
    post("10_mermaid", Some(Switch::Mermaid), postprocess::convert_mermaid_blocks),
    post("11_task_lists", Some(Switch::TaskLists), postprocess::render_task_lists),
    post("12_youtube", Some(Switch::YouTubeEmbeds), postprocess::embed_youtube),
    post("13_list_classes", Some(Switch::ListClasses), postprocess::add_list_classes),
    post(
        "14_blockquote_classes",
        Some(Switch::BlockquoteClasses),
        postprocess::add_blockquote_classes,
    ),
    post("15_inline_emphasis", None, emphasis::repair_inline_emphasis),
    post("16_lightbox", Some(Switch::Lightbox), postprocess::wrap_lightbox_images),
];
