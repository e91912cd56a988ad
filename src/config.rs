//! Renderer configuration.
//!
//! The stage order is fixed; the only runtime knobs are the seven switches in
//! [`RendererOptions`], each gating exactly one optional stage. Stages without
//! a switch (normalisation, fence conversion, the Markdown engine, emphasis
//! repair) always run.
//!
//! Options are plain `Copy` data, fixed when a [`crate::Renderer`] is built
//! and shared read-only across concurrent renders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named boolean switches, one per optional pipeline stage.
///
/// # Example
/// ```rust
/// use richmark::{RendererOptions, Switch};
///
/// let opts = RendererOptions::builder()
///     .lightbox(false)
///     .disable(Switch::YouTubeEmbeds)
///     .build();
/// assert!(!opts.is_enabled(Switch::Lightbox));
/// assert!(opts.is_enabled(Switch::ListClasses));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Add utility classes to `<ul>`, `<ol>` and `<li>`. Default: true.
    pub list_classes: bool,
    /// Add utility classes to `<blockquote>`. Default: true.
    pub blockquote_classes: bool,
    /// Wrap gallery and standalone images in lightbox anchors. Default: true.
    pub lightbox: bool,
    /// Turn paragraphs holding a lone YouTube link into iframes. Default: true.
    pub youtube_embeds: bool,
    /// Turn `[ ]` / `[x]` list items into disabled checkboxes. Default: true.
    pub task_lists: bool,
    /// Convert `language-mermaid` code blocks into `<div class="mermaid">`. Default: true.
    pub mermaid: bool,
    /// Drop single-line CSS rules pasted outside code. Default: true.
    pub strip_inline_css: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            list_classes: true,
            blockquote_classes: true,
            lightbox: true,
            youtube_embeds: true,
            task_lists: true,
            mermaid: true,
            strip_inline_css: true,
        }
    }
}

impl RendererOptions {
    /// Create a new builder starting from the all-enabled preset.
    pub fn builder() -> RendererOptionsBuilder {
        RendererOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Every optional stage switched off.
    pub fn none() -> Self {
        Self {
            list_classes: false,
            blockquote_classes: false,
            lightbox: false,
            youtube_embeds: false,
            task_lists: false,
            mermaid: false,
            strip_inline_css: false,
        }
    }

    pub fn is_enabled(&self, switch: Switch) -> bool {
        match switch {
            Switch::ListClasses => self.list_classes,
            Switch::BlockquoteClasses => self.blockquote_classes,
            Switch::Lightbox => self.lightbox,
            Switch::YouTubeEmbeds => self.youtube_embeds,
            Switch::TaskLists => self.task_lists,
            Switch::Mermaid => self.mermaid,
            Switch::StripInlineCss => self.strip_inline_css,
        }
    }

    fn set(&mut self, switch: Switch, on: bool) {
        let field = match switch {
            Switch::ListClasses => &mut self.list_classes,
            Switch::BlockquoteClasses => &mut self.blockquote_classes,
            Switch::Lightbox => &mut self.lightbox,
            Switch::YouTubeEmbeds => &mut self.youtube_embeds,
            Switch::TaskLists => &mut self.task_lists,
            Switch::Mermaid => &mut self.mermaid,
            Switch::StripInlineCss => &mut self.strip_inline_css,
        };
        *field = on;
    }
}

/// Builder for [`RendererOptions`].
#[derive(Debug)]
pub struct RendererOptionsBuilder {
    options: RendererOptions,
}

impl RendererOptionsBuilder {
    pub fn list_classes(mut self, v: bool) -> Self {
        self.options.list_classes = v;
        self
    }

    pub fn blockquote_classes(mut self, v: bool) -> Self {
        self.options.blockquote_classes = v;
        self
    }

    pub fn lightbox(mut self, v: bool) -> Self {
        self.options.lightbox = v;
        self
    }

    pub fn youtube_embeds(mut self, v: bool) -> Self {
        self.options.youtube_embeds = v;
        self
    }

    pub fn task_lists(mut self, v: bool) -> Self {
        self.options.task_lists = v;
        self
    }

    pub fn mermaid(mut self, v: bool) -> Self {
        self.options.mermaid = v;
        self
    }

    pub fn strip_inline_css(mut self, v: bool) -> Self {
        self.options.strip_inline_css = v;
        self
    }

    pub fn enable(mut self, switch: Switch) -> Self {
        self.options.set(switch, true);
        self
    }

    pub fn disable(mut self, switch: Switch) -> Self {
        self.options.set(switch, false);
        self
    }

    pub fn build(self) -> RendererOptions {
        self.options
    }
}

// ── Switch ───────────────────────────────────────────────────────────────

/// Identifies one optional stage. Used by the stage table to look up its gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Switch {
    ListClasses,
    BlockquoteClasses,
    Lightbox,
    #[serde(rename = "youtube-embeds")]
    YouTubeEmbeds,
    TaskLists,
    Mermaid,
    StripInlineCss,
}

impl Switch {
    pub const ALL: [Switch; 7] = [
        Switch::ListClasses,
        Switch::BlockquoteClasses,
        Switch::Lightbox,
        Switch::YouTubeEmbeds,
        Switch::TaskLists,
        Switch::Mermaid,
        Switch::StripInlineCss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Switch::ListClasses => "list-classes",
            Switch::BlockquoteClasses => "blockquote-classes",
            Switch::Lightbox => "lightbox",
            Switch::YouTubeEmbeds => "youtube-embeds",
            Switch::TaskLists => "task-lists",
            Switch::Mermaid => "mermaid",
            Switch::StripInlineCss => "strip-inline-css",
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
