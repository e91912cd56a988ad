//! Previews: the short forms of a post shown on listing pages.
//!
//! Two shapes exist:
//!
//! - [`excerpt`] is plain text, at most [`PREVIEW_MAX_WORDS`] words, for cards
//!   and meta descriptions.
//! - [`preview_source`] is a cut of the *raw* markup, so the preview keeps its
//!   headings, bullets and numbering once rendered. The author decides where
//!   it ends with the read-more marker; without one the cut falls on whole
//!   lines within [`PREVIEW_MAX_CHARS`] characters of rendered text.

use crate::error::RenderError;
use crate::pipeline::normalize::find_more_marker;
use crate::renderer::Renderer;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Word cap of [`excerpt`].
pub const PREVIEW_MAX_WORDS: usize = 40;
/// Rendered-text character budget of [`preview_source`] without a marker.
pub const PREVIEW_MAX_CHARS: usize = 150;

static RE_FENCED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());

/// Drop everything between `<` and `>`.
///
/// Not an HTML parser: a bare `<` in text starts a "tag" that runs to the next
/// `>`. Good enough for counting and summarising rendered output.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn before_marker(content: &str) -> Option<&str> {
    find_more_marker(content).map(|(start, _)| &content[..start])
}

/// Plain-text summary of `content`.
///
/// Text before the read-more marker when there is one, with fenced code,
/// backticks and tags removed and whitespace collapsed, capped at
/// [`PREVIEW_MAX_WORDS`] words.
pub fn excerpt(content: &str) -> String {
    let content = before_marker(content).unwrap_or(content);
    let s = RE_FENCED.replace_all(content, " ");
    let s = s.replace("```", " ").replace('`', "");
    strip_html(&s)
        .split_whitespace()
        .take(PREVIEW_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn plain_len(renderer: &Renderer, markup: &str) -> Result<usize, RenderError> {
    let html = renderer.render(markup)?;
    Ok(strip_html(&html).trim().chars().count())
}

/// The part of `content` to render as its preview.
///
/// # Errors
/// [`RenderError::EngineFailed`] if rendering a candidate cut fails.
pub fn preview_source(renderer: &Renderer, content: &str) -> Result<String, RenderError> {
    if let Some(head) = before_marker(content) {
        return Ok(head.trim().to_string());
    }
    if plain_len(renderer, content)? <= PREVIEW_MAX_CHARS {
        return Ok(content.trim().to_string());
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut used = 0;
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let len = plain_len(renderer, line)?;
        if used + len > PREVIEW_MAX_CHARS {
            break;
        }
        kept.push(line);
        used += len;
    }
    debug!(lines = kept.len(), chars = used, "Preview cut without read-more marker");
    Ok(kept.join("\n\n"))
}
