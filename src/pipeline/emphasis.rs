//! Post-stage 5: emphasis markers that survived the Markdown engine.
//!
//! The engine does not parse Markdown inside raw HTML blocks, so `**bold**`
//! typed into a WYSIWYG table cell reaches the output as literal asterisks.
//! This pass converts `**x**`, `__x__`, `*x*` and `_x_` in text nodes only;
//! tags, attributes and protected code are never touched.
//!
//! Single markers need flanking: the first and last character inside must not
//! be whitespace, the marker must not touch another copy of itself, and `_`
//! must not sit inside a word (`snake_case_name` stays as is). This keeps the
//! pass from splitting a double marker or reading arithmetic as emphasis.
//!
//! Not idempotent in general; the renderer runs it once per pass.

use crate::pipeline::protect::{protect, restore, CODE_HTML};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_DOUBLE_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_DOUBLE_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").unwrap());

pub(crate) fn repair_inline_emphasis(input: &str) -> String {
    let (text, stash) = protect(input, "EMPH", &CODE_HTML);
    let repaired = stash.map_between(&text, |segment| map_text_nodes(segment, emphasize));
    restore(&repaired, &stash)
}

/// Apply `f` to everything outside tags.
fn map_text_nodes(html: &str, f: fn(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for tag in RE_TAG.find_iter(html) {
        out.push_str(&f(&html[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&f(&html[last..]));
    out
}

fn emphasize(text: &str) -> String {
    if !text.contains(['*', '_']) {
        return text.to_string();
    }
    let s = RE_DOUBLE_STAR.replace_all(text, "<strong>$1</strong>");
    let s = RE_DOUBLE_UNDERSCORE.replace_all(&s, "<strong>$1</strong>");
    let s = wrap_single(&s, '*', true);
    wrap_single(&s, '_', false)
}

fn wrap_single(text: &str, marker: char, intraword: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == marker {
            if let Some(close) = closing_marker(&chars, i, marker, intraword) {
                out.push_str("<em>");
                out.extend(&chars[i + 1..close]);
                out.push_str("</em>");
                i = close + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Index of the marker closing the span opened at `open`, if the pair flanks.
fn closing_marker(chars: &[char], open: usize, marker: char, intraword: bool) -> Option<usize> {
    let outside =
        |c: Option<char>| c == Some(marker) || (!intraword && c.is_some_and(char::is_alphanumeric));

    if outside(open.checked_sub(1).map(|p| chars[p])) {
        return None;
    }
    let first = *chars.get(open + 1)?;
    if first == marker || first.is_whitespace() {
        return None;
    }
    let close = open + 1 + chars[open + 1..].iter().position(|&c| c == marker)?;
    if chars[close - 1].is_whitespace() || outside(chars.get(close + 1).copied()) {
        return None;
    }
    Some(close)
}
