//! Pre-stage 6: Markdown typed inside WYSIWYG HTML.
//!
//! Authors type `## Heading`, `> quote`, `- item` or `**bold**` into an
//! editor that wraps every line in `<p>` or `<div>`. The Markdown engine
//! treats those containers as raw HTML blocks and never parses what is inside
//! them, so this stage rewrites the common cases into either HTML tags or
//! bare Markdown lines:
//!
//! 1. blank line after closing block containers, so parsing resumes
//! 2. top-level `#`–`###` headings → `<h1>`–`<h3>`
//! 3. runs of `>` lines → one `<blockquote><p>…</p></blockquote>`
//! 4. `<p>## Heading</p>` → `<h2>Heading</h2>`
//! 5. `<p>- item</p>` / `<div>1. item</div>` → bare marker lines
//! 6. nested list indentation rescaled to the engine's unit
//! 7. `<p>` holding only emphasis-bearing text → unwrapped
//! 8. `---` lines and `<p>---</p>` → `<hr/>`
//! 9. `>## Heading<` inside any container → `><h2>Heading</h2><`
//!
//! The whole stage runs with code regions protected.

use crate::pipeline::normalize::is_list_item;
use crate::pipeline::protect::{with_protected, CODE_SOURCE};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A tab counts as this many indent columns.
pub const TAB_INDENT_UNITS: usize = 2;
/// Indent width of one nesting level as the Markdown engine expects it.
pub const TARGET_INDENT_UNIT: usize = 4;

pub(crate) fn preprocess_loose_markdown(input: &str) -> String {
    with_protected(input, "LOOSE", &CODE_SOURCE, |s| {
        let s = close_block_containers(s);
        let s = top_level_headings(&s);
        let s = merge_blockquotes(&s);
        let s = paragraph_headings(&s);
        let s = unwrap_marker_containers(&s);
        let s = normalize_list_indentation(&s);
        let s = unwrap_emphasis_paragraphs(&s);
        let s = horizontal_rules(&s);
        inline_container_headings(&s)
    })
}

// ── Step 1: Blank line after block containers ────────────────────────────────

static RE_CLOSE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(div|figure|section|table|blockquote|p)>\s*").unwrap());

fn close_block_containers(s: &str) -> String {
    RE_CLOSE_BLOCK.replace_all(s, "</$1>\n\n").into_owned()
}

// ── Step 2: Top-level headings ───────────────────────────────────────────────

static RE_TOP_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(#{1,3})[ \t]+(.+?)[ \t]*$").unwrap());

fn heading_tag(level: usize, text: &str) -> String {
    format!("<h{level}>{}</h{level}>", strip_closing_hashes(text))
}

/// Drop an ATX closing sequence (`## Title ##`), but not the `#` of `C#`.
fn strip_closing_hashes(text: &str) -> &str {
    let stripped = text.trim_end_matches('#');
    if stripped.len() < text.len() && stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        text
    }
}

fn top_level_headings(s: &str) -> String {
    RE_TOP_HEADING
        .replace_all(s, |caps: &Captures<'_>| heading_tag(caps[1].len(), &caps[2]))
        .into_owned()
}

// ── Step 3: Blockquote lines ─────────────────────────────────────────────────

fn quote_text(line: &str) -> Option<&str> {
    let t = line.trim();
    t.strip_prefix("&gt;")
        .or_else(|| t.strip_prefix('>'))
        .map(str::trim)
}

fn merge_blockquotes(s: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut quote: Vec<&str> = Vec::new();

    fn flush(out: &mut Vec<String>, quote: &mut Vec<&str>) {
        if !quote.is_empty() {
            out.push(format!("<blockquote><p>{}</p></blockquote>", quote.join(" ")));
            quote.clear();
        }
    }

    for line in s.split('\n') {
        match quote_text(line) {
            Some(text) => quote.push(text),
            None => {
                flush(&mut out, &mut quote);
                out.push(line.to_string());
            }
        }
    }
    flush(&mut out, &mut quote);
    out.join("\n")
}

// ── Step 4: Paragraph-wrapped headings ───────────────────────────────────────

static RE_P_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<p(?:\s[^>]*)?>\s*(#{1,3})\s+(.+?)\s*</p>").unwrap()
});

fn paragraph_headings(s: &str) -> String {
    RE_P_HEADING
        .replace_all(s, |caps: &Captures<'_>| heading_tag(caps[1].len(), &caps[2]))
        .into_owned()
}

// ── Step 5: Paragraph/div wrapped list markers ───────────────────────────────

static RE_MARKER_CONTAINER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:p|div)(?:\s[^>]*)?>\s*([-*+]|\d+\.)\s+([^<]+?)\s*</(?:p|div)>").unwrap()
});

fn unwrap_marker_containers(s: &str) -> String {
    RE_MARKER_CONTAINER.replace_all(s, "\n$1 $2\n").into_owned()
}

// ── Step 6: Nested list indentation ──────────────────────────────────────────
//
// Authors nest with 2 or 3 spaces or a tab per level; the engine wants 4.
// Within each list block, when the shallowest nested item sits below the
// engine's unit, every item is re-indented by level. A level is one distinct
// indent column on the way down from the block's first item, so 2-column and
// 3-column nesting map the same way. Blocks already using 4+ columns are left
// alone.

fn indent_columns(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_INDENT_UNITS } else { 1 })
        .sum()
}

fn normalize_list_indentation(s: &str) -> String {
    let lines: Vec<&str> = s.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if !is_list_item(lines[i]) {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }
        let end = list_block_end(&lines, i);
        let block = &lines[i..end];
        let min_nested = block
            .iter()
            .filter(|l| is_list_item(l))
            .map(|l| indent_columns(l))
            .filter(|&n| n > 0)
            .min();

        match min_nested {
            Some(n) if n < TARGET_INDENT_UNIT => {
                out.extend(reindent_block(block));
            }
            _ => out.extend(block.iter().map(|l| l.to_string())),
        }
        i = end;
    }
    out.join("\n")
}

/// One past the last line of the list block starting at `start`: items,
/// indented continuations, and blank lines followed by more of either.
fn list_block_end(lines: &[&str], start: usize) -> usize {
    let mut end = start + 1;
    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j];
        if line.trim().is_empty() {
            j += 1;
            continue;
        }
        if is_list_item(line) || line.starts_with([' ', '\t']) {
            j += 1;
            end = j;
        } else {
            break;
        }
    }
    end
}

fn reindent_block(block: &[&str]) -> Vec<String> {
    // Indent columns of the open ancestors; its length - 1 is the depth.
    let mut open: Vec<usize> = vec![0];
    block
        .iter()
        .map(|line| {
            if !is_list_item(line) {
                return line.to_string();
            }
            let cols = indent_columns(line);
            while open.last().is_some_and(|&top| top > cols) {
                open.pop();
            }
            if open.last().is_none_or(|&top| top < cols) {
                open.push(cols);
            }
            match open.len() - 1 {
                0 => line.to_string(),
                depth => format!(
                    "{}{}",
                    " ".repeat(depth * TARGET_INDENT_UNIT),
                    line.trim_start()
                ),
            }
        })
        .collect()
}

// ── Step 7: Emphasis-bearing paragraphs ──────────────────────────────────────

static RE_EMPHASIS_PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<p(?:\s[^>]*)?>\s*([^<>]*?(?:\*\*[^<>]+?\*\*|__[^<>]+?__|\*[^*<>]+\*|_[^_<>]+_)[^<>]*?)\s*</p>",
    )
    .unwrap()
});

fn unwrap_emphasis_paragraphs(s: &str) -> String {
    RE_EMPHASIS_PARAGRAPH.replace_all(s, "\n\n$1\n\n").into_owned()
}

// ── Step 8: Horizontal rules ─────────────────────────────────────────────────

static RE_TOP_HR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*---[ \t]*$").unwrap());
static RE_P_HR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p>\s*---\s*</p>").unwrap());

fn horizontal_rules(s: &str) -> String {
    let s = RE_TOP_HR.replace_all(s, "<hr/>");
    RE_P_HR.replace_all(&s, "<hr/>").into_owned()
}

// ── Step 9: Headings inside containers ───────────────────────────────────────

static RE_INLINE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">\s*(#{1,3})[ \t]+([^<]+?)\s*<").unwrap());

fn inline_container_headings(s: &str) -> String {
    RE_INLINE_HEADING
        .replace_all(s, |caps: &Captures<'_>| {
            format!(">{}<", heading_tag(caps[1].len(), &caps[2]))
        })
        .into_owned()
}
