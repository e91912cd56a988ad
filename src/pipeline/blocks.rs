//! Pre-stages 7–8: block structures the editor mangles.
//!
//! - Rule 7 rebuilds pipe tables that the editor collapsed onto one line.
//! - Rule 8 turns fenced code into `<pre><code>` HTML ahead of the engine, so
//!   the code body is escaped exactly once and later stages can protect it.

use crate::pipeline::protect::{with_protected, CODE_SOURCE, PRE_ONLY};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A collapsed paragraph with at least this many `|` is treated as a table.
pub const PIPE_TABLE_MIN_PIPES: usize = 8;
/// ...as is one containing a run of this many `-` (a separator row).
pub const PIPE_TABLE_MIN_DASH_RUN: usize = 3;

// ── Rule 7: Collapsed pipe tables ────────────────────────────────────────────
//
// "| A | B | | 1 | 2 |" is a two-row table whose line breaks were lost. Row
// boundaries show up as "| |"; splitting there and adding the separator row
// GFM requires gives the engine a table again.

static RE_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").unwrap());

pub(crate) fn normalize_inline_pipe_tables(input: &str) -> String {
    with_protected(input, "PIPE", &CODE_SOURCE, |s| {
        let s = RE_PARAGRAPH.replace_all(s, |caps: &Captures<'_>| {
            match expand_collapsed_table(&caps[1]) {
                Some(table) => format!("\n\n{table}\n\n"),
                None => caps[0].to_string(),
            }
        });
        split_collapsed_lines(&s)
    })
}

fn is_collapsed_table(text: &str) -> bool {
    text.matches('|').count() >= PIPE_TABLE_MIN_PIPES
        || longest_dash_run(text) >= PIPE_TABLE_MIN_DASH_RUN
}

fn longest_dash_run(text: &str) -> usize {
    text.split(|c: char| c != '-').map(str::len).max().unwrap_or(0)
}

/// Split `text` into table rows at `| |` boundaries, or `None` if it does not
/// look like a collapsed table.
fn expand_collapsed_table(text: &str) -> Option<String> {
    let text = text.trim();
    if !text.contains("| |") || !is_collapsed_table(text) {
        return None;
    }
    let split = text.replace("| |", "|\n|");
    let rows: Vec<&str> = split.split('\n').map(str::trim).collect();
    if rows.len() < 2 || !rows.iter().all(|r| is_table_row(r)) {
        return None;
    }
    Some(with_separator(&rows))
}

/// Bare one-line tables outside any paragraph, not already part of a table.
fn split_collapsed_lines(s: &str) -> String {
    let lines: Vec<&str> = s.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let prev_row = i > 0 && is_table_row(lines[i - 1]);
        let next_row = lines.get(i + 1).is_some_and(|l| is_table_row(l));
        let candidate =
            !prev_row && !next_row && is_table_row(line) && line.matches("| |").count() >= 2;

        match candidate.then(|| expand_collapsed_table(line)).flatten() {
            Some(table) => out.push(format!("\n{table}\n")),
            None => out.push(line.to_string()),
        }
    }
    out.join("\n")
}

fn with_separator(rows: &[&str]) -> String {
    let mut result: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    if !is_separator_row(rows[1]) {
        let col_count = rows[0].matches('|').count().saturating_sub(1).max(1);
        let sep: String = std::iter::once("|")
            .chain(std::iter::repeat_n(" --- |", col_count))
            .collect();
        result.insert(1, sep);
    }
    result.join("\n")
}

fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.len() > 2
}

fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c == ' ')
}

// ── Rule 8: Fenced code → <pre><code> ────────────────────────────────────────

// Opening fence: start of line, then the whole info line. Its first word
// names the language (`python`, ` python`, `rust,ignore`, `js title="x"`).
static RE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^([ \t]*)```[ \t]*([^\s`]*)[^\n`]*\n(.*?)\n?[ \t]*```").unwrap()
});

static RE_STYLE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*pre\s+code\s*\{[^}]*\}\s*$").unwrap());

pub(crate) fn convert_fences(input: &str) -> String {
    with_protected(input, "FENCE", &PRE_ONLY, |s| {
        RE_FENCE
            .replace_all(s, |caps: &Captures<'_>| {
                let indent = &caps[1];
                let code = escape_code(strip_style_header(&caps[3]));
                match fence_language(&caps[2]) {
                    "" => format!("{indent}<pre><code>{code}</code></pre>"),
                    lang => format!(
                        "{indent}<pre><code class=\"language-{lang}\">{code}</code></pre>"
                    ),
                }
            })
            .into_owned()
    })
}

/// The class-safe language name at the head of a fence info word:
/// `rust,ignore` → `rust`, `{.python}` → `python`.
fn fence_language(info: &str) -> &str {
    let info = info.trim_start_matches(['{', '.']);
    let end = info
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '#')))
        .unwrap_or(info.len());
    &info[..end]
}

/// Drop a pasted `pre code { … }` rule sitting on the first line of a block.
fn strip_style_header(code: &str) -> &str {
    let (first, rest) = code.split_once('\n').unwrap_or((code, ""));
    if RE_STYLE_HEADER.is_match(first) {
        rest
    } else {
        code
    }
}

pub(crate) fn escape_code(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
