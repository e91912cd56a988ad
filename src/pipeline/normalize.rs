//! Pre-stages 1–5: make editor output look like Markdown again.
//!
//! WYSIWYG editors and copy/paste leave artefacts the Markdown engine cannot
//! parse: non-breaking spaces, `<br>` line breaks, stray CSS rules, list
//! items wrapped one-per-`<div>`, and lists glued to the preceding paragraph.
//! Each rule here is a pure `&str → String` function run in this order:
//!
//! 1. Normalise whitespace, line endings and `<br>` tags (always)
//! 2. Strip single-line CSS rules outside code (gated)
//! 3. Remove the read-more marker
//! 4. Unwrap list-like `<div>`/`<p>` containers into marker lines
//! 5. Put a blank line before a list that follows text
//!
//! Rules 2, 4 and 5 rewrite broad patterns and run with code regions
//! protected.

use crate::pipeline::protect::{with_protected, CODE_SOURCE};
use once_cell::sync::Lazy;
use regex::Regex;

// ── Rule 1: Whitespace, line endings and editor line breaks ──────────────────

static RE_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

pub(crate) fn normalize_whitespace(input: &str) -> String {
    let s = input.replace("\r\n", "\n").replace('\r', "\n");
    // Code samples keep their entities and `<br>` tags verbatim.
    with_protected(&s, "WS", &CODE_SOURCE, |s| {
        let s = s.replace(
            ['\u{00A0}', '\u{2002}', '\u{2003}', '\u{2007}', '\u{202F}'],
            " ",
        );
        let s = s.replace("&nbsp;", " ").replace("&#160;", " ");
        RE_BR.replace_all(&s, "\n").into_owned()
    })
}

// ── Rule 2: Strip pasted single-line CSS rules ───────────────────────────────

static RE_PRE_CODE_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*pre\s+code[ \t]*\{[^}\n]*\}[ \t]*$").unwrap());

static RE_CLASS_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\.[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*[ \t]*\{[^}\n]*\}[ \t]*$").unwrap()
});

pub(crate) fn strip_style_snippets(input: &str) -> String {
    with_protected(input, "STYLE", &CODE_SOURCE, |s| {
        let s = RE_PRE_CODE_RULE.replace_all(s, "");
        RE_CLASS_RULE.replace_all(&s, "").into_owned()
    })
}

// ── Rule 3: Read-more marker ─────────────────────────────────────────────────

/// The read-more marker, literal and as the editor escapes it.
pub const MORE_MARKERS: [&str; 2] = ["<more-->", "&lt;more--&gt;"];

/// Byte range of the earliest read-more marker, if any.
pub fn find_more_marker(content: &str) -> Option<(usize, usize)> {
    MORE_MARKERS
        .iter()
        .filter_map(|mk| content.find(mk).map(|idx| (idx, idx + mk.len())))
        .min_by_key(|&(start, _)| start)
}

pub(crate) fn remove_more_marker(input: &str) -> String {
    match find_more_marker(input) {
        Some((start, end)) => format!("{}{}", &input[..start], &input[end..]),
        None => input.to_string(),
    }
}

// ── Rule 4: Unwrap list-like containers ──────────────────────────────────────
//
// Editors turn a typed list into one container per line:
//
//   <div style="…">- Item</div>
//   <div style="…">- Item 2</div>
//
// becomes "\n- Item\n- Item 2\n\n". Items separated only by whitespace are
// merged into one run so the engine builds a single tight list, and every run
// ends with a blank line.

static RE_LIST_CONTAINER_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(div|p)\b[^>]*>\s*(?:([-+*])|(\d+)\.)([ \t]*)").unwrap()
});

pub(crate) fn unwrap_list_containers(input: &str) -> String {
    with_protected(input, "LIST", &CODE_SOURCE, unwrap_list_containers_raw)
}

fn unwrap_list_containers_raw(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut run: Vec<String> = Vec::new();
    let mut copied = 0;
    let mut search = 0;

    while let Some(caps) = RE_LIST_CONTAINER_OPEN.captures_at(s, search) {
        let Some(open) = caps.get(0) else { break };
        let close = format!("</{}>", caps[1].to_ascii_lowercase());
        let Some(rel) = lower[open.end()..].find(&close) else {
            search = open.end();
            continue;
        };
        let body = s[open.end()..open.end() + rel].trim();
        let spaced = !caps[4].is_empty();

        let (marker, is_bullet) = match caps.get(2) {
            Some(bullet) => (bullet.as_str().to_string(), true),
            None => (format!("{}.", &caps[3]), false),
        };
        let rejected = body.is_empty()
            || (!spaced
                && (!is_bullet || marker == "*" || body.starts_with(['-', '*', '+'])));
        if rejected {
            // `<p>**bold**</p>`, `<div>3.14</div>`, `<p>---</p>` are not lists.
            search = open.start() + 1;
            continue;
        }

        let gap = &s[copied..open.start()];
        if run.is_empty() {
            out.push_str(gap);
        } else if !gap.trim().is_empty() {
            flush_run(&mut out, &mut run);
            out.push_str(gap);
        }
        run.push(format!("{marker} {body}"));
        copied = open.end() + rel + close.len();
        search = copied;
    }

    flush_run(&mut out, &mut run);
    out.push_str(&s[copied..]);
    out
}

fn flush_run(out: &mut String, run: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(&run.join("\n"));
    out.push_str("\n\n");
    run.clear();
}

// ── Rule 5: Blank line before a list that follows text ──────────────────────

static RE_LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:[-*+]|\d+\.)[ \t]+\S").unwrap());

pub(crate) fn is_list_item(line: &str) -> bool {
    RE_LIST_ITEM.is_match(line)
}

pub(crate) fn ensure_list_separation(input: &str) -> String {
    with_protected(input, "SEP", &CODE_SOURCE, |s| {
        let mut out: Vec<&str> = Vec::new();
        // True while inside a list: its items and their indented continuations.
        let mut in_list = false;
        let mut prev_blank = true;

        for line in s.split('\n') {
            let blank = line.trim().is_empty();
            if is_list_item(line) {
                if !prev_blank && !in_list {
                    out.push("");
                }
                in_list = true;
            } else if blank || !line.starts_with([' ', '\t']) {
                in_list = false;
            }
            out.push(line);
            prev_blank = blank;
        }
        out.join("\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        let input = "a\u{00A0}b\u{2003}c&nbsp;d&#160;e\r\nf<br>g<BR/>h<br />i\rj";
        assert_eq!(normalize_whitespace(input), "a b c d e\nf\ng\nh\ni\nj");
    }

    #[test]
    fn test_normalize_whitespace_keeps_code_verbatim() {
        let pre = "<pre>a&nbsp;b<br>c\u{00A0}d</pre>";
        let fence = "```html\n<p>a&nbsp;b<br/>c</p>\n```";
        let input = format!("x&nbsp;y\r\n{pre}\n{fence}<br>z");
        assert_eq!(normalize_whitespace(&input), format!("x y\n{pre}\n{fence}\nz"));
    }

    #[test]
    fn test_strip_style_snippets() {
        let input = "Intro\npre code { color: red; }\n.hljs.dark { background: #000 }\nOutro";
        assert_eq!(strip_style_snippets(input), "Intro\n\n\nOutro");
    }

    #[test]
    fn test_strip_style_snippets_leaves_code_alone() {
        let input = "```css\n.btn { color: red }\n```\n<pre>pre code { x: y }</pre>";
        assert_eq!(strip_style_snippets(input), input);
    }

    #[test]
    fn test_strip_style_keeps_multi_line_rules_and_prose() {
        let input = ".btn {\n  color: red;\n}\nUse .btn { here } inline.";
        assert_eq!(strip_style_snippets(input), input);
    }

    #[test]
    fn test_remove_more_marker_first_only() {
        assert_eq!(remove_more_marker("a<more-->b<more-->c"), "ab<more-->c");
        assert_eq!(remove_more_marker("a&lt;more--&gt;b"), "ab");
        assert_eq!(remove_more_marker("no marker"), "no marker");
    }

    #[test]
    fn test_find_more_marker_prefers_earliest() {
        let s = "x&lt;more--&gt;y<more-->";
        assert_eq!(find_more_marker(s), Some((1, 15)));
    }

    #[test]
    fn test_unwrap_merges_consecutive_items() {
        let input = "<div>- Item A</div><div>- Item B</div>";
        assert_eq!(unwrap_list_containers(input), "\n- Item A\n- Item B\n\n");
    }

    #[test]
    fn test_unwrap_ordered_and_missing_space() {
        let input = "Intro\n<p style=\"x\">1. One</p>\n<p>2. Two</p>\n<div>-Dash</div>";
        assert_eq!(
            unwrap_list_containers(input),
            "Intro\n\n1. One\n2. Two\n- Dash\n\n"
        );
    }

    #[test]
    fn test_unwrap_splits_runs_on_text() {
        let input = "<div>- a</div>middle<div>- b</div>";
        assert_eq!(unwrap_list_containers(input), "\n- a\n\nmiddle\n- b\n\n");
    }

    #[test]
    fn test_unwrap_rejects_non_lists() {
        for input in [
            "<p>**bold** text</p>",
            "<div>3.14 is pi</div>",
            "<p>---</p>",
            "<div>-</div>",
            "<div>- unclosed",
        ] {
            assert_eq!(unwrap_list_containers(input), input, "{input}");
        }
    }

    #[test]
    fn test_unwrap_skips_code() {
        let input = "<pre><div>- not a list</div></pre>";
        assert_eq!(unwrap_list_containers(input), input);
    }

    #[test]
    fn test_list_separation_after_text() {
        assert_eq!(ensure_list_separation("Text\n- a\n- b"), "Text\n\n- a\n- b");
        assert_eq!(ensure_list_separation("Text\n1. a"), "Text\n\n1. a");
    }

    #[test]
    fn test_list_separation_keeps_lists_tight() {
        let input = "- a\n  - nested\n  continued\n- b\n\n- c";
        assert_eq!(ensure_list_separation(input), input);
    }

    #[test]
    fn test_list_separation_ignores_emphasis_and_rules() {
        let input = "Text\n**bold**\n---\n-1 degrees";
        assert_eq!(ensure_list_separation(input), input);
    }

    #[test]
    fn test_list_separation_skips_fenced_code() {
        let input = "```\nx\n- y\n```";
        assert_eq!(ensure_list_separation(input), input);
    }
}
