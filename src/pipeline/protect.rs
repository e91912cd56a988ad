//! Region protection: keep code-like regions out of broad text substitutions.
//!
//! A stage that rewrites Markdown or HTML with wide regexes would happily turn
//! `# comment` inside a Python sample into a heading, or `**kwargs` into bold.
//! Wrapping the substitution in [`with_protected`] swaps every code-like
//! region for a `[[[TAG_n]]]` placeholder first and puts the original bytes
//! back afterwards.
//!
//! ## Invariants
//!
//! - The stash captured by [`protect`] is exactly what [`restore`] writes
//!   back. Stages only ever see (and rewrite) the surrounding text.
//! - Placeholders cannot collide with author text: if the content already
//!   contains `[[[TAG_`, the namespace is salted (`TAG1`, `TAG2`, …).
//! - Restoration is one left-to-right scan, so a restored region that happens
//!   to contain placeholder-looking text is never substituted again.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// ── Code-like patterns ───────────────────────────────────────────────────────

/// Source-level code: fenced blocks, `<pre>` and `<code>` elements.
/// Used by the pre-stages, which run while fences are still raw.
///
/// A fence opens at the start of a line and takes the whole info line, the
/// same way fence conversion reads it. Triple backticks elsewhere on a line
/// are protected up to the next triple backtick.
pub static CODE_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ms)^[ \t]*```[^\n`]*\n.*?```|```.*?```|(?i:<pre\b.*?</pre>)|(?i:<code\b.*?</code>)",
    )
    .unwrap()
});

/// `<pre>` elements only. Used by fence conversion, which must see the fences.
pub static PRE_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<pre\b.*?</pre>").unwrap());

/// Rendered code: `<pre>`, `<code>`, mermaid diagram containers, and the
/// raw-text `<script>`/`<style>` elements. Used by the post-stages.
pub static CODE_HTML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<pre\b.*?</pre>|<code\b.*?</code>|<div class="mermaid">.*?</div>|<script\b.*?</script>|<style\b.*?</style>"#,
    )
    .unwrap()
});

// ── Stash ────────────────────────────────────────────────────────────────────

/// The regions pulled out by [`protect`], in match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stash {
    /// `[[[TAG_` (possibly salted); a placeholder is `prefix + n + "]]]"`.
    prefix: String,
    regions: Vec<String>,
}

impl Stash {
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// The placeholder token standing in for region `index`.
    pub fn placeholder(&self, index: usize) -> String {
        format!("{}{}]]]", self.prefix, index)
    }

    /// Apply `f` to the text between placeholders, copying placeholders through
    /// untouched. Lets a stage work on protected text without its patterns
    /// ever seeing (or splitting) a placeholder token.
    pub fn map_between<F>(&self, text: &str, mut f: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        if self.regions.is_empty() {
            return f(text);
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some((start, end)) = self.next_placeholder(rest) {
            out.push_str(&f(&rest[..start]));
            out.push_str(&rest[start..end]);
            rest = &rest[end..];
        }
        out.push_str(&f(rest));
        out
    }

    /// Byte range of the first valid placeholder in `text`.
    fn next_placeholder(&self, text: &str) -> Option<(usize, usize)> {
        let mut offset = 0;
        while let Some(pos) = text[offset..].find(&self.prefix) {
            let start = offset + pos;
            let after = start + self.prefix.len();
            match parse_index(&text[after..]) {
                Some((idx, consumed)) if idx < self.regions.len() => {
                    return Some((start, after + consumed));
                }
                _ => offset = after,
            }
        }
        None
    }

    fn total_len(&self) -> usize {
        self.regions.iter().map(String::len).sum()
    }
}

/// Parse `n]]]` at the start of `s`, returning `(n, bytes consumed)`.
fn parse_index(s: &str) -> Option<(usize, usize)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !s[digits..].starts_with("]]]") {
        return None;
    }
    let idx = s[..digits].parse().ok()?;
    Some((idx, digits + 3))
}

/// Pick a `[[[TAG_` prefix that does not already occur in `content`.
fn namespace(content: &str, tag: &str) -> String {
    let mut prefix = format!("[[[{tag}_");
    let mut salt = 0usize;
    while content.contains(&prefix) {
        salt += 1;
        prefix = format!("[[[{tag}{salt}_");
    }
    prefix
}

// ── Protect / restore ────────────────────────────────────────────────────────

/// Replace every non-overlapping match of `pattern` with a placeholder.
pub fn protect(content: &str, tag: &str, pattern: &Regex) -> (String, Stash) {
    let prefix = namespace(content, tag);
    let mut regions = Vec::new();
    let text = pattern
        .replace_all(content, |caps: &Captures<'_>| {
            regions.push(caps[0].to_string());
            format!("{}{}]]]", prefix, regions.len() - 1)
        })
        .into_owned();
    (text, Stash { prefix, regions })
}

/// Put every stashed region back in place of its placeholder.
pub fn restore(content: &str, stash: &Stash) -> String {
    if stash.regions.is_empty() {
        return content.to_string();
    }
    let mut out = String::with_capacity(content.len() + stash.total_len());
    let mut rest = content;
    while let Some((start, end)) = stash.next_placeholder(rest) {
        out.push_str(&rest[..start]);
        let idx = parse_index(&rest[start + stash.prefix.len()..])
            .map(|(idx, _)| idx)
            .unwrap_or_default();
        out.push_str(&stash.regions[idx]);
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Run `f` over `content` with every match of `pattern` protected.
pub fn with_protected<F>(content: &str, tag: &str, pattern: &Regex, f: F) -> String
where
    F: FnOnce(&str) -> String,
{
    let (text, stash) = protect(content, tag, pattern);
    if stash.is_empty() {
        return f(&text);
    }
    restore(&f(&text), &stash)
}
