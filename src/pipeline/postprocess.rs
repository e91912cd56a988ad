//! Post-processing: presentation rules applied to the engine's HTML.
//!
//! The Markdown engine produces plain semantic HTML. The site expects more:
//! utility classes on lists and quotes, checkboxes for task items, embedded
//! videos, client-side diagrams and lightbox galleries. Each of those is one
//! optional rule here, gated by its [`crate::Switch`].
//!
//! ## Rule Order
//!
//! Mermaid conversion runs first because it is the only rule that rewrites
//! code blocks; every later rule protects `<pre>`, `<code>` and the resulting
//! `<div class="mermaid">`. Task lists run before list classes so a task item
//! keeps its `task-item` class instead of the generic one.
//!
//! Every rule here is idempotent: running it on its own output changes
//! nothing.

use crate::pipeline::protect::{with_protected, CODE_HTML};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const UL_CLASSES: &str = "list-disc pl-2";
pub const OL_CLASSES: &str = "list-decimal pl-2";
pub const LI_CLASSES: &str = "mb-2";
pub const BLOCKQUOTE_CLASSES: &str =
    "p-4 my-4 border-s-4 border-gray-300 bg-gray-50 dark:border-gray-500 dark:bg-gray-800";
pub const TASK_ITEM_CLASS: &str = "task-item";
pub const LIGHTBOX_GROUP: &str = "article-images";

fn has_class(attrs: &str) -> bool {
    attrs.to_ascii_lowercase().contains("class=")
}

// ── Rule 1: Mermaid blocks ───────────────────────────────────────────────────

static RE_MERMAID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<pre><code class="language-mermaid">(.*?)</code></pre>"#).unwrap()
});

pub(crate) fn convert_mermaid_blocks(html: &str) -> String {
    RE_MERMAID
        .replace_all(html, r#"<div class="mermaid">$1</div>"#)
        .into_owned()
}

// ── Rule 2: Task lists ───────────────────────────────────────────────────────
//
// Only the `[ ]` / `[x]` prefix is rewritten, so items of loose lists
// (`<li><p>[x] …`) and items holding nested lists work too.

static RE_TASK_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li\b([^>]*)>(\s*(?:<p>)?)\[([ xX])\]\s*").unwrap());

fn checkbox(checked: bool) -> String {
    let checked = if checked { " checked" } else { "" };
    format!(r#"<input type="checkbox" disabled{checked} class="mr-2 align-middle">"#)
}

pub(crate) fn render_task_lists(html: &str) -> String {
    with_protected(html, "TASK", &CODE_HTML, |s| {
        RE_TASK_ITEM
            .replace_all(s, |caps: &Captures<'_>| {
                let attrs = &caps[1];
                let lead = &caps[2];
                let input = checkbox(caps[3].eq_ignore_ascii_case("x"));
                if has_class(attrs) {
                    format!("<li{attrs}>{lead}{input}")
                } else {
                    format!(r#"<li class="{TASK_ITEM_CLASS}"{attrs}>{lead}{input}"#)
                }
            })
            .into_owned()
    })
}

// ── Rule 3: YouTube embeds ───────────────────────────────────────────────────

static RE_YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:[^#]*?[&;])?v=|shorts/|embed/)|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .unwrap()
});

static RE_LINK_PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<p>\s*<a\s[^>]*?href="([^"]+)"[^>]*>[^<]*</a>\s*</p>"#).unwrap()
});

static RE_URL_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<p>\s*(https?://[^\s<"]+)\s*</p>"#).unwrap());

/// The video id of a recognised YouTube URL.
pub fn youtube_id(url: &str) -> Option<&str> {
    RE_YOUTUBE_ID
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn youtube_iframe(id: &str) -> String {
    format!(
        r#"<div class="aspect-video w-full max-w-3xl"><iframe src="https://www.youtube.com/embed/{id}" title="YouTube video" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share" allowfullscreen style="width:100%;height:100%"></iframe></div>"#
    )
}

pub(crate) fn embed_youtube(html: &str) -> String {
    let embed = |caps: &Captures<'_>| match youtube_id(&caps[1]) {
        Some(id) => youtube_iframe(id),
        None => caps[0].to_string(),
    };
    with_protected(html, "YT", &CODE_HTML, |s| {
        let s = RE_LINK_PARAGRAPH.replace_all(s, embed);
        RE_URL_PARAGRAPH.replace_all(&s, embed).into_owned()
    })
}

// ── Rule 4: List and blockquote classes ──────────────────────────────────────

static RE_LIST_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(ul|ol|li)\b([^>]*)>").unwrap());
static RE_BLOCKQUOTE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<blockquote\b([^>]*)>").unwrap());

pub(crate) fn add_list_classes(html: &str) -> String {
    with_protected(html, "LISTCLS", &CODE_HTML, |s| {
        RE_LIST_TAG
            .replace_all(s, |caps: &Captures<'_>| {
                let (tag, attrs) = (&caps[1], &caps[2]);
                if has_class(attrs) {
                    return caps[0].to_string();
                }
                let classes = match tag.to_ascii_lowercase().as_str() {
                    "ul" => UL_CLASSES,
                    "ol" => OL_CLASSES,
                    _ => LI_CLASSES,
                };
                format!(r#"<{tag} class="{classes}"{attrs}>"#)
            })
            .into_owned()
    })
}

pub(crate) fn add_blockquote_classes(html: &str) -> String {
    with_protected(html, "BQCLS", &CODE_HTML, |s| {
        RE_BLOCKQUOTE_TAG
            .replace_all(s, |caps: &Captures<'_>| {
                let attrs = &caps[1];
                if has_class(attrs) {
                    caps[0].to_string()
                } else {
                    format!(r#"<blockquote class="{BLOCKQUOTE_CLASSES}"{attrs}>"#)
                }
            })
            .into_owned()
    })
}

// ── Rule 6: Lightbox ─────────────────────────────────────────────────────────
//
// Images inside an `image-gallery` container, and images standing alone in a
// paragraph, are wrapped in an anchor the lightbox script picks up. The `<img>`
// tag is kept byte for byte. A gallery that already holds a lightbox anchor is
// left alone, and a wrapped paragraph no longer matches, so re-running is safe.

static RE_GALLERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)(<div[^>]*class="[^"]*image-gallery[^"]*"[^>]*>)(.*?)(</div>)"#).unwrap()
});
static RE_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());
static RE_IMG_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p>\s*(<img\b[^>]*>)\s*</p>").unwrap());
static RE_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\ssrc="([^"]*)""#).unwrap());
static RE_ALT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\salt="([^"]*)""#).unwrap());

fn attr<'a>(re: &Regex, tag: &'a str) -> Option<&'a str> {
    re.captures(tag).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// `<a …lightbox…><img …></a>`, or the tag unchanged when it has no `src`.
fn lightbox_anchor(img: &str) -> String {
    let Some(src) = attr(&RE_SRC, img) else {
        return img.to_string();
    };
    let alt = attr(&RE_ALT, img).unwrap_or_default();
    format!(
        r#"<a href="{src}" data-lightbox="{LIGHTBOX_GROUP}" rel="lightbox[{LIGHTBOX_GROUP}]" data-title="{alt}">{img}</a>"#
    )
}

pub(crate) fn wrap_lightbox_images(html: &str) -> String {
    with_protected(html, "LIGHTBOX", &CODE_HTML, |s| {
        let s = RE_GALLERY.replace_all(s, |caps: &Captures<'_>| {
            let inner = &caps[2];
            if inner.contains("data-lightbox") {
                return caps[0].to_string();
            }
            let wrapped = RE_IMG.replace_all(inner, |img: &Captures<'_>| lightbox_anchor(&img[0]));
            format!("{}{}{}", &caps[1], wrapped, &caps[3])
        });
        RE_IMG_PARAGRAPH
            .replace_all(&s, |caps: &Captures<'_>| {
                format!("<p>{}</p>", lightbox_anchor(&caps[1]))
            })
            .into_owned()
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
