//! End-to-end rendering tests for richmark.
//!
//! Each test runs the full pipeline (pre-stages, comrak, post-stages) over
//! realistic author content and checks the resulting HTML.
//!
//! Run with:
//!   cargo test --test render

use pretty_assertions::assert_eq;
use richmark::{render_to_file, Renderer, RendererOptions, Switch};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn render(content: &str) -> String {
    Renderer::default().render(content).expect("render")
}

fn render_with(options: RendererOptions, content: &str) -> String {
    Renderer::new(options).render(content).expect("render")
}

/// One snippet exercising every optional stage.
const EVERY_FEATURE: &str = "\
- [x] task
- b

> quote

![img](/i.png)

```mermaid
graph TD
```

https://youtu.be/abc

.hljs { color: red }
";

/// What each switch leaves in the HTML when it is on.
fn feature_probe(switch: Switch) -> &'static str {
    match switch {
        Switch::ListClasses => r#"class="list-disc pl-2""#,
        Switch::BlockquoteClasses => "<blockquote class=\"p-4",
        Switch::Lightbox => "data-lightbox",
        Switch::YouTubeEmbeds => "youtube.com/embed/abc",
        Switch::TaskLists => r#"type="checkbox""#,
        Switch::Mermaid => r#"<div class="mermaid">"#,
        Switch::StripInlineCss => "",
    }
}

// ── Protected regions ────────────────────────────────────────────────────────

#[test]
fn test_fenced_code_survives_broad_substitutions() {
    let body = "# not a heading\n**kwargs and _x_\n- item\n---\n| a | b | | c | d | | e | f |";
    let input = format!("Intro\n\n```python\n{body}\n```\n\nOutro");
    let html = render(&input);
    assert!(
        html.contains(&format!(r#"<pre><code class="language-python">{body}</code></pre>"#)),
        "{html}"
    );
}

#[test]
fn test_pre_element_survives_byte_for_byte() {
    let pre = "<pre>**bold** _x_ # h\n- y\n<div>- z</div></pre>";
    let html = render(&format!("Before\n\n{pre}\n\nAfter"));
    assert!(html.contains(pre), "{html}");
}

#[test]
fn test_fence_conversion_escapes_once() {
    assert_eq!(
        render("```python\nprint(1)\n```"),
        "<pre><code class=\"language-python\">print(1)</code></pre>\n"
    );
    let html = render("```python\nif a < b && c:\n    pass\n```");
    assert!(html.contains("if a &lt; b &amp;&amp; c:"), "{html}");
}

#[test]
fn test_fence_info_strings_do_not_swallow_prose() {
    for open in ["``` python", "```rust,ignore", "```js title=\"x\""] {
        let html = render(&format!("{open}\nx = 1\n```\n\nSome *text* here\n\n```sh\ny\n```"));
        assert!(html.contains("<p>Some <em>text</em> here</p>"), "{open}: {html}");
        assert!(!html.contains("&lt;pre&gt;"), "{open}: {html}");
        assert!(html.contains(r#"<code class="language-sh">y</code>"#), "{open}: {html}");
    }
}

#[test]
fn test_entities_and_breaks_inside_code_survive() {
    let pre = "<pre>a&nbsp;b<br>c</pre>";
    let html = render(&format!("Before\n\n{pre}\n\nAfter"));
    assert!(html.contains(pre), "{html}");

    let html = render("```html\n<p>a&nbsp;b<br/>c</p>\n```");
    assert!(html.contains("&lt;p&gt;a&amp;nbsp;b&lt;br/&gt;c&lt;/p&gt;"), "{html}");
}

// ── Post-stage features ──────────────────────────────────────────────────────

#[test]
fn test_task_list_item() {
    let html = render("- [x] Done");
    assert!(
        html.contains(r#"<input type="checkbox" disabled checked class="mr-2 align-middle">Done"#),
        "{html}"
    );
}

#[test]
fn test_youtube_watch_url_paragraph() {
    let html = render("Watch this:\n\nhttps://www.youtube.com/watch?v=dQw4w9WgXcQ\n\nThanks");
    assert!(html.contains(r#"<div class="aspect-video w-full max-w-3xl">"#), "{html}");
    assert!(
        html.contains(r#"<iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ""#),
        "{html}"
    );
}

#[test]
fn test_every_switch_is_load_bearing() {
    let all_on = render(EVERY_FEATURE);
    for switch in Switch::ALL {
        let probe = feature_probe(switch);
        if probe.is_empty() {
            continue;
        }
        assert!(all_on.contains(probe), "{switch} on: {all_on}");
        let off = render_with(RendererOptions::builder().disable(switch).build(), EVERY_FEATURE);
        assert!(!off.contains(probe), "{switch} off: {off}");
    }
}

#[test]
fn test_inline_css_switch() {
    assert!(!render(EVERY_FEATURE).contains(".hljs"));
    let kept = render_with(RendererOptions::none(), EVERY_FEATURE);
    assert!(kept.contains(".hljs { color: red }"), "{kept}");
}

#[test]
fn test_all_switches_off_passes_markers_through() {
    let html = render_with(RendererOptions::none(), EVERY_FEATURE);
    assert!(html.contains("<ul>"), "{html}");
    assert!(html.contains("<blockquote>"), "{html}");
    assert!(html.contains("[x] task"), "{html}");
    assert!(html.contains(r#"class="language-mermaid""#), "{html}");
    assert!(html.contains(r#"<img src="/i.png" alt="img""#), "{html}");
    assert!(!html.contains("data-lightbox"), "{html}");
    assert!(!html.contains("<iframe"), "{html}");
}

#[test]
fn test_existing_classes_are_preserved() {
    let input = "<ul class=\"custom\"><li class=\"x\">a</li></ul>\n\n<blockquote class=\"mine\">q</blockquote>";
    let html = render(input);
    assert!(html.contains(r#"<ul class="custom">"#), "{html}");
    assert!(html.contains(r#"<li class="x">"#), "{html}");
    assert!(html.contains(r#"<blockquote class="mine">"#), "{html}");
    assert_eq!(html.matches("class=").count(), 3, "{html}");
}

#[test]
fn test_rerender_does_not_double_wrap_or_double_class() {
    let once = render("![cat](/c.png)\n\n- a\n- b\n\n> q");
    let twice = render(&once);
    assert_eq!(twice.matches("data-lightbox=").count(), 1, "{twice}");
    assert_eq!(twice.matches("list-disc").count(), 1, "{twice}");
    assert_eq!(twice.matches("border-s-4").count(), 1, "{twice}");
    assert_eq!(twice.matches(r#"class="mb-2""#).count(), 2, "{twice}");
}

// ── Editor artefacts ─────────────────────────────────────────────────────────

#[test]
fn test_wysiwyg_div_list_becomes_one_list() {
    let html = render("<div>- one</div><div>- two</div>");
    assert_eq!(html.matches("<ul").count(), 1, "{html}");
    assert!(html.contains(r#"<li class="mb-2">one</li>"#), "{html}");
    assert!(html.contains(r#"<li class="mb-2">two</li>"#), "{html}");
}

#[test]
fn test_emphasis_inside_raw_html_table() {
    let html = render("<table><tr><td>**bold** and _it_</td></tr></table>");
    assert!(
        html.contains("<td><strong>bold</strong> and <em>it</em></td>"),
        "{html}"
    );
}

#[test]
fn test_paragraph_wrapped_heading() {
    let html = render("<p>## Section</p>\n<p>Body</p>");
    assert!(html.contains("<h2>Section</h2>"), "{html}");
    assert!(html.contains("<p>Body</p>"), "{html}");
}

#[test]
fn test_more_marker_and_nbsp() {
    assert_eq!(render("Intro<more-->Rest"), "<p>IntroRest</p>\n");
    assert_eq!(render("a&nbsp;b"), "<p>a b</p>\n");
}

#[test]
fn test_two_space_nested_ordered_list() {
    // Without re-indentation "  1. b" would be a sibling of "1. a".
    let html = render("1. a\n  1. b\n2. c");
    assert_eq!(html.matches("<ol").count(), 2, "{html}");
}

#[test]
fn test_three_column_nested_ordered_list_keeps_every_level() {
    let html = render("1. a\n   1. b\n      1. c\n");
    assert_eq!(html.matches("<ol").count(), 3, "{html}");
    assert!(!html.contains("1. c"), "{html}");
}

#[test]
fn test_collapsed_table_thresholds() {
    // (paragraph, becomes a table)
    let cases = [
        ("<p>| a | b | | c | d |</p>", false),
        ("<p>| a | b | | c | d | | e | f |</p>", true),
        ("<p>| a | --- | | c | d |</p>", true),
        ("<p>| a | -- | | c | d |</p>", false),
    ];
    for (input, table) in cases {
        let html = render(input);
        assert_eq!(html.contains("<table>"), table, "{input} → {html}");
    }
}

// ── Renderer surface ─────────────────────────────────────────────────────────

#[test]
fn test_trace_matches_render() {
    let renderer = Renderer::default();
    let input = "# Title\n\n- [ ] todo";
    let out = renderer.render_with_trace(input, true).unwrap();
    assert_eq!(out.html, renderer.render(input).unwrap());
    assert_eq!(out.trace.get("00_raw"), Some(input));
    assert_eq!(out.trace.final_output(), Some(out.html.as_str()));
    assert!(out.trace.get("09_markdown").is_some());
}

#[test]
fn test_render_preview_stops_at_marker() {
    let html = Renderer::default()
        .render_preview("Lead paragraph.\n<more-->\nThe rest of the post.")
        .unwrap();
    assert_eq!(html, "<p>Lead paragraph.</p>\n");
}

#[test]
fn test_render_to_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("post.md");
    let output = dir.path().join("post.html");
    std::fs::write(&input, "- [ ] write tests").unwrap();

    render_to_file(&input, &output, &Renderer::default()).unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains(r#"type="checkbox" disabled class"#), "{html}");
}
