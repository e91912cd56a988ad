//! CLI binary for richmark.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `RendererOptions` and prints the rendered HTML.

use anyhow::{Context, Result};
use clap::Parser;
use richmark::{excerpt, render_to_file, Renderer, RendererOptions, Switch};
use serde_json::json;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render a post (stdout)
  richmark post.md

  # Render to a file
  richmark post.md -o post.html

  # Read from stdin, no lightbox or YouTube embeds
  cat post.md | richmark --disable lightbox --disable youtube-embeds

  # Preview snippet, as the listing page shows it
  richmark --preview --json post.md

  # Plain-text excerpt (meta description)
  richmark --excerpt post.md

  # Dump every intermediate stage for debugging
  richmark --trace post.md > trace.json

SWITCHES (for --disable):
  list-classes, blockquote-classes, lightbox, youtube-embeds, task-lists,
  mermaid, strip-inline-css

ENVIRONMENT VARIABLES:
  RUST_LOG             Override the log filter (e.g. richmark=trace)
"#;

/// Render rich-text posts (Markdown mixed with editor HTML) to HTML.
#[derive(Parser, Debug)]
#[command(
    name = "richmark",
    version,
    about = "Render rich-text posts (Markdown mixed with editor HTML) to HTML",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long, env = "RICHMARK_OUTPUT")]
    output: Option<PathBuf>,

    /// Switch off an optional stage (repeatable).
    #[arg(long, value_enum, env = "RICHMARK_DISABLE", value_delimiter = ',')]
    disable: Vec<SwitchArg>,

    /// Render only the preview cut (text before the read-more marker).
    #[arg(long, conflicts_with_all = ["excerpt", "trace"])]
    preview: bool,

    /// Print the plain-text excerpt instead of HTML.
    #[arg(long, conflicts_with = "trace")]
    excerpt: bool,

    /// Print options, every stage's output, and the final HTML as JSON.
    #[arg(long)]
    trace: bool,

    /// Wrap the output as JSON (`{"html": …}`).
    #[arg(long, env = "RICHMARK_JSON")]
    json: bool,

    /// On engine failure, print the escaped source instead of failing.
    #[arg(long)]
    lossy: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RICHMARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RICHMARK_QUIET")]
    quiet: bool,
}

impl Cli {
    fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|p| *p != Path::new("-"))
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SwitchArg {
    ListClasses,
    BlockquoteClasses,
    Lightbox,
    #[value(name = "youtube-embeds")]
    YouTubeEmbeds,
    TaskLists,
    Mermaid,
    StripInlineCss,
}

impl From<SwitchArg> for Switch {
    fn from(v: SwitchArg) -> Self {
        match v {
            SwitchArg::ListClasses => Switch::ListClasses,
            SwitchArg::BlockquoteClasses => Switch::BlockquoteClasses,
            SwitchArg::Lightbox => Switch::Lightbox,
            SwitchArg::YouTubeEmbeds => Switch::YouTubeEmbeds,
            SwitchArg::TaskLists => Switch::TaskLists,
            SwitchArg::Mermaid => Switch::Mermaid,
            SwitchArg::StripInlineCss => Switch::StripInlineCss,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build renderer ───────────────────────────────────────────────────
    let options = cli
        .disable
        .iter()
        .fold(RendererOptions::builder(), |b, s| b.disable((*s).into()))
        .build();
    let renderer = Renderer::new(options);

    // ── File to file: the common case ────────────────────────────────────
    let plain = !cli.preview && !cli.excerpt && !cli.trace && !cli.json && !cli.lossy;
    if let (true, Some(input), Some(output)) = (plain, cli.input_path(), cli.output.as_ref()) {
        render_to_file(input, output, &renderer)
            .with_context(|| format!("Failed to render {}", input.display()))?;
        if !cli.quiet {
            eprintln!("{}  {}", green("✔"), bold(&output.display().to_string()));
        }
        return Ok(());
    }

    // ── Render ───────────────────────────────────────────────────────────
    let content = read_input(&cli)?;

    let rendered = if cli.excerpt {
        let text = excerpt(&content);
        if cli.json {
            serde_json::to_string_pretty(&json!({ "excerpt": text }))?
        } else {
            text
        }
    } else if cli.trace {
        let out = renderer
            .render_with_trace(&content, true)
            .context("Rendering failed")?;
        serde_json::to_string_pretty(&json!({
            "options": renderer.options(),
            "stages": out.trace,
            "html": out.html,
        }))
        .context("Failed to serialise trace")?
    } else {
        let html = if cli.preview {
            renderer.render_preview(&content).context("Preview rendering failed")?
        } else if cli.lossy {
            renderer.render_lossy(&content)
        } else {
            renderer.render(&content).context("Rendering failed")?
        };
        if cli.json {
            serde_json::to_string_pretty(&json!({ "html": html }))?
        } else {
            html
        }
    };

    write_output(cli.output.as_deref(), &rendered)
}

fn read_input(cli: &Cli) -> Result<String> {
    match cli.input_path() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !rendered.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
            Ok(())
        }
    }
}
