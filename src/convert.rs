//! File-level entry points.
//!
//! The renderer itself never touches the filesystem. These helpers read a
//! source file, render it, and optionally write the HTML next to wherever the
//! caller wants it, mapping I/O failures to [`RenderError`] variants that
//! carry the offending path.

use crate::error::RenderError;
use crate::renderer::Renderer;
use std::path::Path;
use tracing::info;

/// Read `path` and render its contents.
///
/// # Errors
/// - [`RenderError::ReadFailed`] if the file cannot be read as UTF-8
/// - [`RenderError::EngineFailed`] if the Markdown engine fails
pub fn render_file(path: impl AsRef<Path>, renderer: &Renderer) -> Result<String, RenderError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| RenderError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Rendering {} ({} bytes)", path.display(), content.len());
    renderer.render(&content)
}

/// Render `input` and write the HTML to `output`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn render_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    renderer: &Renderer,
) -> Result<(), RenderError> {
    let html = render_file(input, renderer)?;
    let path = output.as_ref();
    let write_err = |e| RenderError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = path.with_extension("html.tmp");
    std::fs::write(&tmp_path, &html).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        std::fs::remove_file(&tmp_path).ok();
        return Err(write_err(e));
    }

    info!("Wrote {} ({} bytes)", path.display(), html.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_read_failed() {
        let err = render_file("/definitely/not/here.md", &Renderer::default()).unwrap_err();
        assert!(matches!(err, RenderError::ReadFailed { .. }), "{err}");
    }

    #[test]
    fn test_render_to_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("post.md");
        std::fs::write(&input, "# Hi").unwrap();
        let output = dir.path().join("out/nested/post.html");

        render_to_file(&input, &output, &Renderer::default()).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("Hi</h1>"), "{html}");
        assert!(!output.with_extension("html.tmp").exists());
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("post.md");
        std::fs::write(&input, "# Hi").unwrap();
        // A non-empty directory at the output path makes the rename fail.
        let output = dir.path().join("post.html");
        std::fs::create_dir(&output).unwrap();
        std::fs::write(output.join("keep"), "x").unwrap();

        let err = render_to_file(&input, &output, &Renderer::default()).unwrap_err();

        assert!(matches!(err, RenderError::OutputWriteFailed { .. }), "{err}");
        assert!(!output.with_extension("html.tmp").exists());
    }
}
