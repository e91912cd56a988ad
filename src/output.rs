//! Render output types.

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

/// The content after each stage, in pipeline order.
///
/// Debug only: filled when a render is asked to capture it, empty otherwise.
/// Keys are the stage names from [`crate::pipeline`] (`00_raw`, `01_…`,
/// `09_markdown`, …). Stages switched off by the options do not appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTrace {
    entries: Vec<(&'static str, String)>,
}

impl StageTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, stage: &'static str, output: &str) {
        self.entries.push((stage, output.to_string()));
    }

    /// Content right after `stage` ran.
    pub fn get(&self, stage: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, output)| output.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(name, output)| (*name, output.as_str()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output of the last recorded stage.
    pub fn final_output(&self) -> Option<&str> {
        self.entries.last().map(|(_, output)| output.as_str())
    }
}

/// Serialises as `[{"stage": "...", "output": "..."}, ...]`, keeping order.
impl Serialize for StageTrace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Entry<'a>(&'a str, &'a str);

        impl Serialize for Entry<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut st = serializer.serialize_struct("StageOutput", 2)?;
                st.serialize_field("stage", self.0)?;
                st.serialize_field("output", self.1)?;
                st.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (name, output) in &self.entries {
            seq.serialize_element(&Entry(name, output))?;
        }
        seq.end()
    }
}

/// Result of [`crate::Renderer::render_with_trace`].
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    /// Final HTML.
    pub html: String,
    /// Per-stage snapshots; empty unless capture was requested.
    pub trace: StageTrace,
}
