//! Events emitted by the streaming XML reader

use indexmap::IndexMap;

/// One step of a streaming read.
///
/// Self-closing elements produce a single `Start` with `empty` set and no
/// matching `End`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Opening tag with its attributes in source order
    Start {
        name: String,
        attributes: IndexMap<String, String>,
        empty: bool,
    },
    /// Entity-decoded character data or CDATA content; whitespace-only runs are skipped
    Text(String),
    /// Closing tag
    End { name: String },
}

impl Event {
    /// Element name for `Start` and `End`
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Start { name, .. } | Self::End { name } => Some(name),
            Self::Text(_) => None,
        }
    }
}
