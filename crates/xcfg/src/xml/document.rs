//! XML documents backed by an optional file

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::key;
use crate::xml::event::Event;
use crate::xml::node::{self, Attributes, Node};
use crate::xml::reader::{Reader, ReaderConfig};
use crate::xml::writer::{self, WriteOptions};

/// Root container: ordered top-level nodes plus the file they came from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    path: Option<PathBuf>,
    children: Vec<Node>,
}

impl Document {
    /// Empty document with no backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document from `path`, creating an empty file first if none exists
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// [`open`](Self::open) with custom reader limits
    pub fn open_with_config(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("creating empty document file");
            fs::File::create(path).map_err(|e| Error::io(path, e))?;
        }
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut document = Self::parse_with_config(&text, config)?;
        document.path = Some(path.to_path_buf());
        debug!(nodes = document.children.len(), "document loaded");
        Ok(document)
    }

    /// Parse XML text into a document with no backing file
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_config(text, ReaderConfig::default())
    }

    /// [`parse`](Self::parse) with custom reader limits
    pub fn parse_with_config(text: &str, config: ReaderConfig) -> Result<Self> {
        let mut reader = Reader::with_config(text.as_bytes(), config);
        let mut children = Vec::new();
        let mut open: Vec<OpenElement> = Vec::new();
        while let Some(event) = reader.next_event()? {
            match event {
                Event::Start {
                    name,
                    attributes,
                    empty,
                } => {
                    let attributes = lowercase_names(&reader, &name, attributes)?;
                    if !empty {
                        open.push(OpenElement::new(name, attributes));
                    }
                }
                Event::Text(text) => {
                    if let Some(element) = open.last_mut() {
                        element.value = text;
                    }
                }
                Event::End { .. } => {
                    let Some(node) = open.pop().and_then(OpenElement::finish) else {
                        continue;
                    };
                    match open.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => children.push(node),
                    }
                }
            }
        }
        Ok(Self {
            path: None,
            children,
        })
    }

    /// File this document loads from and saves to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Point load and save at `path`
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Top-level nodes
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Top-level nodes, for direct editing
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn children_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        node::children_named(&self.children, key)
    }

    /// First top-level node, usually the root element
    pub fn first(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut Node> {
        self.children.first_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Value of the first top-level leaf matching `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        node::get(&self.children, key)
    }

    /// Append a top-level leaf
    pub fn add_child(&mut self, key: impl Into<String>, value: impl fmt::Display) -> &mut Self {
        self.push(Node::leaf(key, value.to_string()))
    }

    /// Append a top-level node
    pub fn push(&mut self, node: Node) -> &mut Self {
        self.children.push(node);
        self
    }

    /// Append a top-level section and return it
    pub fn add_section(&mut self, key: impl Into<String>) -> &mut Node {
        node::push_returning(&mut self.children, Node::section(key))
    }

    /// Top-level sections
    pub fn sections(&self) -> impl Iterator<Item = &Node> {
        node::sections(&self.children)
    }

    /// Top-level sections with a matching key
    pub fn sections_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        node::sections_named(&self.children, key)
    }

    /// Top-level sections with a direct child `node_key` whose value matches `value`
    pub fn sections_where<'a>(
        &'a self,
        node_key: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        node::sections_where(&self.children, node_key, value)
    }

    /// True when any top-level node is a section
    pub fn has_sections(&self) -> bool {
        self.sections().next().is_some()
    }

    /// First-occurring, highest-level section with a matching key
    pub fn find_section(&self, key: &str) -> Option<&Node> {
        node::find_section(&self.children, key)
    }

    pub fn find_section_mut(&mut self, key: &str) -> Option<&mut Node> {
        node::find_section_mut(&mut self.children, key)
    }

    /// First node anywhere in the document with a matching key
    pub fn find_node(&self, key: &str) -> Option<&Node> {
        node::find_node(&self.children, key)
    }

    pub fn find_node_mut(&mut self, key: &str) -> Option<&mut Node> {
        node::find_node_mut(&mut self.children, key)
    }

    /// Render with explicit formatting
    pub fn to_xml(&self, options: WriteOptions) -> String {
        writer::write_document(&self.children, options)
    }

    /// Overwrite the backing file with the current contents
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Err(Error::new(ErrorKind::MissingPath)),
        }
    }

    /// Write the current contents to `path`, leaving the backing file unchanged
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|e| Error::io(path, e))?;
        debug!("document saved");
        Ok(())
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml(WriteOptions::pretty()))
    }
}

/// Element whose end tag has not been read yet
struct OpenElement {
    key: String,
    attributes: Attributes,
    value: String,
    children: Vec<Node>,
}

impl OpenElement {
    fn new(key: String, attributes: Attributes) -> Self {
        Self {
            key,
            attributes,
            value: String::new(),
            children: Vec::new(),
        }
    }

    /// Elements with child elements become sections (stray text is dropped),
    /// text-only elements become leaves, and elements with neither are discarded.
    fn finish(self) -> Option<Node> {
        let node = if !self.children.is_empty() {
            Node::section_with(self.key, self.children)
        } else if !self.value.is_empty() {
            Node::leaf(self.key, self.value)
        } else {
            return None;
        };
        Some(node.with_attributes(self.attributes))
    }
}

/// Lowercase attribute names; names that collide once lowercased are a syntax error
fn lowercase_names(
    reader: &Reader<'_>,
    element: &str,
    attributes: Attributes,
) -> Result<Attributes> {
    let mut lowered = Attributes::with_capacity(attributes.len());
    for (name, value) in attributes {
        let normalized = key::normalize(&name);
        if lowered.contains_key(&normalized) {
            return Err(Error::syntax(
                reader.position(),
                format!("duplicate attribute {name} on <{element}>"),
            ));
        }
        lowered.insert(normalized, value);
    }
    Ok(lowered)
}
