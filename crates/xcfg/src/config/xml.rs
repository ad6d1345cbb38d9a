//! Config stored as leaf children of one XML section

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::{Config, ConfigExt, DEBUG_KEY};
use crate::error::{Error, Result};
use crate::xml::{Document, Node};

/// Config whose properties are the direct children of a parent section.
///
/// With autosave on (the default) every `set` and `delete_property` writes the
/// whole document back to disk. Turn it off to batch edits and call
/// [`save`](Config::save) explicitly.
#[derive(Debug, Clone)]
pub struct XmlConfig {
    path: PathBuf,
    parent: String,
    document: Document,
    autosave: bool,
    debug: bool,
}

impl XmlConfig {
    pub const DEFAULT_FILE: &'static str = "Config.xml";
    /// Root created for an empty file when no parent name is given
    pub const DEFAULT_ROOT: &'static str = "config";

    /// Open `path`; properties live in the first top-level element
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path.as_ref(), None)
    }

    /// Open `path`; properties live in the first section named `parent`
    pub fn with_parent(path: impl AsRef<Path>, parent: &str) -> Result<Self> {
        Self::load(path.as_ref(), Some(parent))
    }

    /// Open `Config.xml` in the current directory
    pub fn open_default() -> Result<Self> {
        let dir = std::env::current_dir().map_err(|e| Error::io(Path::new("."), e))?;
        Self::open(dir.join(Self::DEFAULT_FILE))
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn load(path: &Path, parent: Option<&str>) -> Result<Self> {
        let mut document = Document::open(path)?;
        let parent = match (parent, document.first()) {
            (Some(parent), _) => parent.trim().to_string(),
            (None, Some(first)) => first.key().to_string(),
            (None, None) => Self::DEFAULT_ROOT.to_string(),
        };
        ensure_parent(&mut document, &parent)?;

        let mut config = Self {
            path: path.to_path_buf(),
            parent,
            document,
            autosave: true,
            debug: false,
        };
        config.debug = config.get_as_or(DEBUG_KEY, false)?;
        Ok(config)
    }

    /// Name of the section holding the properties
    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access to the tree; call [`save`](Config::save) to persist edits
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Parent section, if the document still has one
    pub fn section(&self) -> Option<&Node> {
        self.document.find_section(&self.parent)
    }

    /// Parent section, recreated first if it has gone missing
    fn section_mut(&mut self) -> Result<&mut Node> {
        let parent = self.parent.as_str();
        ensure_parent(&mut self.document, parent)?;
        self.document
            .find_section_mut(parent)
            .ok_or_else(|| Error::missing_section(parent))
    }

    /// Write a copy of the document to `path`
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.document.save_to(path)
    }

    fn persist(&mut self) -> Result<()> {
        if self.autosave {
            self.save()
        } else {
            Ok(())
        }
    }
}

impl Config for XmlConfig {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .section()
            .and_then(|section| section.get(key))
            .filter(|value| !value.is_empty())
            .map(str::to_string))
    }

    fn set_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.section_mut()?.set_child(key, value);
        debug!(key, "setting config property");
        self.persist()
    }

    fn delete_property(&mut self, key: &str) -> Result<()> {
        if self.section_mut()?.remove_child(key).is_some() {
            debug!(key, "deleted config property");
            self.persist()?;
        }
        Ok(())
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn set_debug(&mut self, debug: bool) -> Result<()> {
        self.set(DEBUG_KEY, debug)?;
        self.debug = debug;
        Ok(())
    }

    fn properties(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .section()
            .map(|section| {
                section
                    .children()
                    .iter()
                    .filter(|child| child.is_leaf() && !child.value().is_empty())
                    .map(|child| (child.key().to_string(), child.value().to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn save(&mut self) -> Result<()> {
        self.document.save_to(&self.path)
    }

    fn reload(&mut self) -> Result<()> {
        let mut document = Document::open(&self.path)?;
        ensure_parent(&mut document, &self.parent)?;
        self.document = document;
        self.debug = self.get_as_or(DEBUG_KEY, false)?;
        Ok(())
    }
}

/// Make sure `document` has a section named `parent`.
///
/// An emptied section is dropped when the file is read back, so a missing
/// parent is added again: at the top level of an empty document, otherwise
/// under the root section. A document whose root is a leaf cannot hold it.
fn ensure_parent(document: &mut Document, parent: &str) -> Result<()> {
    if document.find_section(parent).is_some() {
        return Ok(());
    }
    if document.is_empty() {
        debug!(parent, "empty document, adding parent section");
        document.add_section(parent);
        return Ok(());
    }
    match document.first_mut() {
        Some(root) if root.is_section() => {
            debug!(parent, root = %root.key(), "parent section missing, adding it under root");
            root.add_section(parent);
            Ok(())
        }
        _ => Err(Error::missing_section(parent)),
    }
}
