//! XML tree nodes
//!
//! A [`Node`] is either a leaf carrying a text value or a section carrying
//! ordered child nodes. Both carry a key (the element name) and attributes.
//! All key lookups are case-insensitive via [`keys_match`]; insertion order is
//! preserved and decides "first match" results.

use std::fmt;

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key::{keys_match, values_match};
use crate::value::{parse_enum, parse_value, ConfigEnum, FromConfigValue};

/// Attribute name to value, in source order
pub type Attributes = IndexMap<String, String>;

/// Payload of a node
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    /// Text value; empty means "no value"
    Leaf(String),
    /// Ordered children
    Section(Vec<Node>),
}

impl NodeKind {
    fn make_section(&mut self) -> &mut Vec<Node> {
        match self {
            Self::Section(children) => children,
            Self::Leaf(_) => {
                *self = Self::Section(Vec::new());
                self.make_section()
            }
        }
    }
}

/// A single element of an XML tree
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    key: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "IndexMap::is_empty")
    )]
    attributes: Attributes,
    #[cfg_attr(feature = "serde", serde(flatten))]
    kind: NodeKind,
}

impl Node {
    /// Leaf node with a value
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attributes: Attributes::new(),
            kind: NodeKind::Leaf(value.into()),
        }
    }

    /// Leaf node with no value. Inert, but serializes as an empty element.
    pub fn empty(key: impl Into<String>) -> Self {
        Self::leaf(key, String::new())
    }

    /// Section with no children
    pub fn section(key: impl Into<String>) -> Self {
        Self::section_with(key, Vec::new())
    }

    /// Section with the given children
    pub fn section_with(key: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            key: key.into(),
            attributes: Attributes::new(),
            kind: NodeKind::Section(children),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style replacement of all attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Element name as written
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Leaf value or section children
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// True when the node holds a text value
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// True when the node holds child nodes
    pub fn is_section(&self) -> bool {
        matches!(self.kind, NodeKind::Section(_))
    }

    /// This node's own value; empty for sections
    pub fn value(&self) -> &str {
        match &self.kind {
            NodeKind::Leaf(value) => value,
            NodeKind::Section(_) => "",
        }
    }

    /// This node's own value converted to `T`
    pub fn value_as<T: FromConfigValue>(&self) -> Result<T> {
        parse_value(self.value())
    }

    /// Replace this node's payload with a value. A section loses its children.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.kind = NodeKind::Leaf(value.into());
    }

    /// True for a leaf with no value: kept when built in code, dropped when parsed
    pub fn is_inert(&self) -> bool {
        match &self.kind {
            NodeKind::Leaf(value) => value.is_empty(),
            NodeKind::Section(children) => children.is_empty(),
        }
    }

    /// Attributes in source order
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Value of an attribute, matched case-insensitively
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| keys_match(attr, name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert or replace an attribute
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Direct children; empty for leaves
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            NodeKind::Section(children) => children,
            NodeKind::Leaf(_) => &[],
        }
    }

    /// Mutable access to children, turning a leaf into a section
    pub fn children_mut(&mut self) -> &mut Vec<Self> {
        self.kind.make_section()
    }

    /// Direct children whose key matches
    pub fn children_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        children_named(self.children(), key)
    }

    /// Value of the first direct child matching `key`.
    ///
    /// `None` when no child matches or when the first match is a section.
    pub fn get(&self, key: &str) -> Option<&str> {
        get(self.children(), key)
    }

    /// [`get`](Self::get) with a fallback
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Child value converted to `T`; `KeyNotFound` when there is no value
    pub fn get_as<T: FromConfigValue>(&self, key: &str) -> Result<T> {
        match self.get(key) {
            Some(value) if !value.is_empty() => parse_value(value),
            _ => Err(Error::key_not_found(key)),
        }
    }

    /// Child value converted to `T`, or `default` when absent.
    /// A present but malformed value is still an error.
    pub fn get_as_or<T: FromConfigValue>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            Some(value) if !value.is_empty() => parse_value(value),
            _ => Ok(default),
        }
    }

    /// Child value parsed as enum `T`; `KeyNotFound` when there is no value
    pub fn get_enum<T: ConfigEnum>(&self, key: &str, ignore_case: bool) -> Result<T> {
        match self.get(key) {
            Some(value) if !value.is_empty() => parse_enum(value, ignore_case),
            _ => Err(Error::key_not_found(key)),
        }
    }

    /// Child value parsed as enum `T`, or `default` when absent
    pub fn get_enum_or<T: ConfigEnum>(&self, key: &str, default: T, ignore_case: bool) -> Result<T> {
        match self.get(key) {
            Some(value) if !value.is_empty() => parse_enum(value, ignore_case),
            _ => Ok(default),
        }
    }

    /// True if [`get`](Self::get) yields a non-empty value
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    /// Append a leaf child
    pub fn add_child(&mut self, key: impl Into<String>, value: impl fmt::Display) -> &mut Self {
        self.push(Self::leaf(key, value.to_string()))
    }

    /// Append a leaf child with no value
    pub fn add_empty(&mut self, key: impl Into<String>) -> &mut Self {
        self.push(Self::empty(key))
    }

    /// Append any node
    pub fn push(&mut self, node: Self) -> &mut Self {
        self.children_mut().push(node);
        self
    }

    /// Append an empty section and return it
    pub fn add_section(&mut self, key: impl Into<String>) -> &mut Self {
        push_returning(self.children_mut(), Self::section(key))
    }

    /// Overwrite the first direct child matching `key`, or append a new leaf
    pub fn set_child(&mut self, key: &str, value: impl fmt::Display) {
        let children = self.children_mut();
        match children.iter_mut().find(|child| keys_match(&child.key, key)) {
            Some(child) => child.set_value(value.to_string()),
            None => children.push(Self::leaf(key.trim(), value.to_string())),
        }
    }

    /// Remove and return the first direct child matching `key`
    pub fn remove_child(&mut self, key: &str) -> Option<Self> {
        let children = match &mut self.kind {
            NodeKind::Section(children) => children,
            NodeKind::Leaf(_) => return None,
        };
        let index = children
            .iter()
            .position(|child| keys_match(&child.key, key))?;
        Some(children.remove(index))
    }

    /// Section children
    pub fn sections(&self) -> impl Iterator<Item = &Self> {
        sections(self.children())
    }

    /// Section children whose key matches
    pub fn sections_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        sections_named(self.children(), key)
    }

    /// Section children holding a direct leaf `node_key` whose value equals `value`
    /// (case-insensitive)
    pub fn sections_where<'a>(
        &'a self,
        node_key: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Self> + 'a {
        sections_where(self.children(), node_key, value)
    }

    pub fn has_sections(&self) -> bool {
        self.sections().next().is_some()
    }

    pub fn has_sections_named(&self, key: &str) -> bool {
        self.sections_named(key).next().is_some()
    }

    /// First node with a matching key, searching each child before its subtree
    pub fn find_node(&self, key: &str) -> Option<&Self> {
        find_node(self.children(), key)
    }

    pub fn find_node_mut(&mut self, key: &str) -> Option<&mut Self> {
        match &mut self.kind {
            NodeKind::Section(children) => find_node_mut(children, key),
            NodeKind::Leaf(_) => None,
        }
    }

    /// First-occurring, highest-level section with a matching key
    pub fn find_section(&self, key: &str) -> Option<&Self> {
        find_section(self.children(), key)
    }

    pub fn find_section_mut(&mut self, key: &str) -> Option<&mut Self> {
        match &mut self.kind {
            NodeKind::Section(children) => find_section_mut(children, key),
            NodeKind::Leaf(_) => None,
        }
    }
}

// Search helpers shared by `Node` and `Document`, which both own a `[Node]`.

pub(crate) fn get<'a>(children: &'a [Node], key: &str) -> Option<&'a str> {
    let child = children.iter().find(|child| keys_match(&child.key, key))?;
    match &child.kind {
        NodeKind::Leaf(value) => Some(value),
        NodeKind::Section(_) => None,
    }
}

pub(crate) fn children_named<'a>(
    children: &'a [Node],
    key: &'a str,
) -> impl Iterator<Item = &'a Node> + 'a {
    children
        .iter()
        .filter(move |child| keys_match(&child.key, key))
}

pub(crate) fn sections(children: &[Node]) -> impl Iterator<Item = &Node> {
    children.iter().filter(|child| child.is_section())
}

pub(crate) fn sections_named<'a>(
    children: &'a [Node],
    key: &'a str,
) -> impl Iterator<Item = &'a Node> + 'a {
    sections(children).filter(move |child| keys_match(&child.key, key))
}

pub(crate) fn sections_where<'a>(
    children: &'a [Node],
    node_key: &'a str,
    value: &'a str,
) -> impl Iterator<Item = &'a Node> + 'a {
    sections(children).filter(move |child| values_match(child.get_or(node_key, ""), value))
}

pub(crate) fn find_node<'a>(children: &'a [Node], key: &str) -> Option<&'a Node> {
    children.iter().find_map(|child| {
        if keys_match(&child.key, key) {
            Some(child)
        } else {
            child.find_node(key)
        }
    })
}

pub(crate) fn find_node_mut<'a>(children: &'a mut [Node], key: &str) -> Option<&'a mut Node> {
    children.iter_mut().find_map(|child| {
        if keys_match(&child.key, key) {
            Some(child)
        } else {
            child.find_node_mut(key)
        }
    })
}

pub(crate) fn find_section<'a>(children: &'a [Node], key: &str) -> Option<&'a Node> {
    children
        .iter()
        .find(|child| child.is_section() && keys_match(&child.key, key))
        .or_else(|| sections(children).find_map(|section| section.find_section(key)))
}

pub(crate) fn find_section_mut<'a>(children: &'a mut [Node], key: &str) -> Option<&'a mut Node> {
    let direct = children
        .iter()
        .position(|child| child.is_section() && keys_match(&child.key, key));
    match direct {
        Some(index) => children.get_mut(index),
        None => children
            .iter_mut()
            .filter(|child| child.is_section())
            .find_map(|section| section.find_section_mut(key)),
    }
}

#[allow(clippy::indexing_slicing)]
pub(crate) fn push_returning(children: &mut Vec<Node>, node: Node) -> &mut Node {
    let index = children.len();
    children.push(node);
    &mut children[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::config_enum! {
        enum Schedule { Daily, Hourly }
    }

    fn recipients() -> Node {
        let mut root = Node::section("config");
        root.add_child("debug", "false");
        let group = root.add_section("recipients");
        group.add_child("name", "A").add_child("name", "B");
        root
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let root = recipients();
        assert_eq!(root.get("Debug"), Some("false"));
        assert_eq!(root.get("DEBUG"), Some("false"));
        assert_eq!(root.get("debug"), Some("false"));
    }

    #[test]
    fn test_get_first_match_wins() {
        let mut root = Node::section("s");
        root.add_child("x", "1").add_child("x", "2");
        assert_eq!(root.get("x"), Some("1"));
    }

    #[test]
    fn test_get_on_section_or_absent_uses_default() {
        let root = recipients();
        assert_eq!(root.get("recipients"), None);
        assert_eq!(root.get_or("recipients", "none"), "none");
        assert_eq!(root.get_or("missing", ""), "");
        assert!(!root.has_value("recipients"));
    }

    #[test]
    fn test_get_does_not_search_attributes() {
        let root = Node::section("s").with_attribute("debug", "true");
        assert_eq!(root.get("debug"), None);
        assert_eq!(root.attribute("DEBUG"), Some("true"));
    }

    #[test]
    fn test_get_as_contract() -> Result<()> {
        let mut root = Node::section("s");
        root.add_child("timeout", "30").add_child("bad", "thirty");
        assert_eq!(root.get_as::<i32>("timeout")?, 30);
        assert_eq!(root.get_as_or::<i32>("missing", 5)?, 5);
        assert!(matches!(
            root.get_as::<i32>("missing").map_err(|e| e.kind().clone()),
            Err(crate::ErrorKind::KeyNotFound { .. })
        ));
        // defaults only cover absence
        assert!(matches!(
            root.get_as_or::<i32>("bad", 5).map_err(|e| e.kind().clone()),
            Err(crate::ErrorKind::Conversion { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_get_enum_contract() -> Result<()> {
        let mut root = Node::section("s");
        root.add_child("mode", "hourly").add_child("other", "weekly");
        assert_eq!(root.get_enum::<Schedule>("mode", true)?, Schedule::Hourly);
        assert!(root.get_enum::<Schedule>("mode", false).is_err());
        assert_eq!(
            root.get_enum_or("missing", Schedule::Daily, true)?,
            Schedule::Daily
        );
        assert!(root.get_enum_or("other", Schedule::Daily, true).is_err());
        assert!(root.get_enum::<Schedule>("missing", true).is_err());
        Ok(())
    }

    #[test]
    fn test_children_named_in_order() {
        let root = recipients();
        let group = root.find_section("recipients");
        let names: Vec<&str> = group
            .map(|g| g.children_named("NAME").map(Node::value).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_sections_where() {
        let mut root = Node::section("people");
        root.add_section("person").add_child("id", "7").add_child("name", "Ann");
        root.add_section("person").add_child("id", "8").add_child("name", "Bob");
        let found: Vec<&str> = root
            .sections_where("NAME", "bob")
            .map(|s| s.get_or("id", ""))
            .collect();
        assert_eq!(found, vec!["8"]);
        assert!(root.has_sections_named("Person"));
        assert!(!root.has_sections_named("id"));
    }

    #[test]
    fn test_find_section_prefers_higher_level() {
        let mut root = Node::section("root");
        root.add_section("a").add_section("target").add_child("depth", "2");
        root.add_section("target").add_child("depth", "1");
        let found = root.find_section("target").map(|s| s.get_or("depth", ""));
        assert_eq!(found, Some("1"));
    }

    #[test]
    fn test_find_node_is_depth_first() {
        let mut root = Node::section("root");
        root.add_section("a").add_child("target", "nested");
        root.add_child("target", "top");
        assert_eq!(root.find_node("target").map(Node::value), Some("nested"));
    }

    #[test]
    fn test_find_node_matches_sections_too() {
        let root = recipients();
        assert!(root.find_node("recipients").is_some_and(Node::is_section));
        assert!(root.find_node("nothing").is_none());
    }

    #[test]
    fn test_find_mut_edits_in_place() {
        let mut root = recipients();
        if let Some(group) = root.find_section_mut("RECIPIENTS") {
            group.add_child("name", "C");
        }
        if let Some(node) = root.find_node_mut("debug") {
            node.set_value("true");
        }
        assert_eq!(
            root.find_section("recipients")
                .map(|g| g.children_named("name").count()),
            Some(3)
        );
        assert_eq!(root.get("debug"), Some("true"));
    }

    #[test]
    fn test_set_and_remove_child() {
        let mut root = Node::section("config");
        root.set_child("Timeout", 30);
        root.set_child("timeout", 60);
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children().first().map(Node::key), Some("Timeout"));
        assert_eq!(root.get("TIMEOUT"), Some("60"));

        let removed = root.remove_child("timeout");
        assert_eq!(removed.map(|n| n.value().to_string()), Some("60".to_string()));
        assert!(root.remove_child("timeout").is_none());
    }

    #[test]
    fn test_adding_to_leaf_makes_section() {
        let mut node = Node::leaf("x", "value");
        node.add_child("y", "1");
        assert!(node.is_section());
        assert_eq!(node.value(), "");
        assert_eq!(node.get("y"), Some("1"));
    }

    #[test]
    fn test_inert_nodes() {
        assert!(Node::empty("x").is_inert());
        assert!(Node::section("x").is_inert());
        assert!(!Node::leaf("x", "1").is_inert());
        assert!(!recipients().is_inert());
    }

    #[test]
    fn test_leaf_has_no_children() {
        let leaf = Node::leaf("x", "1");
        assert!(leaf.children().is_empty());
        assert!(!leaf.has_sections());
        assert_eq!(leaf.get("x"), None);
        assert_eq!(leaf.value_as::<u8>().ok(), Some(1));
    }
}
