//! XML document model: streaming reader, node tree, document and writer

pub mod document;
pub mod event;
pub mod node;
pub mod reader;
pub mod writer;

pub use document::Document;
pub use event::Event;
pub use node::{Attributes, Node, NodeKind};
pub use reader::{Reader, ReaderConfig, HARD_MAX_DEPTH};
pub use writer::WriteOptions;
