//! xcfg - XML document model and key/value configuration files
//!
//! # Quick Start
//!
//! ```
//! use xcfg::from_xml_str;
//! # fn main() -> Result<(), xcfg::Error> {
//! let doc = from_xml_str("<config><Port>8080</Port><empty></empty></config>")?;
//! let port: u16 = doc
//!     .find_section("config")
//!     .map(|section| section.get_as("port"))
//!     .transpose()?
//!     .unwrap_or_default();
//! assert_eq!(port, 8080);
//! assert_eq!(
//!     doc.to_xml(xcfg::WriteOptions::compact()),
//!     r#"<?xml version="1.0" encoding="utf-8" ?><config><Port>8080</Port></config>"#
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;

pub mod key;
pub use key::keys_match;

pub mod value;
pub use value::{ConfigEnum, FromConfigValue};

pub mod xml;
pub use xml::{
    Attributes, Document, Event, Node, NodeKind, Reader, ReaderConfig, WriteOptions,
};

pub mod config;
pub use config::{open_in, Config, ConfigExt, TextConfig, XmlConfig};

pub mod context;
pub use context::{Problem, ProblemList, ProgramContext, Severity};

pub mod logging;

/// Parse an XML document from a string
pub fn from_xml_str(s: &str) -> Result<Document> {
    Document::parse(s)
}

/// Parse an XML document from bytes, which must be UTF-8
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Document> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        Error::with_message(
            ErrorKind::Syntax,
            Span::default(),
            format!("input is not valid UTF-8: {e}"),
        )
    })?;
    Document::parse(text)
}

/// Parse an XML document with custom reader limits
pub fn from_xml_str_with_config(s: &str, config: ReaderConfig) -> Result<Document> {
    Document::parse_with_config(s, config)
}
