//! Error types for xcfg

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Requested key is absent and no default was supplied
    KeyNotFound { key: String },
    /// Value is present but cannot be parsed as the requested type
    Conversion { value: String, target: &'static str },
    /// Text config failed structural validation
    MalformedConfig {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    /// XML config's parent section is missing
    MissingSection { name: String },
    /// XML input is not well formed
    Syntax,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    /// Document has no backing file and no explicit path was given
    MissingPath,
    /// Underlying file operation failed
    Io { path: PathBuf },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound { key } => write!(f, "key {key} not found"),
            Self::Conversion { value, target } => {
                write!(f, "cannot convert {value:?} to {target}")
            }
            Self::MalformedConfig { path, line, reason } => write!(
                f,
                "incorrect format at line {line} in {}: {reason}",
                path.display()
            ),
            Self::MissingSection { name } => write!(f, "parent node \"{name}\" not found"),
            Self::Syntax => write!(f, "invalid xml"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::MissingPath => write!(f, "document has no file location"),
            Self::Io { path } => write!(f, "i/o failure on {}", path.display()),
        }
    }
}

/// Main error type for xcfg
#[derive(Error, Debug)]
pub struct Error {
    kind: ErrorKind,
    span: Option<Span>,
    message: String,
    #[source]
    source: Option<io::Error>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span: None,
            message,
            source: None,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: Some(span),
            message: message.into(),
            source: None,
        }
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new(ErrorKind::KeyNotFound {
            key: key.to_string(),
        })
    }

    pub fn conversion(value: &str, target: &'static str) -> Self {
        Self::new(ErrorKind::Conversion {
            value: value.to_string(),
            target,
        })
    }

    pub fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedConfig {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        })
    }

    pub fn missing_section(name: &str) -> Self {
        Self::new(ErrorKind::MissingSection {
            name: name.to_string(),
        })
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        let kind = ErrorKind::Io {
            path: path.to_path_buf(),
        };
        let message = format!("{kind}: {source}");
        Self {
            kind,
            span: None,
            message,
            source: Some(source),
        }
    }

    /// Syntax error at a specific position
    pub fn syntax(pos: Pos, message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Syntax, Span::at(pos), message)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for both structural text-config failures and a missing XML parent section
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MalformedConfig { .. } | ErrorKind::MissingSection { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "error at {}: {}", span.start, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result type alias for xcfg
pub type Result<T> = std::result::Result<T, Error>;
