//! Streaming XML reader
//!
//! Pulls one [`Event`] at a time from a byte slice. The reader checks
//! well-formedness as it goes (matching close tags, quoted attributes, known
//! entities) and skips markup that carries no data: the XML declaration,
//! processing instructions, comments and DOCTYPE blocks.

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::Cursor;
use crate::xml::event::Event;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Nesting ceiling that applies even when `max_depth` is 0 or larger.
///
/// Node trees are walked recursively when written, searched, compared and
/// dropped, so depth stays bounded regardless of configuration.
pub const HARD_MAX_DEPTH: u16 = 1024;

/// Limits applied while reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum element nesting depth (0 means [`HARD_MAX_DEPTH`])
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl ReaderConfig {
    /// Create a config with unlimited size; depth is still capped at
    /// [`HARD_MAX_DEPTH`]
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }

    /// Nesting depth actually enforced
    pub const fn depth_limit(&self) -> u16 {
        if self.max_depth == 0 || self.max_depth > HARD_MAX_DEPTH {
            HARD_MAX_DEPTH
        } else {
            self.max_depth
        }
    }
}

/// Streaming XML reader
#[derive(Debug)]
pub struct Reader<'a> {
    cursor: Cursor<'a>,
    config: ReaderConfig,
    open: Vec<String>,
    started: bool,
    failed: bool,
}

impl<'a> Reader<'a> {
    /// Create a new reader with default limits
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, ReaderConfig::default())
    }

    /// Create a new reader with custom limits
    pub fn with_config(input: &'a [u8], config: ReaderConfig) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            open: Vec::new(),
            started: false,
            failed: false,
        }
    }

    /// Number of elements currently open
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Position just past the last event read
    pub fn position(&self) -> Pos {
        self.cursor.position()
    }

    /// Read the next event, or `None` once the input is exhausted
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        let result = self.read_event();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn read_event(&mut self) -> Result<Option<Event>> {
        if !self.started {
            self.start()?;
        }

        loop {
            if self.cursor.is_eof() {
                return match self.open.last() {
                    Some(name) => Err(self.error_here(&format!("unterminated element <{name}>"))),
                    None => Ok(None),
                };
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                if self.open.is_empty() {
                    return Err(self.error_here("character data outside of an element"));
                }
                self.cursor.advance_by(9);
                let text = self.read_until(b"]]>")?;
                if text.is_empty() {
                    continue;
                }
                return Ok(Some(Event::Text(text)));
            }

            if self.cursor.starts_with(b"<!") {
                self.skip_doctype()?;
                continue;
            }

            if self.cursor.starts_with(b"</") {
                return self.read_end_tag().map(Some);
            }

            if self.cursor.current() == Some(b'<') {
                return self.read_start_tag().map(Some);
            }

            if let Some(text) = self.read_text()? {
                if self.open.is_empty() {
                    return Err(self.error_here("text outside of an element"));
                }
                return Ok(Some(Event::Text(text)));
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        self.started = true;
        let size = self.cursor.remaining().len();
        if self.config.max_size != 0 && size > self.config.max_size {
            let kind = ErrorKind::MaxSizeExceeded {
                max: self.config.max_size,
            };
            let message = kind.to_string();
            return Err(Error::with_message(
                kind,
                Span::at(self.cursor.position()),
                message,
            ));
        }
        if self.cursor.starts_with(BOM) {
            self.cursor.advance_by(BOM.len());
        }
        Ok(())
    }

    fn read_start_tag(&mut self) -> Result<Event> {
        self.cursor.advance(); // '<'
        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        let empty = self.cursor.consume(b'/');
        self.expect_byte(b'>')?;

        let max = self.config.depth_limit();
        if self.open.len() >= usize::from(max) {
            let kind = ErrorKind::MaxDepthExceeded { max };
            let message = kind.to_string();
            return Err(Error::with_message(
                kind,
                Span::at(self.cursor.position()),
                message,
            ));
        }

        if !empty {
            self.open.push(name.clone());
        }

        Ok(Event::Start {
            name,
            attributes,
            empty,
        })
    }

    fn read_end_tag(&mut self) -> Result<Event> {
        self.cursor.advance_by(2); // "</"
        let name = self.parse_name()?;
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')?;

        match self.open.pop() {
            Some(open) if open == name => Ok(Event::End { name }),
            Some(open) => Err(self.error_here(&format!(
                "mismatched closing tag: expected </{open}>, found </{name}>"
            ))),
            None => Err(self.error_here(&format!("unexpected closing tag </{name}>"))),
        }
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here(&format!("duplicate attribute {name}")));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let raw = self.cursor.take_while(|b| b != quote && b != b'<');
        match self.cursor.current() {
            Some(b) if b == quote => {
                self.cursor.advance();
                let text = self.bytes_to_string(raw)?;
                self.decode_entities(&text)
            }
            Some(_) => Err(self.error_here("'<' in attribute value")),
            None => Err(self.error_here("unterminated attribute value")),
        }
    }

    fn read_text(&mut self) -> Result<Option<String>> {
        let raw = self.cursor.take_while(|b| b != b'<');
        let text = self.bytes_to_string(raw)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.decode_entities(&text).map(Some)
    }

    fn read_until(&mut self, pattern: &[u8]) -> Result<String> {
        match self.cursor.take_until(pattern) {
            Some(raw) => self.bytes_to_string(raw),
            None => Err(self.error_here("unterminated markup")),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        match self.cursor.current() {
            Some(first) if is_name_start(first) => {}
            Some(_) => return Err(self.error_here("invalid name")),
            None => return Err(self.error_here("expected name")),
        }
        let raw = self.cursor.take_while(is_name_char);
        self.bytes_to_string(raw)
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // cursor currently at "<!"
        self.cursor.advance_by(2);
        let mut brackets = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => brackets += 1,
                b']' => brackets = brackets.saturating_sub(1),
                b'>' if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here("unterminated declaration"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        match self.cursor.take_until(pattern) {
            Some(_) => Ok(()),
            None => Err(self.error_here("unterminated markup")),
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected '{}'", char::from(expected))))
        }
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| self.error_here("invalid utf-8"))
    }

    fn decode_entities(&self, input: &str) -> Result<String> {
        let input = input.replace("\r\n", "\n");
        if !input.contains('&') {
            return Ok(input);
        }

        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars();
        while let Some(ch) = chars.next() {
            if ch != '&' {
                result.push(ch);
                continue;
            }

            let mut entity = String::new();
            let mut terminated = false;
            for next in chars.by_ref() {
                if next == ';' {
                    terminated = true;
                    break;
                }
                entity.push(next);
            }

            let decoded = match entity.as_str() {
                _ if !terminated => None,
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            };

            match decoded {
                Some(ch) => result.push(ch),
                None => return Err(self.error_here(&format!("invalid xml entity &{entity}"))),
            }
        }

        Ok(result)
    }

    fn error_here(&self, message: &str) -> Error {
        Error::syntax(self.cursor.position(), message)
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_event().transpose()
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
