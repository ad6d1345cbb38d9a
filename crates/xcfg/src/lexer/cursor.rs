//! Byte cursor over markup input

use crate::error::Pos;

/// Forward-only view of the input that keeps a line/column position
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    /// Byte under the cursor
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.remaining().starts_with(pattern)
    }

    /// Step over one byte; a newline moves to column 1 of the next line
    pub fn advance(&mut self) {
        let Some(b) = self.current() else {
            return;
        };
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    /// Step over up to `n` bytes
    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Step over `expected` if it is next
    pub fn consume(&mut self, expected: u8) -> bool {
        let matched = self.current() == Some(expected);
        if matched {
            self.advance();
        }
        matched
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    }

    /// Consume bytes while `keep` holds and return them
    pub fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.offset;
        while self.current().is_some_and(&keep) {
            self.advance();
        }
        self.input.get(start..self.offset).unwrap_or_default()
    }

    /// Consume through the next `pattern` and return what preceded it.
    ///
    /// Returns `None` and leaves the cursor at end of input when the pattern
    /// never occurs.
    pub fn take_until(&mut self, pattern: &[u8]) -> Option<&'a [u8]> {
        let start = self.offset;
        while !self.is_eof() {
            if self.starts_with(pattern) {
                let taken = self.input.get(start..self.offset).unwrap_or_default();
                self.advance_by(pattern.len());
                return Some(taken);
            }
            self.advance();
        }
        None
    }

    pub const fn position(&self) -> Pos {
        Pos::new(self.offset, self.line, self.col)
    }

    pub const fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Unconsumed input
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.offset..).unwrap_or_default()
    }
}
