//! A minimal, offset-exact JSON event scanner.
//!
//! The document walker needs an event stream (object begin/end, property,
//! literal value) where every event carries the byte offset of the source
//! text that produced it, and where string values arrive already paired with
//! their position table. General-purpose JSON crates erase offsets during
//! deserialization, so the scanner is written by hand; the grammar is plain
//! JSON with comments rejected.
//!
//! The scanner is strict about structure but lenient inside strings: escape
//! decoding never fails (see [`crate::rawtext`]), so a malformed escape in one
//! message cannot take down the document.

use crate::error::Error;
use crate::rawtext::{EscapeDecoder, JsonEscapes, RawText};

/// One scanner event. `offset` always points at the first byte of the
/// construct; `end` points just past its last byte.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ObjectBegin {
        offset: usize,
    },
    /// `offset` is the byte offset of the closing `}`.
    ObjectEnd {
        offset: usize,
    },
    ArrayBegin {
        offset: usize,
    },
    ArrayEnd {
        offset: usize,
    },
    /// An object property name. `offset` is the opening quote; the name's
    /// own offset (inside [`RawText`]) is the byte after it.
    Property {
        name: RawText,
        offset: usize,
        end: usize,
    },
    /// A string value.
    String {
        value: RawText,
        offset: usize,
        end: usize,
    },
    /// A number, boolean, or null value.
    Scalar {
        offset: usize,
        end: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    KeyOrEnd,
    Key,
    Colon,
    CommaOrEnd,
    End,
}

/// Pull scanner over a complete document.
pub struct Scanner<'a> {
    doc: &'a str,
    pos: usize,
    stack: Vec<Frame>,
    expect: Expect,
    decoder: &'a dyn EscapeDecoder,
}

impl<'a> Scanner<'a> {
    pub fn new(doc: &'a str) -> Self {
        Scanner::with_decoder(doc, &JsonEscapes)
    }

    pub fn with_decoder(doc: &'a str, decoder: &'a dyn EscapeDecoder) -> Self {
        Scanner {
            doc,
            pos: 0,
            stack: Vec::new(),
            expect: Expect::Value,
            decoder,
        }
    }

    /// Current byte offset; after an error this is where scanning stopped.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Returns the next event, `Ok(None)` at a clean end of input, or the
    /// first syntax error encountered.
    pub fn next_event(&mut self) -> Result<Option<Event>, Error> {
        self.skip_whitespace();
        let Some(byte) = self.peek() else {
            return if self.stack.is_empty() && self.expect == Expect::End {
                Ok(None)
            } else {
                Err(Error::syntax(self.pos, "unexpected end of input"))
            };
        };

        match self.expect {
            Expect::Value => self.scan_value(byte).map(Some),
            Expect::KeyOrEnd => {
                if byte == b'}' {
                    self.close(Frame::Object).map(Some)
                } else {
                    self.scan_key(byte).map(Some)
                }
            }
            Expect::Key => self.scan_key(byte).map(Some),
            Expect::Colon => {
                if byte == b':' {
                    self.pos += 1;
                    self.expect = Expect::Value;
                    self.next_event()
                } else {
                    Err(Error::syntax(self.pos, "expected `:` after property name"))
                }
            }
            Expect::CommaOrEnd => match (byte, self.stack.last()) {
                (b',', Some(Frame::Object)) => {
                    self.pos += 1;
                    self.expect = Expect::Key;
                    self.next_event()
                }
                (b',', Some(Frame::Array)) => {
                    self.pos += 1;
                    self.expect = Expect::Value;
                    self.next_event()
                }
                (b'}', Some(Frame::Object)) => self.close(Frame::Object).map(Some),
                (b']', Some(Frame::Array)) => self.close(Frame::Array).map(Some),
                _ => Err(Error::syntax(self.pos, "expected `,` or closing bracket")),
            },
            Expect::End => Err(Error::syntax(self.pos, "trailing characters after value")),
        }
    }

    fn scan_value(&mut self, byte: u8) -> Result<Event, Error> {
        match byte {
            b'{' => {
                let offset = self.pos;
                self.pos += 1;
                self.stack.push(Frame::Object);
                self.expect = Expect::KeyOrEnd;
                Ok(Event::ObjectBegin { offset })
            }
            b'[' => {
                let offset = self.pos;
                self.pos += 1;
                self.stack.push(Frame::Array);
                self.expect = Expect::Value;
                Ok(Event::ArrayBegin { offset })
            }
            b']' if self.stack.last() == Some(&Frame::Array) => {
                // Empty array.
                self.close(Frame::Array)
            }
            b'"' => {
                let (value, offset, end) = self.scan_string()?;
                self.after_value();
                Ok(Event::String { value, offset, end })
            }
            b'/' => Err(Error::syntax(self.pos, "comments are not allowed")),
            _ => {
                let (offset, end) = self.scan_scalar()?;
                self.after_value();
                Ok(Event::Scalar { offset, end })
            }
        }
    }

    fn scan_key(&mut self, byte: u8) -> Result<Event, Error> {
        if byte != b'"' {
            return Err(Error::syntax(self.pos, "expected property name"));
        }
        let (name, offset, end) = self.scan_string()?;
        self.expect = Expect::Colon;
        Ok(Event::Property { name, offset, end })
    }

    fn close(&mut self, frame: Frame) -> Result<Event, Error> {
        let offset = self.pos;
        if self.stack.pop() != Some(frame) {
            return Err(Error::syntax(offset, "mismatched closing bracket"));
        }
        self.pos += 1;
        self.after_value();
        Ok(match frame {
            Frame::Object => Event::ObjectEnd { offset },
            Frame::Array => Event::ArrayEnd { offset },
        })
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::End
        } else {
            Expect::CommaOrEnd
        };
    }

    /// Lexes the string starting at the current `"`. Returns the decoded
    /// content, the offset of the opening quote, and the offset just past
    /// the closing quote.
    fn scan_string(&mut self) -> Result<(RawText, usize, usize), Error> {
        let quote = self.pos;
        let bytes = self.doc.as_bytes();
        let mut at = quote + 1;
        while at < bytes.len() {
            match bytes[at] {
                b'\\' => at += 2,
                b'"' => {
                    let content = &self.doc[quote + 1..at];
                    let value = RawText::decode(content, quote + 1, self.decoder);
                    self.pos = at + 1;
                    return Ok((value, quote, at + 1));
                }
                _ => at += 1,
            }
        }
        Err(Error::syntax(quote, "unterminated string"))
    }

    fn scan_scalar(&mut self) -> Result<(usize, usize), Error> {
        let offset = self.pos;
        let rest = &self.doc[offset..];
        for keyword in ["true", "false", "null"] {
            if rest.starts_with(keyword) {
                self.pos += keyword.len();
                return Ok((offset, self.pos));
            }
        }
        let bytes = self.doc.as_bytes();
        let mut at = offset;
        if at < bytes.len() && bytes[at] == b'-' {
            at += 1;
        }
        let digits_start = at;
        while at < bytes.len()
            && matches!(bytes[at], b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
        {
            at += 1;
        }
        if at == digits_start {
            return Err(Error::syntax(offset, "unexpected character"));
        }
        self.pos = at;
        Ok((offset, at))
    }

    fn peek(&self) -> Option<u8> {
        self.doc.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.doc.as_bytes();
        while self.pos < bytes.len()
            && matches!(bytes[self.pos], b' ' | b'\t' | b'\n' | b'\r')
        {
            self.pos += 1;
        }
    }
}
