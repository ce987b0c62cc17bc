//! Position mapping between raw (as-written) and parsed (escape-resolved)
//! forms of a JSON string value.
//!
//! Diagnostics and decorations must be anchored to the literal file text,
//! while the recursive bracket and quote logic is simplest over the decoded
//! value. A [`RawText`] carries both forms plus a per-byte offset table, so a
//! match found in parsed coordinates translates back to the exact raw bytes
//! that produced it, even when `\n`, `\uXXXX`, or surrogate pairs change the
//! length between the two forms.
//!
//! All offsets are byte offsets. `positions` holds one entry per parsed byte
//! (the raw offset where the containing character starts) plus a final entry
//! equal to the raw length, so slicing at char boundaries is exact.

use crate::ast::Span;

/// One decoded escape group: the character it stands for and how many raw
/// bytes it occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEscape {
    pub value: char,
    pub raw_len: usize,
}

/// Strategy for interpreting backslash-escape groups in raw text.
///
/// The escape grammar is deliberately not hard-coded into the offset table
/// construction: `\uXXXX` is six raw bytes today, but the decoder is the only
/// place that knows it.
pub trait EscapeDecoder {
    /// The character that introduces an escape group.
    fn introducer(&self) -> char {
        '\\'
    }

    /// Decodes the escape group at the start of `raw` (which begins with the
    /// introducer). Total: malformed groups decode leniently rather than
    /// failing, so a single bad escape cannot abort a document parse.
    fn decode(&self, raw: &str) -> DecodedEscape;
}

/// The JSON string escape grammar: `\" \\ \/ \b \f \n \r \t` and `\uXXXX`,
/// with UTF-16 surrogate pairs combined into one character.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEscapes;

impl EscapeDecoder for JsonEscapes {
    fn decode(&self, raw: &str) -> DecodedEscape {
        let mut chars = raw.chars();
        let introducer = chars.next().expect("escape group is non-empty");
        let Some(marker) = chars.next() else {
            // Lone trailing backslash: keep it as written.
            return DecodedEscape {
                value: introducer,
                raw_len: introducer.len_utf8(),
            };
        };
        let simple = |value: char| DecodedEscape { value, raw_len: 2 };
        match marker {
            '"' => simple('"'),
            '\\' => simple('\\'),
            '/' => simple('/'),
            'b' => simple('\u{0008}'),
            'f' => simple('\u{000C}'),
            'n' => simple('\n'),
            'r' => simple('\r'),
            't' => simple('\t'),
            'u' => decode_unicode(raw),
            // Unknown escapes decode to the escaped character itself.
            other => DecodedEscape {
                value: other,
                raw_len: 1 + other.len_utf8(),
            },
        }
    }
}

/// Decodes `\uXXXX` (6 raw bytes), pairing a high surrogate with a following
/// `\uXXXX` low surrogate (12 raw bytes). Malformed groups fall back to the
/// replacement character over the bytes that were recognizably consumed.
fn decode_unicode(raw: &str) -> DecodedEscape {
    let lenient = DecodedEscape {
        value: 'u',
        raw_len: 2,
    };
    let Some(first) = hex4(raw, 2) else {
        return lenient;
    };
    if (0xD800..0xDC00).contains(&first) {
        // High surrogate: look for the paired low surrogate.
        if raw.len() >= 12 && &raw[6..8] == "\\u" {
            if let Some(second) = hex4(raw, 8) {
                if (0xDC00..0xE000).contains(&second) {
                    let combined =
                        0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                    if let Some(value) = char::from_u32(combined) {
                        return DecodedEscape {
                            value,
                            raw_len: 12,
                        };
                    }
                }
            }
        }
        // Unpaired surrogate: not representable as a char.
        return DecodedEscape {
            value: char::REPLACEMENT_CHARACTER,
            raw_len: 6,
        };
    }
    match char::from_u32(first) {
        Some(value) => DecodedEscape { value, raw_len: 6 },
        None => DecodedEscape {
            value: char::REPLACEMENT_CHARACTER,
            raw_len: 6,
        },
    }
}

fn hex4(raw: &str, at: usize) -> Option<u32> {
    raw.get(at..at + 4)
        .and_then(|digits| u32::from_str_radix(digits, 16).ok())
}

/// A string value in both its raw and parsed forms, with the offset table
/// linking them and the document offset of the raw form's first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    raw: String,
    parsed: String,
    positions: Vec<usize>,
    offset: usize,
}

impl RawText {
    /// Decodes `raw` (the exact source bytes, without any surrounding
    /// delimiters) starting at document offset `offset`.
    pub fn decode(raw: &str, offset: usize, decoder: &dyn EscapeDecoder) -> RawText {
        let introducer = decoder.introducer();
        let mut parsed = String::with_capacity(raw.len());
        let mut positions = Vec::with_capacity(raw.len() + 1);
        let mut at = 0;
        while at < raw.len() {
            let rest = &raw[at..];
            let next = rest.chars().next().expect("at is a char boundary");
            let (value, consumed) = if next == introducer {
                let escape = decoder.decode(rest);
                (escape.value, escape.raw_len)
            } else {
                (next, next.len_utf8())
            };
            parsed.push(value);
            for _ in 0..value.len_utf8() {
                positions.push(at);
            }
            at += consumed;
        }
        positions.push(raw.len());
        RawText {
            raw: raw.to_string(),
            parsed,
            positions,
            offset,
        }
    }

    /// Wraps text that contains no escapes: raw and parsed forms coincide.
    pub fn plain(text: &str, offset: usize) -> RawText {
        RawText {
            raw: text.to_string(),
            parsed: text.to_string(),
            positions: (0..=text.len()).collect(),
            offset,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> &str {
        &self.parsed
    }

    /// Document offset of the first raw byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Document offset corresponding to the parsed byte index.
    pub fn raw_offset(&self, parsed_index: usize) -> usize {
        self.offset + self.positions[parsed_index]
    }

    /// Translates a parsed-coordinate range into a raw-source span.
    pub fn raw_span(&self, parsed_start: usize, parsed_end: usize) -> Span {
        Span::new(self.raw_offset(parsed_start), self.raw_offset(parsed_end))
    }

    /// The span of the entire value in raw-source coordinates.
    pub fn full_span(&self) -> Span {
        Span::new(self.offset, self.offset + self.raw.len())
    }

    /// Extracts the sub-text for a parsed byte range, preserving raw offsets.
    ///
    /// Both indices must lie on parsed char boundaries, which holds for any
    /// index obtained by scanning `parsed()`.
    pub fn slice(&self, parsed_start: usize, parsed_end: usize) -> RawText {
        let raw_start = self.positions[parsed_start];
        let raw_end = self.positions[parsed_end];
        let positions = self.positions[parsed_start..=parsed_end]
            .iter()
            .map(|position| position - raw_start)
            .collect();
        RawText {
            raw: self.raw[raw_start..raw_end].to_string(),
            parsed: self.parsed[parsed_start..parsed_end].to_string(),
            positions,
            offset: self.offset + raw_start,
        }
    }
}
