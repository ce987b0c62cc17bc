//! The message AST and the per-document registry built from it.
//!
//! Message variants form a closed enum over a shared [`Span`]; code switches
//! on the variant instead of downcasting. Nodes carry no parent links;
//! upward resolution goes through [`MessageList::entry_at`], which locates
//! the enclosing entry directly. All spans are raw-source byte offsets into
//! the original document text.

use serde::Serialize;
use unic_langid::LanguageIdentifier;

/// A half-open-ish source range; `contains` is inclusive at both ends so a
/// cursor sitting just after the last character still hits the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// A contiguous run of plain text, a case label, or a placeholder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub span: Span,
}

impl Literal {
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Literal {
            value: value.into(),
            span: Span::new(start, end),
        }
    }
}

/// An object property name. `end_of_message` is the offset just past the
/// key's JSON value, the safe insertion point for synthesized metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub value: String,
    pub span: Span,
    pub end_of_message: Option<usize>,
}

impl Key {
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Key {
            value: value.into(),
            span: Span::new(start, end),
            end_of_message: None,
        }
    }
}

/// One parsed ICU message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Plain text.
    Literal(Literal),
    /// A `{name}` interpolation; the span covers the name without braces.
    Placeholder(Literal),
    /// Two or more top-level parts in source order.
    Combined(CombinedMessage),
    /// A `{arg, plural|select|gender, case{...}...}` construct.
    Complex(ComplexMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedMessage {
    pub span: Span,
    pub parts: Vec<Message>,
}

/// The span covers the whole construct including both braces. `arms`
/// preserves source order; keys are the case labels (`zero`, `one`, `other`,
/// and so on). `complex_type` is free text here; the grammar restriction to
/// `plural`/`select`/`gender` is the validator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexMessage {
    pub span: Span,
    pub argument: Literal,
    pub complex_type: Literal,
    pub arms: Vec<(Literal, Message)>,
}

impl ComplexMessage {
    pub fn arm(&self, label: &str) -> Option<&Message> {
        self.arms
            .iter()
            .find(|(key, _)| key.value == label)
            .map(|(_, message)| message)
    }
}

/// A reference to the most specific node containing some offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Key(&'a Key),
    Literal(&'a Literal),
    Placeholder(&'a Literal),
    Combined(&'a CombinedMessage),
    Complex(&'a ComplexMessage),
    PlaceholderMetadata(&'a PlaceholderMetadata),
}

impl<'a> Node<'a> {
    pub fn span(&self) -> Span {
        match self {
            Node::Key(key) => key.span,
            Node::Literal(literal) | Node::Placeholder(literal) => literal.span,
            Node::Combined(combined) => combined.span,
            Node::Complex(complex) => complex.span,
            Node::PlaceholderMetadata(placeholder) => placeholder.span,
        }
    }

    /// True for nodes whose surrounding context is plain string text, which
    /// is what completion providers key off.
    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }
}

impl Message {
    pub fn span(&self) -> Span {
        match self {
            Message::Literal(literal) | Message::Placeholder(literal) => literal.span,
            Message::Combined(combined) => combined.span,
            Message::Complex(complex) => complex.span,
        }
    }

    /// All placeholder literals referenced by this message, in source order.
    /// A complex message's argument counts as a placeholder reference.
    pub fn placeholders(&self) -> Vec<&Literal> {
        match self {
            Message::Literal(_) => Vec::new(),
            Message::Placeholder(literal) => vec![literal],
            Message::Combined(combined) => combined
                .parts
                .iter()
                .flat_map(|part| part.placeholders())
                .collect(),
            Message::Complex(complex) => {
                let mut found = vec![&complex.argument];
                for (_, message) in &complex.arms {
                    found.extend(message.placeholders());
                }
                found
            }
        }
    }

    /// The deepest node containing `offset`, or `None` when out of range.
    /// Branch nodes fall back to themselves when no child matches.
    pub fn where_is(&self, offset: usize) -> Option<Node<'_>> {
        match self {
            Message::Literal(literal) => literal
                .span
                .contains(offset)
                .then_some(Node::Literal(literal)),
            Message::Placeholder(literal) => literal
                .span
                .contains(offset)
                .then_some(Node::Placeholder(literal)),
            Message::Combined(combined) => {
                if !combined.span.contains(offset) {
                    return None;
                }
                combined
                    .parts
                    .iter()
                    .find_map(|part| part.where_is(offset))
                    .or(Some(Node::Combined(combined)))
            }
            Message::Complex(complex) => {
                if !complex.span.contains(offset) {
                    return None;
                }
                if complex.argument.span.contains(offset) {
                    return Some(Node::Placeholder(&complex.argument));
                }
                if complex.complex_type.span.contains(offset) {
                    return Some(Node::Literal(&complex.complex_type));
                }
                complex
                    .arms
                    .iter()
                    .find_map(|(label, message)| {
                        if label.span.contains(offset) {
                            Some(Node::Literal(label))
                        } else {
                            message.where_is(offset)
                        }
                    })
                    .or(Some(Node::Complex(complex)))
            }
        }
    }
}

/// A declared placeholder name inside a metadata block's `placeholders`
/// object. `object_end` is the offset just past its own `{}` value, used when
/// inserting a sibling declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMetadata {
    pub value: String,
    pub span: Span,
    pub object_end: Option<usize>,
}

impl PlaceholderMetadata {
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        PlaceholderMetadata {
            value: value.into(),
            span: Span::new(start, end),
            object_end: None,
        }
    }
}

/// Companion object for a message key, matched by the name `"@" + key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub placeholders: Vec<PlaceholderMetadata>,
    /// Offset of the metadata object's closing brace.
    pub metadata_end: usize,
    /// Offset of the `placeholders` object's closing brace, when present.
    pub last_placeholder_end: Option<usize>,
}

impl Metadata {
    pub fn declares(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p.value == name)
    }

    fn where_is(&self, offset: usize) -> Option<Node<'_>> {
        self.placeholders.iter().find_map(|placeholder| {
            placeholder
                .span
                .contains(offset)
                .then_some(Node::PlaceholderMetadata(placeholder))
        })
    }
}

/// A message key paired with its parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub key: Key,
    pub message: Message,
}

/// A `@`-prefixed key paired with its metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: Key,
    pub metadata: Metadata,
}

/// One parsed document: entries, metadata, and source formatting facts.
/// Rebuilt from scratch on every parse; nothing is mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageList {
    /// Value of `@@x-template`, if present.
    pub template_path: Option<String>,
    /// Value of `@@locale`, if present.
    pub locale: Option<String>,
    /// Number of indentation characters per level, e.g. 2 spaces or 1 tab.
    pub indentation_count: usize,
    /// The indentation character, most commonly a space or a tab.
    pub indentation_character: char,
    pub message_entries: Vec<MessageEntry>,
    pub metadata_entries: Vec<MetadataEntry>,
}

impl MessageList {
    /// The `@@locale` value as a language identifier, if it parses.
    pub fn parse_locale(&self) -> Option<LanguageIdentifier> {
        self.locale.as_ref().and_then(|l| l.parse().ok())
    }

    /// All placeholder references across all message entries.
    pub fn get_placeholders(&self) -> Vec<&Literal> {
        self.message_entries
            .iter()
            .flat_map(|entry| entry.message.placeholders())
            .collect()
    }

    /// Reproduces the source indentation for `level` nesting levels.
    pub fn get_indent(&self, level: usize) -> String {
        std::iter::repeat(self.indentation_character)
            .take(self.indentation_count * level)
            .collect()
    }

    /// The most specific node containing `offset`, searching message entries
    /// first, then metadata entries. Duplicate keys resolve to the first
    /// entry in source order.
    pub fn get_message_at(&self, offset: usize) -> Option<Node<'_>> {
        for entry in &self.message_entries {
            if entry.key.span.contains(offset) {
                return Some(Node::Key(&entry.key));
            }
            if let Some(node) = entry.message.where_is(offset) {
                return Some(node);
            }
        }
        for entry in &self.metadata_entries {
            if entry.key.span.contains(offset) {
                return Some(Node::Key(&entry.key));
            }
            if let Some(node) = entry.metadata.where_is(offset) {
                return Some(node);
            }
        }
        None
    }

    /// The message entry whose key or message contains `offset`. This is the
    /// upward walk that parent back-pointers would otherwise serve.
    pub fn entry_at(&self, offset: usize) -> Option<&MessageEntry> {
        self.message_entries.iter().find(|entry| {
            entry.key.span.contains(offset) || entry.message.where_is(offset).is_some()
        })
    }

    /// The metadata entry declared for `key`, if any (`"@" + key` by name).
    pub fn metadata_for(&self, key: &str) -> Option<&MetadataEntry> {
        self.metadata_entries
            .iter()
            .find(|entry| entry.key.value.strip_prefix('@') == Some(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_complex() -> ComplexMessage {
        // "{n, plural, one{# item} other{# items}}" laid out at offset 0.
        ComplexMessage {
            span: Span::new(0, 40),
            argument: Literal::new("n", 1, 2),
            complex_type: Literal::new("plural", 4, 10),
            arms: vec![
                (
                    Literal::new("one", 12, 15),
                    Message::Literal(Literal::new("# item", 16, 22)),
                ),
                (
                    Literal::new("other", 24, 29),
                    Message::Literal(Literal::new("# items", 30, 37)),
                ),
            ],
        }
    }

    #[test]
    fn test_where_is_hits_argument() {
        let message = Message::Complex(sample_complex());
        assert_eq!(
            message.where_is(1),
            Some(Node::Placeholder(&sample_complex().argument))
        );
    }

    #[test]
    fn test_where_is_hits_arm_body() {
        let complex = sample_complex();
        let message = Message::Complex(complex.clone());
        let node = message.where_is(18).unwrap();
        assert_eq!(node.span(), Span::new(16, 22));
        assert!(node.is_literal());
    }

    #[test]
    fn test_where_is_falls_back_to_complex() {
        let message = Message::Complex(sample_complex());
        // Offset 11 is the space between type and first arm label.
        let node = message.where_is(11).unwrap();
        assert!(matches!(node, Node::Complex(_)));
    }

    #[test]
    fn test_where_is_out_of_range() {
        let message = Message::Complex(sample_complex());
        assert_eq!(message.where_is(41), None);
    }

    #[test]
    fn test_placeholders_include_complex_argument() {
        let message = Message::Complex(sample_complex());
        let names: Vec<&str> = message.placeholders().iter().map(|p| p.value.as_str()).collect();
        assert_eq!(names, vec!["n"]);
    }

    #[test]
    fn test_combined_collects_nested_placeholders() {
        let message = Message::Combined(CombinedMessage {
            span: Span::new(0, 20),
            parts: vec![
                Message::Literal(Literal::new("Hi ", 0, 3)),
                Message::Placeholder(Literal::new("name", 4, 8)),
                Message::Literal(Literal::new("!", 9, 10)),
            ],
        });
        let names: Vec<&str> = message.placeholders().iter().map(|p| p.value.as_str()).collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_get_indent() {
        let list = MessageList {
            indentation_count: 2,
            indentation_character: ' ',
            ..Default::default()
        };
        assert_eq!(list.get_indent(1), "  ");
        assert_eq!(list.get_indent(3), "      ");
    }

    #[test]
    fn test_parse_locale() {
        let list = MessageList {
            locale: Some("en-US".to_string()),
            ..Default::default()
        };
        let locale = list.parse_locale().unwrap();
        assert_eq!(locale.language.as_str(), "en");

        let bad = MessageList {
            locale: Some("definitely not a locale".to_string()),
            ..Default::default()
        };
        assert!(bad.parse_locale().is_none());
    }

    #[test]
    fn test_metadata_for_matches_at_prefix() {
        let list = MessageList {
            metadata_entries: vec![MetadataEntry {
                key: Key::new("@greeting", 0, 9),
                metadata: Metadata {
                    placeholders: vec![],
                    metadata_end: 20,
                    last_placeholder_end: None,
                },
            }],
            ..Default::default()
        };
        assert!(list.metadata_for("greeting").is_some());
        assert!(list.metadata_for("missing").is_none());
    }
}
