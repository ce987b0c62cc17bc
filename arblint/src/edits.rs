//! Edit-point synthesis for diagnostic fixes.
//!
//! Collaborators (editors, fix-it tooling) turn `missing_metadata_for_key`
//! and `placeholder_without_metadata` findings into insertions. The functions
//! here compute where and what to insert, using the edit anchors the walker
//! recorded (`end_of_message`, `metadata_end`, `last_placeholder_end`,
//! `object_end`) and the document's inferred indentation. Applying the
//! returned edit to the source document yields syntactically valid JSON.

use crate::ast::{MessageEntry, MessageList, MetadataEntry};

/// A single insertion into the raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Raw byte offset the text is inserted at.
    pub offset: usize,
    pub text: String,
}

impl TextEdit {
    /// Returns `document` with the edit applied.
    pub fn apply(&self, document: &str) -> String {
        let mut edited = String::with_capacity(document.len() + self.text.len());
        edited.push_str(&document[..self.offset]);
        edited.push_str(&self.text);
        edited.push_str(&document[self.offset..]);
        edited
    }
}

/// Synthesizes an empty metadata block for a message without one, inserted
/// right after the message value:
///
/// ```json
/// "title": "Hello",
/// "@title": {}
/// ```
///
/// Returns `None` when the entry carries no end-of-message anchor (the value
/// never finished parsing).
pub fn metadata_block(list: &MessageList, entry: &MessageEntry) -> Option<TextEdit> {
    let offset = entry.key.end_of_message?;
    let text = format!(",\n{}\"@{}\": {{}}", list.get_indent(1), entry.key.value);
    Some(TextEdit { offset, text })
}

/// Synthesizes a placeholder declaration for `name` inside `entry`'s
/// metadata. Inserts after the last declared placeholder when a
/// `placeholders` object exists, otherwise inserts a whole `placeholders`
/// block before the metadata object's closing brace. `document` is the raw
/// source the list was parsed from; it decides whether a separating comma is
/// required.
pub fn placeholder_entry(
    list: &MessageList,
    document: &str,
    entry: &MetadataEntry,
    name: &str,
) -> TextEdit {
    let metadata = &entry.metadata;

    // After the last placeholder's own object, when there is one.
    if let Some(after) = metadata.placeholders.last().and_then(|p| p.object_end) {
        return TextEdit {
            offset: after,
            text: format!(",\n{}\"{}\": {{}}", list.get_indent(3), name),
        };
    }

    if let Some(close) = metadata.last_placeholder_end {
        let text = if needs_comma(document, close) {
            format!(",\n{}\"{}\": {{}}", list.get_indent(3), name)
        } else {
            format!("\"{}\": {{}}", name)
        };
        return TextEdit {
            offset: close,
            text,
        };
    }

    // No placeholders object at all: create one at the end of the metadata
    // object.
    let close = metadata.metadata_end;
    let block = format!(
        "\"placeholders\": {{\n{}\"{}\": {{}}\n{}}}",
        list.get_indent(3),
        name,
        list.get_indent(2),
    );
    let text = if needs_comma(document, close) {
        format!(",\n{}{}", list.get_indent(2), block)
    } else {
        block
    };
    TextEdit {
        offset: close,
        text,
    }
}

// An insertion just before a closing brace needs a leading comma unless the
// object is empty, i.e. the last non-whitespace byte before the brace is the
// opening brace.
fn needs_comma(document: &str, close: usize) -> bool {
    document[..close].trim_end().as_bytes().last() != Some(&b'{')
}
