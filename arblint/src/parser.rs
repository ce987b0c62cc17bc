//! Document walking and message tree building.
//!
//! The walker drives the JSON event stream through an explicit state struct,
//! building one message AST per top-level string value and one metadata
//! record per `@`-prefixed key. A structural error in a single message
//! (unbalanced quotes or brackets) becomes a located error literal and the
//! walk continues with the next key; a document-level JSON syntax error ends
//! the walk but keeps everything parsed so far. `parse` never fails.

use crate::ast::{
    CombinedMessage, ComplexMessage, Key, Literal, Message, MessageEntry, MessageList, Metadata,
    MetadataEntry, PlaceholderMetadata,
};
use crate::brackets::{self, BracketToken};
use crate::error::Error;
use crate::escape;
use crate::json::{Event, Scanner};
use crate::rawtext::RawText;

/// Knobs the caller's `l10n.yaml` can set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Honor the ICU single-quote escaping convention. When disabled, quotes
    /// are plain text and every bracket is structural.
    pub use_escaping: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { use_escaping: true }
    }
}

/// Parses ARB documents into [`MessageList`] registries.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

/// Mutable cursor state for one walk of the event stream.
#[derive(Debug, Default)]
struct WalkState {
    nesting: usize,
    in_template_tag: bool,
    in_locale_tag: bool,
    placeholder_level: Option<usize>,
    metadata_level: Option<usize>,
    metadata_key: Option<Key>,
    message_key: Option<Key>,
    defined_placeholders: Vec<PlaceholderMetadata>,
    total_placeholder_end: Option<usize>,
    indentation_seen: bool,
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Parser { options }
    }

    /// Parses a complete document. Returns the registry plus the structural
    /// parse errors, each a located literal whose value is the error text.
    pub fn parse(&self, document: &str) -> (MessageList, Vec<Literal>) {
        let mut list = MessageList {
            indentation_character: ' ',
            ..MessageList::default()
        };
        let mut errors = Vec::new();
        let mut state = WalkState::default();
        let mut scanner = Scanner::new(document);

        loop {
            match scanner.next_event() {
                Ok(Some(event)) => {
                    self.handle(event, document, &mut state, &mut list, &mut errors)
                }
                Ok(None) => break,
                Err(error) => {
                    let at = match &error {
                        Error::Syntax { offset, .. } => *offset,
                        _ => scanner.offset(),
                    };
                    let end = (at + 1).min(document.len()).max(at);
                    errors.push(Literal::new(error.to_string(), at, end));
                    break;
                }
            }
        }

        (list, errors)
    }

    fn handle(
        &self,
        event: Event,
        document: &str,
        state: &mut WalkState,
        list: &mut MessageList,
        errors: &mut Vec<Literal>,
    ) {
        match event {
            Event::ObjectBegin { .. } | Event::ArrayBegin { .. } => {
                state.nesting += 1;
                state.in_template_tag = false;
                state.in_locale_tag = false;
            }
            Event::Property { name, offset, .. } => {
                self.handle_property(&name, offset, document, state, list);
            }
            Event::String { value, .. } => {
                self.handle_string(&value, state, list, errors);
            }
            Event::Scalar { .. } => {
                // A non-string value cannot be a message, a template path,
                // or a locale.
                state.in_template_tag = false;
                state.in_locale_tag = false;
            }
            Event::ArrayEnd { .. } => {
                state.nesting -= 1;
            }
            Event::ObjectEnd { offset } => {
                self.handle_object_end(offset, state, list);
            }
        }
    }

    fn handle_property(
        &self,
        name: &RawText,
        offset: usize,
        document: &str,
        state: &mut WalkState,
        list: &mut MessageList,
    ) {
        let key = Key {
            value: name.parsed().to_string(),
            span: name.full_span(),
            end_of_message: None,
        };

        if state.placeholder_level == Some(state.nesting - 1) {
            state.defined_placeholders.push(PlaceholderMetadata::new(
                name.parsed(),
                key.span.start,
                key.span.end,
            ));
        }

        if state.nesting == 1 {
            if !state.indentation_seen {
                let (count, character) = infer_indentation(document, offset);
                list.indentation_count = count;
                list.indentation_character = character;
                state.indentation_seen = true;
            }
            if let Some(rest) = key.value.strip_prefix('@') {
                state.message_key = None;
                if rest.starts_with('@') {
                    match key.value.as_str() {
                        "@@x-template" => state.in_template_tag = true,
                        "@@locale" => state.in_locale_tag = true,
                        _ => {}
                    }
                } else {
                    state.metadata_key = Some(key.clone());
                    state.metadata_level = Some(state.nesting);
                }
            } else {
                state.message_key = Some(key.clone());
            }
        }

        if state.metadata_level == Some(state.nesting - 1) && key.value == "placeholders" {
            state.placeholder_level = Some(state.nesting);
        }
    }

    fn handle_string(
        &self,
        value: &RawText,
        state: &mut WalkState,
        list: &mut MessageList,
        errors: &mut Vec<Literal>,
    ) {
        if state.in_template_tag {
            list.template_path = Some(value.parsed().to_string());
            state.in_template_tag = false;
            return;
        }
        if state.in_locale_tag {
            list.locale = Some(value.parsed().to_string());
            state.in_locale_tag = false;
            return;
        }
        if state.nesting != 1 {
            return;
        }
        let Some(mut key) = state.message_key.take() else {
            return;
        };
        key.end_of_message = Some(value.full_span().end + 1);
        match build_message(value, false, self.options.use_escaping) {
            Ok(message) => list.message_entries.push(MessageEntry { key, message }),
            Err(error) => {
                let span = value.full_span();
                errors.push(Literal::new(error.to_string(), span.start, span.end));
            }
        }
    }

    fn handle_object_end(&self, offset: usize, state: &mut WalkState, list: &mut MessageList) {
        state.nesting -= 1;
        if let Some(placeholder_level) = state.placeholder_level {
            if state.nesting == placeholder_level + 1 {
                if let Some(last) = state.defined_placeholders.last_mut() {
                    last.object_end = Some(offset + 1);
                }
            }
            if state.nesting == placeholder_level {
                state.total_placeholder_end = Some(offset);
            }
        }
        if let Some(metadata_level) = state.metadata_level {
            if state.nesting <= metadata_level {
                if let Some(key) = state.metadata_key.take() {
                    list.metadata_entries.push(MetadataEntry {
                        key,
                        metadata: Metadata {
                            placeholders: std::mem::take(&mut state.defined_placeholders),
                            metadata_end: offset,
                            last_placeholder_end: state.total_placeholder_end.take(),
                        },
                    });
                }
                state.metadata_level = None;
                state.placeholder_level = None;
            }
        }
    }
}

/// Builds the message tree for one string value.
///
/// `expect_placeholder` is true when `text` came from inside a brace pair, so
/// bracket-free content is a bare `{name}` reference rather than plain text.
fn build_message(
    text: &RawText,
    expect_placeholder: bool,
    use_escaping: bool,
) -> Result<Message, Error> {
    let regions = escape::unescaped_regions(text.parsed(), use_escaping)?;
    let tokens = brackets::match_curly_brackets(text.parsed(), &regions)?;

    if tokens.is_empty() {
        let literal = Literal {
            value: text.parsed().to_string(),
            span: text.full_span(),
        };
        return Ok(if expect_placeholder {
            Message::Placeholder(literal)
        } else {
            Message::Literal(literal)
        });
    }

    let mut parts = Vec::new();
    for token in tokens {
        match token {
            BracketToken::Outside { start, end } => {
                parts.push(build_message(&text.slice(start, end), false, use_escaping)?);
            }
            BracketToken::Content { start, end } => {
                let content = text.slice(start, end);
                let content_regions =
                    escape::unescaped_regions(content.parsed(), use_escaping)?;
                let commas = brackets::top_level_commas(content.parsed(), &content_regions);
                if commas.is_empty() {
                    parts.push(build_message(&content, true, use_escaping)?);
                } else {
                    parts.push(Message::Complex(build_complex(
                        text,
                        start,
                        end,
                        &content,
                        &commas,
                        use_escaping,
                    )?));
                }
            }
        }
    }

    if parts.len() == 1 {
        Ok(parts.remove(0))
    } else {
        Ok(Message::Combined(CombinedMessage {
            span: text.full_span(),
            parts,
        }))
    }
}

/// Parses one `{arg, type, label{...} ...}` construct. `content` is the text
/// between the braces; `content_start`/`content_end` are its parsed-coordinate
/// bounds within `parent`, used to span the construct including both braces.
fn build_complex(
    parent: &RawText,
    content_start: usize,
    content_end: usize,
    content: &RawText,
    commas: &[usize],
    use_escaping: bool,
) -> Result<ComplexMessage, Error> {
    let parsed = content.parsed();
    let first_comma = commas[0];
    let argument = Literal {
        value: parsed[..first_comma].to_string(),
        span: content.raw_span(0, first_comma),
    };

    let type_limit = commas.get(1).copied().unwrap_or(parsed.len());
    let (type_start, type_end) = trim_spaces(parsed, first_comma + 1, type_limit);
    let complex_type = Literal {
        value: parsed[type_start..type_end].to_string(),
        span: content.raw_span(type_start, type_end),
    };

    let mut arms = Vec::new();
    if let Some(&second_comma) = commas.get(1) {
        let regions = escape::unescaped_regions(parsed, use_escaping)?;
        let tokens = brackets::match_curly_brackets(parsed, &regions)?;
        let mut cursor = second_comma + 1;
        for token in tokens {
            if let BracketToken::Content { start, end } = token {
                // Brace groups inside the argument or type segment are not
                // case arms.
                if start == 0 || start - 1 < cursor {
                    continue;
                }
                let (label_start, label_end) = trim_spaces(parsed, cursor, start - 1);
                let label = Literal {
                    value: parsed[label_start..label_end].to_string(),
                    span: content.raw_span(label_start, label_end),
                };
                let body = build_message(&content.slice(start, end), false, use_escaping)?;
                arms.push((label, body));
                cursor = end + 1;
            }
        }
    }

    Ok(ComplexMessage {
        span: parent.raw_span(content_start - 1, content_end + 1),
        argument,
        complex_type,
        arms,
    })
}

/// Narrows `[start, end)` past surrounding spaces, the way case labels and
/// the complex type are written with breathing room around commas.
fn trim_spaces(text: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let limit = bytes.len();
    start = start.min(limit);
    end = end.clamp(start, limit);
    while start < end && bytes[start] == b' ' {
        start += 1;
    }
    while end > start && bytes[end - 1] == b' ' {
        end -= 1;
    }
    (start, end)
}

/// Indentation style of the first top-level property: how many copies of
/// which character sit between the line start and the opening quote.
fn infer_indentation(document: &str, quote_offset: usize) -> (usize, char) {
    let line_start = document[..quote_offset]
        .rfind('\n')
        .map(|index| index + 1)
        .unwrap_or(0);
    let count = quote_offset - line_start;
    if count == 0 {
        return (0, ' ');
    }
    let character = document.as_bytes()[quote_offset - 1] as char;
    if character == ' ' || character == '\t' {
        (count, character)
    } else {
        (0, ' ')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, Span};

    fn parse(document: &str) -> (MessageList, Vec<Literal>) {
        Parser::new().parse(document)
    }

    #[test]
    fn test_plain_message_is_literal() {
        let doc = r#"{"appName": "Demo app"}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        assert_eq!(list.message_entries.len(), 1);
        let entry = &list.message_entries[0];
        assert_eq!(entry.key.value, "appName");
        match &entry.message {
            Message::Literal(literal) => {
                assert_eq!(literal.value, "Demo app");
                assert_eq!(&doc[literal.span.start..literal.span.end], "Demo app");
            }
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_message_is_combined() {
        let doc = r#"{"greeting": "Hi {name}!"}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        match &list.message_entries[0].message {
            Message::Combined(combined) => {
                assert_eq!(combined.parts.len(), 3);
                match &combined.parts[1] {
                    Message::Placeholder(placeholder) => {
                        assert_eq!(placeholder.value, "name");
                        assert_eq!(
                            &doc[placeholder.span.start..placeholder.span.end],
                            "name"
                        );
                    }
                    other => panic!("expected placeholder, got {other:?}"),
                }
            }
            other => panic!("expected combined, got {other:?}"),
        }
    }

    #[test]
    fn test_single_placeholder_collapses() {
        let (list, errors) = parse(r#"{"who": "{name}"}"#);
        assert!(errors.is_empty());
        assert!(matches!(
            &list.message_entries[0].message,
            Message::Placeholder(p) if p.value == "name"
        ));
    }

    #[test]
    fn test_plural_message() {
        let doc = r#"{"count": "{n, plural, one{1 item} other{{n} items}}"}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        match &list.message_entries[0].message {
            Message::Complex(complex) => {
                assert_eq!(complex.argument.value, "n");
                assert_eq!(complex.complex_type.value, "plural");
                let labels: Vec<&str> =
                    complex.arms.iter().map(|(l, _)| l.value.as_str()).collect();
                assert_eq!(labels, vec!["one", "other"]);
                assert_eq!(
                    &doc[complex.span.start..complex.span.end],
                    "{n, plural, one{1 item} other{{n} items}}"
                );
                match complex.arm("other").unwrap() {
                    Message::Combined(combined) => assert_eq!(combined.parts.len(), 2),
                    other => panic!("expected combined arm, got {other:?}"),
                }
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_bracket_is_isolated() {
        let doc = r#"{"bad": "oops {name", "good": "fine"}"#;
        let (list, errors) = parse(doc);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].value.contains("Unbalanced curly bracket"));
        assert_eq!(&doc[errors[0].span.start..errors[0].span.end], "oops {name");
        assert_eq!(list.message_entries.len(), 1);
        assert_eq!(list.message_entries[0].key.value, "good");
    }

    #[test]
    fn test_unbalanced_quote_is_isolated() {
        let doc = r#"{"bad": "don't", "good": "fine"}"#;
        let (list, errors) = parse(doc);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].value.contains("Unbalanced escape quotes"));
        assert_eq!(list.message_entries.len(), 1);
    }

    #[test]
    fn test_escaped_brackets_stay_text() {
        let (list, errors) = parse(r#"{"m": "literal '{' brace"}"#);
        assert!(errors.is_empty());
        assert!(matches!(&list.message_entries[0].message, Message::Literal(_)));
    }

    #[test]
    fn test_metadata_entry_and_placeholders() {
        let doc = r#"{
  "greeting": "Hi {name}!",
  "@greeting": {
    "placeholders": {
      "name": {}
    }
  }
}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        assert_eq!(list.message_entries.len(), 1);
        assert_eq!(list.metadata_entries.len(), 1);
        let metadata = &list.metadata_entries[0].metadata;
        assert_eq!(metadata.placeholders.len(), 1);
        let placeholder = &metadata.placeholders[0];
        assert_eq!(placeholder.value, "name");
        assert_eq!(
            &doc[placeholder.span.start..placeholder.span.end],
            "name"
        );
        // object_end sits just past the placeholder's `{}` value.
        let object_end = placeholder.object_end.unwrap();
        assert_eq!(&doc[object_end - 2..object_end], "{}");
        // last_placeholder_end is the closing brace of `placeholders`.
        let last = metadata.last_placeholder_end.unwrap();
        assert_eq!(doc.as_bytes()[last], b'}');
        assert!(last > object_end);
        assert_eq!(doc.as_bytes()[metadata.metadata_end], b'}');
        assert!(metadata.metadata_end > last);
    }

    #[test]
    fn test_global_metadata() {
        let doc = r#"{"@@locale": "en", "@@x-template": "app_en.arb", "m": "x"}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        assert_eq!(list.locale.as_deref(), Some("en"));
        assert_eq!(list.template_path.as_deref(), Some("app_en.arb"));
        assert_eq!(list.message_entries.len(), 1);
        assert!(list.metadata_entries.is_empty());
    }

    #[test]
    fn test_end_of_message_points_past_value() {
        let doc = r#"{"m": "x", "n": "y"}"#;
        let (list, _) = parse(doc);
        let end = list.message_entries[0].key.end_of_message.unwrap();
        // Just past the closing quote of "x".
        assert_eq!(&doc[..end], r#"{"m": "x""#);
    }

    #[test]
    fn test_indentation_inferred_from_first_property() {
        let doc = "{\n\t\"a\": \"x\"\n}";
        let (list, _) = parse(doc);
        assert_eq!(list.indentation_count, 1);
        assert_eq!(list.indentation_character, '\t');
        assert_eq!(list.get_indent(2), "\t\t");
    }

    #[test]
    fn test_escaped_value_offsets_stay_raw() {
        // The parsed form of the value is shorter than the raw form; the
        // placeholder span must still land on the raw source.
        let doc = r#"{"m": "a\u0041{p}"}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        let placeholders = list.get_placeholders();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(
            &doc[placeholders[0].span.start..placeholders[0].span.end],
            "p"
        );
    }

    #[test]
    fn test_json_syntax_error_keeps_earlier_entries() {
        let doc = r#"{"a": "x", "b" "y"}"#;
        let (list, errors) = parse(doc);
        assert_eq!(list.message_entries.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].value.contains("Invalid JSON syntax"));
    }

    #[test]
    fn test_duplicate_keys_are_kept_in_order() {
        let doc = r#"{"m": "first", "m": "second"}"#;
        let (list, _) = parse(doc);
        assert_eq!(list.message_entries.len(), 2);
        let hit = list.get_message_at(list.message_entries[0].message.span().start);
        assert!(matches!(hit, Some(Node::Literal(l)) if l.value == "first"));
    }

    #[test]
    fn test_escaping_disabled() {
        let parser = Parser::with_options(ParseOptions {
            use_escaping: false,
        });
        let (list, errors) = parser.parse(r#"{"m": "don't {p}"}"#);
        assert!(errors.is_empty());
        assert_eq!(list.get_placeholders().len(), 1);
    }

    #[test]
    fn test_missing_second_comma_yields_empty_arms() {
        let (list, errors) = parse(r#"{"m": "{n, plural}"}"#);
        assert!(errors.is_empty());
        match &list.message_entries[0].message {
            Message::Complex(complex) => {
                assert_eq!(complex.complex_type.value, "plural");
                assert!(complex.arms.is_empty());
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }

    #[test]
    fn test_select_with_spaced_labels() {
        let doc = r#"{"v": "{kind, select, sedan{Sedan} truck{16 wheel truck} other{Other}}"}"#;
        let (list, errors) = parse(doc);
        assert!(errors.is_empty());
        match &list.message_entries[0].message {
            Message::Complex(complex) => {
                let labels: Vec<(&str, Span)> = complex
                    .arms
                    .iter()
                    .map(|(l, _)| (l.value.as_str(), l.span))
                    .collect();
                assert_eq!(labels.len(), 3);
                for (value, span) in labels {
                    assert_eq!(&doc[span.start..span.end], value);
                }
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }
}
