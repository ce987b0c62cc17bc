#![forbid(unsafe_code)]
//! Parsing and validation engine for ARB localization files.
//!
//! Parses [ARB](https://github.com/google/app-resource-bundle) documents with
//! ICU message syntax into a position-exact message tree, then validates
//! keys, placeholders, ICU structure, and metadata consistency against an
//! optional template document. Every span in the tree is a **raw byte
//! offset** into the original source, escape sequences included, so findings
//! map straight back to the text an editor displays.
//!
//! # Quick Start
//!
//! ```rust
//! use arblint::{Diagnostics, Parser};
//!
//! let source = r#"{"greeting": "Hi {name}!", "@greeting": {"placeholders": {"name": {}}}}"#;
//!
//! let (list, errors) = Parser::new().parse(source);
//! let findings = Diagnostics::new().diagnose(&list, &errors, None, source.len());
//! assert!(findings.is_empty());
//!
//! // Query the tree by raw offset, e.g. for hover or completion.
//! let node = list.get_message_at(source.find("name").unwrap()).unwrap();
//! assert_eq!(&source[node.span().start..node.span().end], "name");
//! ```
//!
//! # Design
//!
//! - Parsing never fails: malformed messages become located error values and
//!   the rest of the document still parses ([`Parser::parse`]).
//! - Findings carry stable codes ([`DiagnosticCode`]) and can be silenced
//!   per code or wholesale ([`Suppression`]).
//! - Fix insertion points for missing metadata and placeholders are
//!   synthesized from the tree ([`edits`]).

pub mod ast;
pub mod brackets;
pub mod diagnostics;
pub mod edits;
pub mod error;
pub mod escape;
pub mod json;
pub mod options;
pub mod parser;
pub mod rawtext;

// Re-export most used types for easy consumption
pub use crate::{
    ast::{
        CombinedMessage, ComplexMessage, Key, Literal, Message, MessageEntry, MessageList,
        Metadata, MetadataEntry, Node, PlaceholderMetadata, Span,
    },
    diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity, Suppression},
    edits::TextEdit,
    error::Error,
    options::{L10nOptions, locate_options_file, resolve_template_path},
    parser::{ParseOptions, Parser},
    rawtext::{EscapeDecoder, JsonEscapes, RawText},
};
