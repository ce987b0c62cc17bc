//! Semantic validation of a parsed registry.
//!
//! The pass is read-only: it walks message entries (resolving metadata
//! locally first, then from an optional template registry), checks key and
//! placeholder grammar, ICU structure, and metadata consistency, and collects
//! typed diagnostics. Nothing here ever fails or mutates the AST; a
//! suppression list filters the stream as a pure post-step.

use std::fmt::Display;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::{Literal, Message, MessageList, Metadata, Span};

lazy_static! {
    // Must be able to translate to a (non-private) Dart method.
    static ref KEY_NAME_REGEX: Regex = Regex::new("^[a-zA-Z][a-zA-Z_0-9]*$").unwrap();
    // Must be able to translate to a (non-private) Dart variable.
    static ref PLACEHOLDER_NAME_REGEX: Regex =
        Regex::new(r"^[a-zA-Z][a-zA-Z_$0-9]*$").unwrap();
}

const KNOWN_COMPLEX_TYPES: [&str; 3] = ["plural", "select", "gender"];

/// Stable diagnostic identifiers, consumed by suppression configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    MismatchedBrackets,
    MetadataForMissingKey,
    InvalidKey,
    MissingMetadataForKey,
    InvalidPlaceholder,
    MissingOtherInComplex,
    UnknownComplexType,
    PlaceholderWithoutMetadata,
    MissingPlaceholderWithMetadata,
    MissingMessagesFromTemplate,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MismatchedBrackets => "mismatched_brackets",
            DiagnosticCode::MetadataForMissingKey => "metadata_for_missing_key",
            DiagnosticCode::InvalidKey => "invalid_key",
            DiagnosticCode::MissingMetadataForKey => "missing_metadata_for_key",
            DiagnosticCode::InvalidPlaceholder => "invalid_placeholder",
            DiagnosticCode::MissingOtherInComplex => "missing_other_in_complex",
            DiagnosticCode::UnknownComplexType => "unknown_complex_type",
            DiagnosticCode::PlaceholderWithoutMetadata => "placeholder_without_metadata",
            DiagnosticCode::MissingPlaceholderWithMetadata => {
                "missing_placeholder_with_metadata"
            }
            DiagnosticCode::MissingMessagesFromTemplate => "missing_messages_from_template",
        }
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosticCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mismatched_brackets" => Ok(DiagnosticCode::MismatchedBrackets),
            "metadata_for_missing_key" => Ok(DiagnosticCode::MetadataForMissingKey),
            "invalid_key" => Ok(DiagnosticCode::InvalidKey),
            "missing_metadata_for_key" => Ok(DiagnosticCode::MissingMetadataForKey),
            "invalid_placeholder" => Ok(DiagnosticCode::InvalidPlaceholder),
            "missing_other_in_complex" => Ok(DiagnosticCode::MissingOtherInComplex),
            "unknown_complex_type" => Ok(DiagnosticCode::UnknownComplexType),
            "placeholder_without_metadata" => Ok(DiagnosticCode::PlaceholderWithoutMetadata),
            "missing_placeholder_with_metadata" => {
                Ok(DiagnosticCode::MissingPlaceholderWithMetadata)
            }
            "missing_messages_from_template" => {
                Ok(DiagnosticCode::MissingMessagesFromTemplate)
            }
            _ => Err(format!("Unknown diagnostic code: {}", s)),
        }
    }
}

/// Severity reflecting user impact: errors block correctness, warnings are
/// likely bugs, information is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

/// One validation finding, anchored to a raw-source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

/// Which diagnostics to silence: everything, or a set of codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suppression {
    All,
    Codes(Vec<DiagnosticCode>),
}

impl Default for Suppression {
    fn default() -> Self {
        Suppression::Codes(Vec::new())
    }
}

impl Suppression {
    pub fn is_suppressed(&self, code: DiagnosticCode) -> bool {
        match self {
            Suppression::All => true,
            Suppression::Codes(codes) => codes.contains(&code),
        }
    }
}

impl<'de> Deserialize<'de> for Suppression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }
        match Raw::deserialize(deserializer)? {
            Raw::One(word) if word == "all" => Ok(Suppression::All),
            Raw::One(word) => {
                let code = word.parse().map_err(serde::de::Error::custom)?;
                Ok(Suppression::Codes(vec![code]))
            }
            Raw::Many(words) => {
                let codes = words
                    .iter()
                    .map(|word| word.parse().map_err(serde::de::Error::custom))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Suppression::Codes(codes))
            }
        }
    }
}

/// The validation pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    suppression: Suppression,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn with_suppression(suppression: Suppression) -> Self {
        Diagnostics { suppression }
    }

    /// Validates one document, checking that
    /// * every message has metadata defined (locally or in the template),
    /// * every key is a valid message key,
    /// * the ICU structure is valid (known type, `other` arm present),
    /// * every placeholder is declared in the resolved metadata,
    /// * every declared placeholder actually appears in the message,
    /// * no metadata exists for an undefined key,
    /// * no template message is missing from this document.
    ///
    /// `parse_errors` (the structural errors from `parse`) are folded in as
    /// `mismatched_brackets` errors. `document_end` anchors the template
    /// comparison warning.
    pub fn diagnose(
        &self,
        list: &MessageList,
        parse_errors: &[Literal],
        template: Option<&MessageList>,
        document_end: usize,
    ) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        if self.suppression == Suppression::All {
            return found;
        }

        for error in parse_errors {
            self.report(
                &mut found,
                DiagnosticCode::MismatchedBrackets,
                Severity::Error,
                error.span,
                error.value.clone(),
            );
        }

        for entry in &list.message_entries {
            let local = list.metadata_for(&entry.key.value).map(|e| &e.metadata);
            let from_template = if local.is_none() {
                template
                    .and_then(|t| t.metadata_for(&entry.key.value))
                    .map(|e| &e.metadata)
            } else {
                None
            };
            let resolved = local.or(from_template);
            self.validate_key(&mut found, entry.key.value.as_str(), entry.key.span, resolved);
            self.validate_message(&mut found, &entry.message, resolved);
            self.validate_metadata(&mut found, &entry.message, local);
        }

        for entry in &list.metadata_entries {
            let target = entry.key.value.strip_prefix('@').unwrap_or(&entry.key.value);
            let defined = list
                .message_entries
                .iter()
                .any(|message_entry| message_entry.key.value == target);
            if !defined {
                self.report(
                    &mut found,
                    DiagnosticCode::MetadataForMissingKey,
                    Severity::Error,
                    entry.key.span,
                    format!(
                        "Metadata for an undefined key. Add a message key with the name \"{}\".",
                        target
                    ),
                );
            }
        }

        if let Some(template) = template {
            let missing: Vec<&str> = template
                .message_entries
                .iter()
                .filter(|template_entry| {
                    !list
                        .message_entries
                        .iter()
                        .any(|entry| entry.key.value == template_entry.key.value)
                })
                .map(|template_entry| template_entry.key.value.as_str())
                .collect();
            if !missing.is_empty() {
                let anchor = document_end.saturating_sub(1);
                self.report(
                    &mut found,
                    DiagnosticCode::MissingMessagesFromTemplate,
                    Severity::Warning,
                    Span::new(anchor, document_end),
                    format!("Missing messages from template: {}", missing.join(", ")),
                );
            }
        }

        found
    }

    fn validate_key(
        &self,
        found: &mut Vec<Diagnostic>,
        key: &str,
        span: Span,
        metadata: Option<&Metadata>,
    ) {
        if !KEY_NAME_REGEX.is_match(key) {
            self.report(
                found,
                DiagnosticCode::InvalidKey,
                Severity::Error,
                span,
                format!(
                    "Key \"{}\" is not a valid message key. The key must start with a letter and contain only letters, numbers, or underscores.",
                    key
                ),
            );
        } else if metadata.is_none() {
            self.report(
                found,
                DiagnosticCode::MissingMetadataForKey,
                Severity::Information,
                span,
                format!("The message with key \"{}\" does not have metadata defined.", key),
            );
        }
    }

    fn validate_message(
        &self,
        found: &mut Vec<Diagnostic>,
        message: &Message,
        metadata: Option<&Metadata>,
    ) {
        match message {
            Message::Literal(_) => {}
            Message::Placeholder(placeholder) => {
                self.validate_placeholder(found, placeholder, metadata);
            }
            Message::Combined(combined) => {
                for part in &combined.parts {
                    self.validate_message(found, part, metadata);
                }
            }
            Message::Complex(complex) => {
                self.validate_placeholder(found, &complex.argument, metadata);

                if complex.arm("other").is_none() {
                    self.report(
                        found,
                        DiagnosticCode::MissingOtherInComplex,
                        Severity::Error,
                        complex.span,
                        "The ICU message format requires a 'other' argument.".to_string(),
                    );
                }

                if !KNOWN_COMPLEX_TYPES.contains(&complex.complex_type.value.as_str()) {
                    self.report(
                        found,
                        DiagnosticCode::UnknownComplexType,
                        Severity::Error,
                        complex.complex_type.span,
                        format!(
                            "Unknown ICU messagetype \"{}\"",
                            complex.complex_type.value
                        ),
                    );
                } else {
                    // Arm bodies only have defined meaning under a known type.
                    for (_, body) in &complex.arms {
                        self.validate_message(found, body, metadata);
                    }
                }
            }
        }
    }

    fn validate_placeholder(
        &self,
        found: &mut Vec<Diagnostic>,
        placeholder: &Literal,
        metadata: Option<&Metadata>,
    ) {
        if PLACEHOLDER_NAME_REGEX.is_match(&placeholder.value) {
            let declared = metadata.is_some_and(|m| m.declares(&placeholder.value));
            if !declared {
                self.report(
                    found,
                    DiagnosticCode::PlaceholderWithoutMetadata,
                    Severity::Warning,
                    placeholder.span,
                    format!(
                        "Placeholder \"{}\" not defined in the message metadata.",
                        placeholder.value
                    ),
                );
            }
        } else {
            self.report(
                found,
                DiagnosticCode::InvalidPlaceholder,
                Severity::Error,
                placeholder.span,
                format!(
                    "\"{}\" is not a valid placeholder name. The key must start with a letter and contain only letters, numbers, underscores.",
                    placeholder.value
                ),
            );
        }
    }

    fn validate_metadata(
        &self,
        found: &mut Vec<Diagnostic>,
        message: &Message,
        metadata: Option<&Metadata>,
    ) {
        let Some(metadata) = metadata else {
            return;
        };
        let referenced = message.placeholders();
        for declared in &metadata.placeholders {
            let used = referenced.iter().any(|p| p.value == declared.value);
            if !used {
                self.report(
                    found,
                    DiagnosticCode::MissingPlaceholderWithMetadata,
                    Severity::Warning,
                    declared.span,
                    "The placeholder is defined in the metadata, but not in the message."
                        .to_string(),
                );
            }
        }
    }

    fn report(
        &self,
        found: &mut Vec<Diagnostic>,
        code: DiagnosticCode,
        severity: Severity,
        span: Span,
        message: String,
    ) {
        if self.suppression.is_suppressed(code) {
            return;
        }
        found.push(Diagnostic {
            code,
            severity,
            span,
            message,
        });
    }
}
