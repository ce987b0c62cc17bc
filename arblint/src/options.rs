//! Project configuration and template-path resolution.
//!
//! ARB files usually live inside a Flutter project, where `l10n.yaml`
//! describes the localization directory and the template file. This module
//! mirrors the subset of that file the engine cares about and resolves which
//! document acts as the template for a given file. All functions here are
//! pure path arithmetic; reading files is the caller's job.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ast::MessageList;

/// The `l10n.yaml` fields relevant to ARB validation. Unknown fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct L10nOptions {
    /// Directory containing the ARB files, relative to the options file.
    #[serde(rename = "arb-dir", default = "default_arb_dir")]
    pub arb_dir: PathBuf,
    /// File name of the template ARB file inside `arb_dir`.
    #[serde(rename = "template-arb-file", default = "default_template_arb_file")]
    pub template_arb_file: String,
    /// Whether single-quote ICU escaping is in effect for message syntax.
    #[serde(rename = "use-escaping", default = "default_use_escaping")]
    pub use_escaping: bool,
}

fn default_arb_dir() -> PathBuf {
    PathBuf::from("lib/l10n")
}

fn default_template_arb_file() -> String {
    "app_en.arb".to_string()
}

fn default_use_escaping() -> bool {
    true
}

impl Default for L10nOptions {
    fn default() -> Self {
        L10nOptions {
            arb_dir: default_arb_dir(),
            template_arb_file: default_template_arb_file(),
            use_escaping: default_use_escaping(),
        }
    }
}

/// Walks `start_dir` and its ancestors looking for an `l10n.yaml` file,
/// returning the first hit.
pub fn locate_options_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join("l10n.yaml"))
        .find(|candidate| candidate.is_file())
}

/// Resolves the template document for `document_path`.
///
/// An explicit `@@x-template` declaration wins and is interpreted relative
/// to the document's directory. Otherwise the template is derived from the
/// options file location as `<options dir>/<arb-dir>/<template-arb-file>`.
/// Returns `None` when neither source is available. The result may equal
/// `document_path` itself, meaning the document is its own template.
pub fn resolve_template_path(
    document_path: &Path,
    list: &MessageList,
    options_path: Option<&Path>,
    options: &L10nOptions,
) -> Option<PathBuf> {
    let document_dir = document_path.parent().unwrap_or_else(|| Path::new(""));
    if let Some(declared) = &list.template_path {
        return Some(document_dir.join(declared));
    }
    let options_dir = options_path?.parent().unwrap_or_else(|| Path::new(""));
    Some(
        options_dir
            .join(&options.arb_dir)
            .join(&options.template_arb_file),
    )
}
