//! The `lint` subcommand: file collection, configuration discovery, template
//! resolution, and diagnostic reporting.

use std::fs;
use std::path::{Path, PathBuf};

use arblint::diagnostics::{Diagnostics, Severity, Suppression};
use arblint::options::{L10nOptions, locate_options_file, resolve_template_path};
use arblint::parser::{ParseOptions, Parser};
use arblint::MessageList;

use crate::report::{self, FileReport, OutputFormat};

pub fn run(
    paths: &[String],
    template_override: Option<&str>,
    suppress: &[String],
    format: OutputFormat,
    no_config: bool,
) -> Result<i32, String> {
    let files = expand_input_globs(paths)?;
    if files.is_empty() {
        return Err("No input files matched".to_string());
    }
    let suppression = parse_suppression(suppress)?;

    let mut reports = Vec::new();
    let mut failed = false;
    for file in &files {
        let source = fs::read_to_string(file)
            .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;

        let (options_path, options) = if no_config {
            (None, L10nOptions::default())
        } else {
            discover_options(file)?
        };

        let parser = Parser::with_options(ParseOptions {
            use_escaping: options.use_escaping,
        });
        let (list, errors) = parser.parse(&source);

        let template_path = match template_override {
            Some(path) => Some(PathBuf::from(path)),
            None => {
                resolve_template_path(file, &list, options_path.as_deref(), &options)
            }
        };
        let template = template_path
            .filter(|path| !same_file(path, file))
            .and_then(|path| load_template(&path, &parser));

        let diagnostics = Diagnostics::with_suppression(suppression.clone()).diagnose(
            &list,
            &errors,
            template.as_ref(),
            source.len(),
        );
        failed |= diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error);

        let report = FileReport {
            path: file.display().to_string(),
            diagnostics,
        };
        if format == OutputFormat::Text {
            report::print_text(&report, &source);
        }
        reports.push(report);
    }

    if format == OutputFormat::Json {
        report::print_json(&reports)?;
    }
    Ok(if failed { 1 } else { 0 })
}

/// Expand possible glob patterns in a list of input strings into concrete
/// file paths. Plain paths pass through even when nothing matches them, so
/// the per-file read error stays precise.
fn expand_input_globs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    fn has_glob_meta(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut files = Vec::new();
    for input in inputs {
        if !has_glob_meta(input) {
            files.push(PathBuf::from(input));
            continue;
        }
        let matches = glob::glob(input)
            .map_err(|e| format!("Invalid glob pattern '{}': {}", input, e))?;
        for entry in matches {
            let path = entry.map_err(|e| format!("Failed to read glob entry: {}", e))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Finds and loads the `l10n.yaml` governing `file`, defaulting when there
/// is none. A config file that exists but does not parse is a hard error.
fn discover_options(file: &Path) -> Result<(Option<PathBuf>, L10nOptions), String> {
    let start = file.parent().unwrap_or_else(|| Path::new("."));
    let Some(options_path) = locate_options_file(start) else {
        return Ok((None, L10nOptions::default()));
    };
    let text = fs::read_to_string(&options_path)
        .map_err(|e| format!("Failed to read {}: {}", options_path.display(), e))?;
    let options: L10nOptions = serde_yaml::from_str(&text)
        .map_err(|e| format!("Failed to parse {}: {}", options_path.display(), e))?;
    Ok((Some(options_path), options))
}

// Best-effort: a missing or unreadable template simply disables the
// template comparison.
fn load_template(path: &Path, parser: &Parser) -> Option<MessageList> {
    let source = fs::read_to_string(path).ok()?;
    let (list, _) = parser.parse(&source);
    Some(list)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn parse_suppression(suppress: &[String]) -> Result<Suppression, String> {
    if suppress.iter().any(|s| s == "all") {
        return Ok(Suppression::All);
    }
    let codes = suppress
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, String>>()?;
    Ok(Suppression::Codes(codes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arblint::diagnostics::DiagnosticCode;

    #[test]
    fn test_parse_suppression_all() {
        let all = parse_suppression(&["all".to_string()]).unwrap();
        assert_eq!(all, Suppression::All);
    }

    #[test]
    fn test_parse_suppression_codes() {
        let codes =
            parse_suppression(&["invalid_key".to_string(), "unknown_complex_type".to_string()])
                .unwrap();
        assert_eq!(
            codes,
            Suppression::Codes(vec![
                DiagnosticCode::InvalidKey,
                DiagnosticCode::UnknownComplexType,
            ])
        );
    }

    #[test]
    fn test_parse_suppression_rejects_unknown() {
        assert!(parse_suppression(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_plain_paths_pass_through() {
        let files =
            expand_input_globs(&["does/not/exist.arb".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("does/not/exist.arb")]);
    }
}
