//! The `placeholders` subcommand: a quick view of which placeholders each
//! message references and which its metadata declares.

use std::fs;

use arblint::parser::Parser;

pub fn run(input: &str) -> Result<(), String> {
    let source =
        fs::read_to_string(input).map_err(|e| format!("Failed to read {}: {}", input, e))?;
    let (list, errors) = Parser::new().parse(&source);

    for entry in &list.message_entries {
        let referenced: Vec<&str> = entry
            .message
            .placeholders()
            .iter()
            .map(|p| p.value.as_str())
            .collect();
        let declared: Vec<&str> = list
            .metadata_for(&entry.key.value)
            .map(|metadata| {
                metadata
                    .metadata
                    .placeholders
                    .iter()
                    .map(|p| p.value.as_str())
                    .collect()
            })
            .unwrap_or_default();

        if referenced.is_empty() && declared.is_empty() {
            println!("{}: (none)", entry.key.value);
        } else {
            println!(
                "{}: {} (declared: {})",
                entry.key.value,
                join_or_dash(&referenced),
                join_or_dash(&declared)
            );
        }
    }

    if !errors.is_empty() {
        eprintln!(
            "{} message(s) could not be parsed and were skipped",
            errors.len()
        );
    }
    Ok(())
}

fn join_or_dash(names: &[&str]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
