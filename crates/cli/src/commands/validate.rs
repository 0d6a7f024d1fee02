//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use dispatcher::parse_event_line;

use crate::cli::ValidateArgs;

/// Stop collecting individual errors after this many
const MAX_REPORTED_ERRORS: usize = 20;

/// Validation result for JSON output
#[derive(Serialize, Debug)]
struct ValidationResult {
    valid: bool,
    events_path: String,
    events: u64,
    recipients: u64,
    empty_events: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(events = %args.events.display(), "Validating event file");

    let content = std::fs::read_to_string(&args.events)
        .with_context(|| format!("Failed to read {}", args.events.display()))?;
    let result = validate_events(&args.events, &content);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Event file validation failed")
    }
}

fn validate_events(path: &Path, content: &str) -> ValidationResult {
    let mut result = ValidationResult {
        valid: true,
        events_path: path.display().to_string(),
        events: 0,
        recipients: 0,
        empty_events: 0,
        errors: Vec::new(),
    };

    for (index, line) in content.lines().enumerate() {
        match parse_event_line(index as u64 + 1, line) {
            Ok(Some(event)) => {
                result.events += 1;
                result.recipients += event.recipients.len() as u64;
                if event.recipients.is_empty() {
                    result.empty_events += 1;
                }
            }
            Ok(None) => {}
            Err(e) => {
                result.valid = false;
                if result.errors.len() < MAX_REPORTED_ERRORS {
                    result.errors.push(e.to_string());
                }
            }
        }
    }

    result
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Event file is valid: {}", result.events_path);
    } else {
        println!("✗ Event file is invalid: {}", result.events_path);
    }

    println!("\n  Events: {}", result.events);
    println!("  Recipients: {}", result.recipients);
    if result.empty_events > 0 {
        println!("  Events without recipients: {}", result.empty_events);
    }

    if !result.errors.is_empty() {
        println!("\n  Errors:");
        for error in &result.errors {
            println!("  - {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LINE: &str = r#"{"recipients":[{"data_center":"dc1","node_id":"n1"},{"data_center":"dc2","node_id":"n7"}],"payload":{"origin":"a","data":[1]}}"#;
    const EMPTY: &str = r#"{"recipients":[],"payload":{"origin":"a","data":[]}}"#;

    #[test]
    fn test_valid_file_counts() {
        let content = format!("{LINE}\n\n{EMPTY}\n");
        let result = validate_events(Path::new("events.jsonl"), &content);

        assert!(result.valid);
        assert_eq!(result.events, 2);
        assert_eq!(result.recipients, 2);
        assert_eq!(result.empty_events, 1);
    }

    #[test]
    fn test_invalid_lines_reported() {
        let content = format!("{LINE}\n{{broken\n{LINE}\n");
        let result = validate_events(Path::new("events.jsonl"), &content);

        assert!(!result.valid);
        assert_eq!(result.events, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("line 2"));
    }

    #[test]
    fn test_run_validate_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{LINE}").unwrap();

        let args = ValidateArgs {
            events: file.path().to_path_buf(),
            json: true,
        };
        assert!(run_validate(&args).is_ok());
    }
}
