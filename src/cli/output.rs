//! Output formatting for lookup results

use colored::Colorize;
use serde_json::Value;

use super::OutputFormat;
use crate::error::{Error, Result};

/// Render resolved values in the requested format
pub fn render(values: &[Value], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(values)
            .map_err(|e| Error::Config(format!("failed to encode JSON output: {}", e))),
        OutputFormat::Yaml => serde_yaml::to_string(values)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| Error::Config(format!("failed to encode YAML output: {}", e))),
    }
}

/// Print the candidate keys to stderr
pub fn print_candidate_keys(keys: &[String], use_color: bool) {
    let use_color = use_color && std::env::var("NO_COLOR").is_err();
    let label = if use_color {
        "candidate keys:".cyan().bold().to_string()
    } else {
        "candidate keys:".to_string()
    };

    if keys.is_empty() {
        let none = if use_color {
            "(none, only defaults apply)".dimmed().to_string()
        } else {
            "(none, only defaults apply)".to_string()
        };
        eprintln!("{} {}", label, none);
    } else {
        eprintln!("{} {}", label, keys.join(" > "));
    }
}

/// Print an error to stderr
pub fn print_error(message: &str, use_color: bool) {
    let use_color = use_color && std::env::var("NO_COLOR").is_err();
    if use_color {
        eprintln!("{} {}", "ERROR:".red().bold(), message);
    } else {
        eprintln!("ERROR: {}", message);
    }
}
