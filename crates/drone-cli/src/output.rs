//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Indented, human-readable rendering of the response
    Pretty,
    /// Table for listings, pretty rendering otherwise
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

impl OutputFormat {
    /// Whether the output is meant for machines rather than people
    pub fn is_machine(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

/// Render a response document, preceded by `heading` for human formats
pub fn render_document(heading: &str, value: &Value, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?.trim_end().to_string()),
        OutputFormat::Pretty | OutputFormat::Table if value.is_null() => Ok(heading.to_string()),
        OutputFormat::Pretty | OutputFormat::Table => {
            let body = render_pretty(value, colored::control::SHOULD_COLORIZE.should_colorize());
            if body.is_empty() {
                Ok(heading.to_string())
            } else {
                Ok(format!("{}\n{}", heading, body))
            }
        }
    }
}

/// Print a response document
pub fn print_document(heading: &str, value: &Value, format: OutputFormat) -> CliResult<()> {
    println!("{}", render_document(heading, value, format)?);
    Ok(())
}

/// Print rows as a table, with `heading` above it
pub fn print_table<T: Tabled>(heading: &str, rows: Vec<T>) {
    println!("{}", heading);
    if rows.is_empty() {
        println!("{}", "No results".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message);
}

// ========== Pretty rendering ==========

const INDENT: usize = 2;

/// Render any JSON value as indented text
///
/// Objects become `key: value` lines with nested values indented below their
/// key, arrays become `- item` lines, and multi-line strings are fenced with
/// `"""`. The result has no trailing newline.
pub fn render_pretty(value: &Value, color: bool) -> String {
    let mut lines = Vec::new();
    write_value(&mut lines, value, 0, color);
    lines.join("\n")
}

fn write_value(lines: &mut Vec<String>, value: &Value, indent: usize, color: bool) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, item) in map {
                let key = paint(&format!("{}:", key), color, |s| s.green());
                if let Some(inline) = inline_scalar(item, color) {
                    push(lines, indent, format!("{} {}", key, inline));
                } else if let Value::String(text) = item {
                    push(lines, indent, key);
                    write_multiline(lines, text, indent + INDENT);
                } else {
                    push(lines, indent, key);
                    write_value(lines, item, indent + INDENT, color);
                }
            }
        }
        Value::Array(items) if !items.is_empty() => {
            let dash = paint("-", color, |s| s.green());
            for item in items {
                if let Some(inline) = inline_scalar(item, color) {
                    push(lines, indent, format!("{} {}", dash, inline));
                } else if let Value::String(text) = item {
                    push(lines, indent, dash.clone());
                    write_multiline(lines, text, indent + INDENT);
                } else {
                    push(lines, indent, dash.clone());
                    write_value(lines, item, indent + INDENT, color);
                }
            }
        }
        Value::String(text) if text.contains('\n') => write_multiline(lines, text, indent),
        other => {
            if let Some(inline) = inline_scalar(other, color) {
                push(lines, indent, inline);
            }
        }
    }
}

/// Single-line rendering of scalars and empty containers
fn inline_scalar(value: &Value, color: bool) -> Option<String> {
    match value {
        Value::Null => Some(paint("null", color, |s| s.dimmed())),
        Value::Bool(b) => Some(paint(&b.to_string(), color, |s| s.yellow())),
        Value::Number(n) => Some(paint(&n.to_string(), color, |s| s.blue())),
        Value::String(s) if !s.contains('\n') => Some(s.clone()),
        Value::Array(items) if items.is_empty() => {
            Some(paint("(empty array)", color, |s| s.dimmed()))
        }
        Value::Object(map) if map.is_empty() => {
            Some(paint("(empty object)", color, |s| s.dimmed()))
        }
        _ => None,
    }
}

fn write_multiline(lines: &mut Vec<String>, text: &str, indent: usize) {
    push(lines, indent, "\"\"\"".to_string());
    for line in text.lines() {
        push(lines, indent + INDENT, line.to_string());
    }
    push(lines, indent, "\"\"\"".to_string());
}

fn push(lines: &mut Vec<String>, indent: usize, text: String) {
    lines.push(format!("{}{}", " ".repeat(indent), text));
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}
