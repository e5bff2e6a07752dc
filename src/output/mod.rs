//
//  graph-login
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Renders Graph API results for the terminal:
//!
//! - **Table format**: human-readable tables and key/value listings
//! - **JSON format**: machine-readable JSON for scripting (`--json`)
//!
//! Graph results are untyped JSON, so the writer works on
//! [`serde_json::Value`] directly and callers choose the columns.
//!
//! ## Example
//!
//! ```rust,ignore
//! use graph_login::output::OutputWriter;
//!
//! let writer = OutputWriter::from_flag(global.json);
//! writer.write_items(&photos, &["id", "name", "likes.summary.total_count"])?;
//! writer.write_success("Fetched 3 photos");
//! ```

mod json;
mod table;

pub use json::*;
pub use table::*;

use console::style;
use serde_json::Value;

/// The available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    /// Human-readable table format with optional color support.
    #[default]
    Table,
    /// Pretty-printed JSON for scripting and automation.
    Json,
}

/// A unified output writer for both formats.
///
/// Status messages (`write_info`, `write_success`) go to stderr in JSON
/// mode so stdout stays parseable.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Picks JSON when the global `--json` flag is set.
    pub fn from_flag(json: bool) -> Self {
        Self::new(if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a single result.
    ///
    /// Objects print as `key: value` lines in table mode; anything else
    /// prints as pretty JSON.
    pub fn write_value(&self, value: &Value) -> anyhow::Result<()> {
        match (self.format, value) {
            (OutputFormat::Table, Value::Object(map)) => {
                for (key, field) in map {
                    print_field(key, &cell_text(field), self.color);
                }
                Ok(())
            }
            _ => write_json(value),
        }
    }

    /// Writes a list of results.
    ///
    /// `columns` are dotted paths into each item (`likes.summary.total_count`).
    pub fn write_items(&self, items: &[Value], columns: &[&str]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&items),
            OutputFormat::Table => {
                if items.is_empty() {
                    self.write_info("No results");
                    return Ok(());
                }
                TableBuilder::new()
                    .color(self.color)
                    .headers(columns.iter().copied())
                    .rows(items.iter().map(|item| {
                        columns
                            .iter()
                            .map(|column| {
                                let text = lookup(item, column).map(cell_text).unwrap_or_default();
                                truncate(&text, 60)
                            })
                            .collect::<Vec<_>>()
                    }))
                    .print();
                Ok(())
            }
        }
    }

    pub fn write_info(&self, msg: &str) {
        if self.is_json() {
            eprintln!("{}", msg);
        } else {
            println!("{}", msg);
        }
    }

    pub fn write_success(&self, msg: &str) {
        let line = if self.color {
            format!("{} {}", style("✓").green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        };
        if self.is_json() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

pub fn print_field(key: &str, value: &str, color: bool) {
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}

/// Follows a dotted path through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}
