//
//  graph-login
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Builds `comfy_table` tables with UTF-8 borders and dynamic column widths.
//!
//! ```rust,ignore
//! use graph_login::output::TableBuilder;
//!
//! TableBuilder::new()
//!     .headers(["id", "name"])
//!     .row(["10150146071791729", "Profile Pictures"])
//!     .print();
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde_json::Value;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// A builder for formatted tables.
///
/// Color support is detected on creation; override it with
/// [`color`](TableBuilder::color).
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the header row; headers are cyan when color is enabled.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let color = self.color;
        let cells: Vec<Cell> = headers
            .into_iter()
            .map(|header| {
                let cell = Cell::new(header.into());
                if color {
                    cell.fg(Color::Cyan)
                } else {
                    cell
                }
            })
            .collect();
        self.table.set_header(cells);
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table
            .add_row(cells.into_iter().map(|cell| Cell::new(cell.into())));
        self
    }

    pub fn rows<I, R, S>(self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        rows.into_iter().fold(self, |builder, row| builder.row(row))
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a JSON value for a table cell.
///
/// Strings print without quotes, `null` prints as `-`, and arrays and
/// objects print as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Truncates to `max_len` characters, ending with `...` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("plain")), "plain");
        assert_eq!(cell_text(&json!(null)), "-");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_builder_renders_rows() {
        let table = TableBuilder::new()
            .color(false)
            .headers(["id", "name"])
            .rows(vec![vec!["1", "one"], vec!["2", "two"]])
            .build();
        let rendered = table.to_string();
        assert!(rendered.contains("one"));
        assert!(rendered.contains("two"));
    }
}
