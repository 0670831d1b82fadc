use serde::{Deserialize, Serialize};

use crate::ResultItem;

/// Name offered for the downloaded CSV file.
pub const CSV_FILENAME: &str = "search_results.csv";
pub const CSV_HEADER: [&str; 3] = ["Title", "URL", "Date"];
/// Stand-in for a missing or empty field.
pub const MISSING_FIELD: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CsvDialect {
    /// Fields joined with a bare comma. Values containing commas, quotes or
    /// newlines break the column layout.
    #[default]
    Bare,
    /// RFC 4180 quoting for fields that need it.
    Quoted,
}

/// Builds the CSV table: header plus one row per item, `\n` between rows and
/// no trailing newline.
pub fn csv_text(items: &[ResultItem], dialect: CsvDialect) -> String {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(join_row(&CSV_HEADER, dialect));
    for item in items {
        let row = [item.display_title(), item.display_url(), item.display_date()];
        lines.push(join_row(&row, dialect));
    }
    lines.join("\n")
}

/// Builds the plain-text block copied to the clipboard.
pub fn clipboard_text(items: &[ResultItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "Title: {}\nURL: {}\nDate: {}\n\n",
                item.display_title(),
                item.display_url(),
                item.display_date()
            )
        })
        .collect()
}

fn join_row(fields: &[&str], dialect: CsvDialect) -> String {
    match dialect {
        CsvDialect::Bare => fields.join(","),
        CsvDialect::Quoted => fields
            .iter()
            .map(|field| quote_field(field))
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn quote_field(field: &str) -> String {
    let needs_quotes = field.contains([',', '"', '\n', '\r']);
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
