//! Bulk catalog import from CSV.
//!
//! The file must carry a header row naming every column in
//! [`REQUIRED_COLUMNS`] (any order, any case). Rows are validated one by one;
//! rows that fail are reported with their line number, rows whose ISBN is
//! already catalogued (or appeared earlier in the file) are skipped.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const REQUIRED_COLUMNS: [&str; 6] =
    ["title", "author", "isbn", "price", "category", "description"];

#[derive(Debug, Clone, PartialEq)]
pub struct BookRow {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: f64,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: u64,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDuplicate {
    pub row: u64,
    pub isbn: String,
}

#[derive(Debug, Default)]
pub struct BulkImport {
    pub books: Vec<BookRow>,
    pub errors: Vec<RowError>,
    pub skipped: Vec<SkippedDuplicate>,
}

#[derive(Debug, PartialEq)]
pub enum ImportError {
    MissingColumns(Vec<String>),
    Malformed(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::MissingColumns(cols) => {
                write!(f, "Missing required columns: {}", cols.join(", "))
            }
            ImportError::Malformed(msg) => write!(f, "CSV parse error: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {}

/// Parse and validate an uploaded CSV against the ISBNs already in the catalog.
pub fn parse_bulk_csv(
    content: &[u8],
    existing_isbns: &HashSet<String>,
) -> Result<BulkImport, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = rdr
        .headers()
        .map_err(|e| ImportError::Malformed(e.to_string()))?
        .clone();

    let mut columns: HashMap<String, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        columns.entry(name.trim().to_lowercase()).or_insert(i);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut outcome = BulkImport::default();
    let mut seen_in_file: HashSet<String> = HashSet::new();

    for result in rdr.records() {
        let record = result.map_err(|e| ImportError::Malformed(e.to_string()))?;

        // Whitespace-only lines
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }

        let row = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .unwrap_or("")
                .to_string()
        };

        let title = field("title");
        let author = field("author");
        let isbn = field("isbn");
        let price = field("price");
        let category = field("category");

        if [&title, &author, &isbn, &price, &category]
            .iter()
            .any(|v| v.is_empty())
        {
            outcome.errors.push(RowError {
                row,
                error: "Missing required fields".to_string(),
            });
            continue;
        }

        let price = match price.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => p,
            _ => {
                outcome.errors.push(RowError {
                    row,
                    error: "Invalid price".to_string(),
                });
                continue;
            }
        };

        if existing_isbns.contains(&isbn) || seen_in_file.contains(&isbn) {
            outcome.skipped.push(SkippedDuplicate { row, isbn });
            continue;
        }
        seen_in_file.insert(isbn.clone());

        outcome.books.push(BookRow {
            title,
            author,
            isbn,
            price,
            description: field("description"),
            category,
        });
    }

    Ok(outcome)
}

fn skipped_lines(skipped: &[SkippedDuplicate]) -> String {
    skipped
        .iter()
        .map(|d| format!("\nRow {}: ISBN {} already exists", d.row, d.isbn))
        .collect()
}

pub fn validation_details(errors: &[RowError]) -> String {
    std::iter::once("Validation errors:".to_string())
        .chain(errors.iter().map(|e| format!("Row {}: {}", e.row, e.error)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn nothing_added_message(skipped: &[SkippedDuplicate]) -> String {
    let mut message = "No books were added.".to_string();
    if !skipped.is_empty() {
        message.push_str("\nSkipped duplicate books:");
        message.push_str(&skipped_lines(skipped));
    }
    message
}

pub fn added_message(added: usize, skipped: &[SkippedDuplicate]) -> String {
    let mut message = format!("Successfully added {} new book(s)", added);
    if !skipped.is_empty() {
        message.push_str(&format!(
            "\nSkipped {} duplicate book(s):",
            skipped.len()
        ));
        message.push_str(&skipped_lines(skipped));
    }
    message
}
