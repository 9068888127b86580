// ============================================================
// CSV LOADER
// ============================================================
// Parse delimited text into a typed dataset, collecting every
// record-level problem before failing

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Trim};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::dataset::{CellValue, Dataset, Row};
use crate::domain::error::{AppError, ParseIssue, Result};

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?$").expect("valid number regex")
});

/// Numbers at or beyond 2^53 lose integer precision (or overflow to infinity)
/// and are kept as text instead
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Delimited text loader with type inference
pub struct CsvLoader {
    /// Delimiter character; detected from content when unset
    delimiter: Option<u8>,

    /// Whether to trim whitespace from headers and values
    trim: bool,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
        }
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parse text into a dataset.
    ///
    /// The whole input is read before reporting; all issues found come back
    /// together in a single [`AppError::ParseError`].
    pub fn load(&self, content: &str) -> Result<Dataset> {
        if content.trim().is_empty() {
            return Err(AppError::ParseError(vec![ParseIssue::new(
                None,
                "input is empty",
            )]));
        }

        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut issues = Vec::new();
        if let Some(line) = unterminated_quote_line(content, delimiter) {
            issues.push(ParseIssue::new(
                Some(line),
                "unterminated quoted field",
            ));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut columns: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut record = StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {}
                Err(e) => {
                    // The reader cannot resync after a record-level failure
                    let line = e.position().map(|p| p.line());
                    issues.push(ParseIssue::new(line, e.to_string()));
                    break;
                }
            }

            if is_blank(&record) {
                continue;
            }

            let line = record.position().map(|p| p.line());
            match &columns {
                None => {
                    let header = parse_header(&record, line, &mut issues);
                    columns = Some(header);
                }
                Some(header) => {
                    if record.len() > header.len() {
                        issues.push(ParseIssue::new(
                            line,
                            format!(
                                "row has {} fields but header has {}",
                                record.len(),
                                header.len()
                            ),
                        ));
                        continue;
                    }
                    let values = record.iter().map(infer_value).collect();
                    rows.push(Row::new(values));
                }
            }
        }

        if !issues.is_empty() {
            return Err(AppError::ParseError(issues));
        }

        let columns = columns.ok_or_else(|| {
            AppError::ParseError(vec![ParseIssue::new(None, "missing header line")])
        })?;

        debug!(
            columns = columns.len(),
            rows = rows.len(),
            delimiter = %(delimiter as char).escape_default(),
            "Loaded delimited dataset"
        );

        Ok(Dataset::new(columns, rows))
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(10)
            .collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// Convert a raw field to a typed cell
pub fn infer_value(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Missing;
    }
    if NUMBER_PATTERN.is_match(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n > -MAX_EXACT_INTEGER && n < MAX_EXACT_INTEGER {
                return CellValue::Number(n);
            }
        }
    }
    CellValue::Text(raw.to_string())
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.get(0).map_or(true, |f| f.trim().is_empty())
}

fn parse_header(record: &StringRecord, line: Option<u64>, issues: &mut Vec<ParseIssue>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut header = Vec::with_capacity(record.len());

    for (idx, name) in record.iter().enumerate() {
        if name.trim().is_empty() {
            issues.push(ParseIssue::new(
                line,
                format!("header column {} has no name", idx + 1),
            ));
        } else if !seen.insert(name.to_string()) {
            issues.push(ParseIssue::new(
                line,
                format!("duplicate column name '{}'", name),
            ));
        }
        header.push(name.to_string());
    }

    header
}

/// Line on which a quoted field opens without ever being closed.
///
/// Only a quote at the very start of a field opens a quoted section; quotes
/// inside unquoted fields are literal, matching the reader.
fn unterminated_quote_line(content: &str, delimiter: u8) -> Option<u64> {
    let delimiter = delimiter as char;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut line = 1u64;
    let mut opened_at = 1u64;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }

        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match c {
            '"' if field_start => {
                in_quotes = true;
                opened_at = line;
                field_start = false;
            }
            '\n' => field_start = true,
            '\r' => {}
            c if c == delimiter => field_start = true,
            _ => field_start = false,
        }
    }

    in_quotes.then_some(opened_at)
}
