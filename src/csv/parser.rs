//! CSV Parser
//!
//! Reads every line of a text source into typed rows, collecting per-row
//! failures instead of aborting.

use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::csv::{RowCreator, RowError};
use crate::error::Result;

// == Field Splitting ==
/// Splits a line on commas that are not inside a matched pair of double quotes.
///
/// A comma separates fields when an even number of quote characters follows
/// it on the line. Quotes are kept in the field text. Trailing empty fields
/// are dropped, so `"a,b,"` has two fields; a line with no separator at all
/// is a single field, even when empty.
pub fn split_fields(line: &str) -> Vec<String> {
    let total_quotes = line.matches('"').count();
    let mut seen_quotes = 0;
    let mut start = 0;
    let mut fields = Vec::new();

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => seen_quotes += 1,
            ',' if (total_quotes - seen_quotes) % 2 == 0 => {
                fields.push(line[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    if fields.is_empty() {
        return vec![line.to_string()];
    }
    fields.push(line[start..].to_string());

    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

// == Parsed Output ==
/// Everything one parse pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv<T> {
    /// Admitted rows, in input order
    pub rows: Vec<T>,
    /// Column names, if the first line was declared a header
    pub header: Option<Vec<String>>,
    /// Rows that failed construction or had the wrong width
    pub errors: Vec<RowError>,
}

// == Parser ==
/// Generic line parser over any buffered text source.
///
/// `T` is whatever the creator builds from a line's fields.
pub struct CsvParser<R, C, T> {
    reader: R,
    has_header: bool,
    creator: C,
    parsed: Vec<T>,
    errors: Vec<RowError>,
    header: Option<Vec<String>>,
    /// Field count of the first admitted row
    width: Option<usize>,
}

impl<R, C, T> CsvParser<R, C, T>
where
    R: BufRead,
    C: RowCreator<T>,
{
    // == Constructor ==
    /// Creates a parser. Nothing is read until [`parse`](Self::parse).
    pub fn new(reader: R, has_header: bool, creator: C) -> Self {
        Self {
            reader,
            has_header,
            creator,
            parsed: Vec::new(),
            errors: Vec::new(),
            header: None,
            width: None,
        }
    }

    // == Parse ==
    /// Reads the source to exhaustion.
    ///
    /// Row failures are collected in [`errors`](Self::errors). Only a failure
    /// to read the source itself is returned as an error.
    pub fn parse(&mut self) -> Result<()> {
        let mut line_number = 0usize;
        let mut buf = String::new();

        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let line = buf.strip_suffix('\n').unwrap_or(buf.as_str());
            let line = line.strip_suffix('\r').unwrap_or(line);
            let fields = split_fields(line);

            if line_number == 1 && self.has_header {
                debug!("Header: {:?}", fields);
                self.header = Some(fields);
                continue;
            }

            self.admit(fields, line_number);
        }

        info!(
            "Parsed {} lines: {} rows admitted, {} errors",
            line_number,
            self.parsed.len(),
            self.errors.len()
        );
        Ok(())
    }

    fn admit(&mut self, fields: Vec<String>, line_number: usize) {
        match self.creator.create(&fields) {
            Ok(row) => match self.width {
                Some(width) if width != fields.len() => {
                    warn!(
                        "Line {} has {} fields, expected {}",
                        line_number,
                        fields.len(),
                        width
                    );
                    self.errors.push(RowError::new(
                        format!("Inconsistent field count, line {}", line_number),
                        &fields,
                    ));
                }
                _ => {
                    self.width.get_or_insert(fields.len());
                    self.parsed.push(row);
                }
            },
            Err(err) => {
                warn!("Line {} rejected: {}", line_number, err);
                self.errors.push(err);
            }
        }
    }

    // == Column Index ==
    /// Position of the first header column named exactly `name`.
    ///
    /// Returns `None` when no column matches, and also when no header has
    /// been recorded, which is logged as a usage error.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        column_index(self.header.as_deref(), name)
    }

    // == Accessors ==
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn parsed_content(&self) -> &[T] {
        &self.parsed
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// Consumes the parser, keeping only its output.
    pub fn finish(self) -> ParsedCsv<T> {
        ParsedCsv {
            rows: self.parsed,
            header: self.header,
            errors: self.errors,
        }
    }
}

/// Linear scan of `header` for `name`, shared with already-parsed output.
pub fn column_index(header: Option<&[String]>, name: &str) -> Option<usize> {
    match header {
        Some(header) if !header.is_empty() => header.iter().position(|col| col == name),
        _ => {
            warn!("No header recorded; parse with a header before looking up column '{}'", name);
            None
        }
    }
}

impl<T> ParsedCsv<T> {
    /// See [`CsvParser::column_index`].
    pub fn column_index(&self, name: &str) -> Option<usize> {
        column_index(self.header.as_deref(), name)
    }
}
