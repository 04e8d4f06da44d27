//! CSV Module
//!
//! Fault-tolerant line parsing with pluggable row construction, and search
//! over the parsed rows.

mod creator;
mod parser;
mod search;

pub use creator::{RowCreator, RowError, TrivialCreator};
pub use parser::{column_index, split_fields, CsvParser, ParsedCsv};
pub use search::search;
