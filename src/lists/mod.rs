//! List-file parsing and memoization.
//!
//! - `parser` turns one physical list into validated rows and sample records.
//! - `cache` memoizes parsed lists and model indexes per protocol, group, and kind.

/// Per-instance memo of parsed lists and model indexes.
pub mod cache;
/// Row tokenizer and row-to-record mapping.
pub mod parser;

pub use cache::{ListCache, SharedList};
pub use parser::{ParsedRow, parse_rows, read_records, read_rows, rows_to_records};
