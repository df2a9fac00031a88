use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::constants::parser::{MAX_COLUMNS, MIN_COLUMNS, TOKEN_PATTERN};
use crate::data::SampleRecord;
use crate::errors::FileListError;
use crate::types::ListRow;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// One tokenized row together with its 1-based line number in the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRow {
    /// Line the row was read from, counting blank lines.
    pub line: usize,
    /// Word-like tokens of the row.
    pub tokens: ListRow,
}

/// Tokenize one list file into rows of 2-4 word-like tokens.
///
/// Lines without any token are skipped. Every row must have the same token
/// count as the first row; otherwise nothing is returned. Content that is not
/// valid UTF-8 is rejected as malformed at the first offending line.
pub fn read_rows(path: &Path) -> Result<Vec<ParsedRow>, FileListError> {
    if !path.is_file() {
        return Err(FileListError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let content = String::from_utf8(fs::read(path)?).map_err(|err| {
        let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
        FileListError::MalformedList {
            path: path.to_path_buf(),
            line: valid.iter().filter(|byte| **byte == b'\n').count() + 1,
            details: "line is not valid UTF-8".to_string(),
        }
    })?;
    parse_rows(&content, path)
}

/// Tokenize list `content`; `path` is only used for error reporting.
pub fn parse_rows(content: &str, path: &Path) -> Result<Vec<ParsedRow>, FileListError> {
    let mut rows: Vec<ParsedRow> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let tokens: ListRow = token_re()
            .find_iter(line)
            .map(|token| token.as_str().to_string())
            .collect();
        if tokens.is_empty() {
            continue;
        }
        if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&tokens.len()) {
            return Err(FileListError::MalformedList {
                path: path.to_path_buf(),
                line: idx + 1,
                details: format!(
                    "line '{}' has {} columns, expected between {MIN_COLUMNS} and {MAX_COLUMNS}",
                    line.trim_end(),
                    tokens.len()
                ),
            });
        }
        if let Some(first) = rows.first()
            && first.tokens.len() != tokens.len()
        {
            return Err(FileListError::MalformedList {
                path: path.to_path_buf(),
                line: idx + 1,
                details: format!(
                    "line '{}' has {} columns but the first row {:?} has {}",
                    line.trim_end(),
                    tokens.len(),
                    first.tokens,
                    first.tokens.len()
                ),
            });
        }
        rows.push(ParsedRow {
            line: idx + 1,
            tokens,
        });
    }
    Ok(rows)
}

/// Map parsed rows onto records for the requested column `arity`.
///
/// | arity | row layout                          |
/// |-------|-------------------------------------|
/// | 2     | `sample client`                     |
/// | 3     | `sample model [client]`             |
/// | 4     | `sample model claimed [client]`     |
///
/// A missing trailing client column falls back to the model column.
pub fn rows_to_records(
    rows: Vec<ParsedRow>,
    arity: usize,
    path: &Path,
) -> Result<Vec<SampleRecord>, FileListError> {
    let accepted: &[usize] = match arity {
        2 => &[2],
        3 => &[2, 3],
        4 => &[3, 4],
        other => {
            return Err(FileListError::Configuration(format!(
                "column count {other} cannot be interpreted"
            )));
        }
    };
    let mut records = Vec::with_capacity(rows.len());
    for ParsedRow { line, tokens } in rows {
        if !accepted.contains(&tokens.len()) {
            return Err(FileListError::MalformedList {
                path: path.to_path_buf(),
                line,
                details: format!(
                    "row {tokens:?} has {} columns, a {arity}-column list accepts {accepted:?}",
                    tokens.len()
                ),
            });
        }
        records.push(record_from_row(tokens, arity));
    }
    Ok(records)
}

fn record_from_row(row: ListRow, arity: usize) -> SampleRecord {
    let mut tokens = row.into_iter();
    let id = tokens.next().unwrap_or_default();
    let second = tokens.next().unwrap_or_default();
    match arity {
        2 => SampleRecord::new(id, second, None, None),
        3 => {
            let client = tokens.next().unwrap_or_else(|| second.clone());
            SampleRecord::new(id, client, Some(second), None)
        }
        _ => {
            let claimed = tokens.next().unwrap_or_default();
            let client = tokens.next().unwrap_or_else(|| second.clone());
            SampleRecord::new(id, client, Some(second), Some(claimed))
        }
    }
}

/// Read `path` and map its rows for `arity` in one step.
pub fn read_records(path: &Path, arity: usize) -> Result<Vec<SampleRecord>, FileListError> {
    let rows = read_rows(path)?;
    rows_to_records(rows, arity, path)
}
