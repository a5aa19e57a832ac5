//! Column-name based CSV record mapper.
//!
//! The first row of the source is a header. Callers name the columns they
//! need and receive, for every data row, the values of those columns in the
//! order they were requested, whatever the physical column order is.
//! Unrecognised columns are ignored.

use crate::errors::error_chain_fmt;
use std::collections::HashMap;
use std::io::Read;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error)]
pub enum MapperError {
    #[error("Empty CSV source provided.")]
    EmptyInput,
    #[error("Header does not match expected columns, missing: {}.", .missing.join(", "))]
    HeaderMismatch { missing: Vec<String> },
    #[error("Line {line}: record has unexpected field count (expected {expected}, got {found}).")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: failed to map record.")]
    ConversionFailed {
        line: usize,
        #[source]
        source: BoxError,
    },
    /// The CSV itself could not be read. Line 0 is the header.
    #[error("Line {line}: failed to read record.")]
    Read {
        line: usize,
        #[source]
        source: csv::Error,
    },
}
impl std::fmt::Debug for MapperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Maps every data row of a CSV source into a `T` with a caller supplied function.
///
/// The conversion function receives the values of the requested columns, in
/// the requested order. Mapping is all-or-nothing: the first failing row
/// aborts the whole read.
pub struct RecordMapper<R, F> {
    reader: csv::Reader<R>,
    columns: Vec<String>,
    convert: F,
}

impl<R, F, T, E> RecordMapper<R, F>
where
    R: Read,
    F: FnMut(&[&str]) -> Result<T, E>,
    E: Into<BoxError>,
{
    pub fn new(source: R, columns: &[&str], convert: F) -> Self {
        // Field counts are checked against the header by `map_all`, so that
        // the error carries the data line.
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);

        Self {
            reader,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            convert,
        }
    }

    pub fn map_all(mut self) -> Result<Vec<T>, MapperError> {
        let mut record = csv::StringRecord::new();

        let has_header = self
            .reader
            .read_record(&mut record)
            .map_err(|source| MapperError::Read { line: 0, source })?;
        if !has_header {
            return Err(MapperError::EmptyInput);
        }

        let positions = self.column_positions(&record)?;
        let header_len = record.len();

        let mut entities = Vec::new();
        for line in 1.. {
            let has_record = self
                .reader
                .read_record(&mut record)
                .map_err(|source| MapperError::Read { line, source })?;
            if !has_record {
                break;
            }

            if record.len() != header_len {
                return Err(MapperError::MalformedRow {
                    line,
                    expected: header_len,
                    found: record.len(),
                });
            }

            let values: Vec<&str> = positions.iter().map(|&idx| &record[idx]).collect();
            let entity = (self.convert)(&values).map_err(|e| MapperError::ConversionFailed {
                line,
                source: e.into(),
            })?;
            entities.push(entity);
        }

        Ok(entities)
    }

    /// Physical index of every requested column, in the requested order.
    fn column_positions(&self, header: &csv::StringRecord) -> Result<Vec<usize>, MapperError> {
        // A repeated header name resolves to its last occurrence.
        let index: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();

        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|column| !index.contains_key(column.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(MapperError::HeaderMismatch { missing });
        }

        Ok(self
            .columns
            .iter()
            .map(|column| index[column.as_str()])
            .collect())
    }
}
