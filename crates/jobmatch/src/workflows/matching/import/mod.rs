//! CSV import of posting snapshots, normalizing timestamps at the boundary.

mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use super::domain::PostingSnapshot;

#[derive(Debug)]
pub enum PostingImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingTimestamp { line: u64 },
    InvalidTimestamp { line: u64, value: String },
}

impl std::fmt::Display for PostingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostingImportError::Io(err) => write!(f, "failed to read posting export: {}", err),
            PostingImportError::Csv(err) => write!(f, "invalid posting CSV data: {}", err),
            PostingImportError::MissingTimestamp { line } => {
                write!(f, "posting on line {} has no created_at value", line)
            }
            PostingImportError::InvalidTimestamp { line, value } => write!(
                f,
                "posting on line {} has unrecognized created_at '{}'",
                line, value
            ),
        }
    }
}

impl std::error::Error for PostingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PostingImportError::Io(err) => Some(err),
            PostingImportError::Csv(err) => Some(err),
            PostingImportError::MissingTimestamp { .. }
            | PostingImportError::InvalidTimestamp { .. } => None,
        }
    }
}

impl From<std::io::Error> for PostingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PostingImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads postings from a CSV export with the columns
/// `id,created_at,title,description,location,wage_min,wage_max,active`.
pub struct PostingImporter;

impl PostingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PostingSnapshot>, PostingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PostingSnapshot>, PostingImportError> {
        parser::parse_postings(reader)
    }
}
