//! Error types for apkg-inspect.

use thiserror::Error;

/// Result type for apkg-inspect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening a package or extracting metadata.
///
/// Only the conditions below are fatal. Failures reading *optional* data
/// (a missing `fields` table, an unreadable `tags` row) are handled at the
/// point of use: the affected field degrades to its documented default and
/// a diagnostic is logged.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// SQLite error on a mandatory query.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No collection database found inside the package.
    #[error("no collection database in package: {0}")]
    NoCollection(String),

    /// The mandatory collection metadata table is missing or empty.
    #[error("collection table is missing or empty")]
    EmptyCollection,

    /// A mandatory JSON column could not be decoded.
    #[error("malformed '{column}' JSON in collection row: {source}")]
    MalformedJson {
        /// Column name within the `col` row.
        column: &'static str,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}
