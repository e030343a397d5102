//! Anki .apkg metadata inspection.
//!
//! This crate opens an Anki collection export (`.apkg`: a ZIP archive
//! containing a SQLite database, zstd-compressed in newer exports) and
//! produces one normalized metadata record: deck list, note type list, tag
//! frequency, and card statistics. It reads both generations of the
//! collection schema:
//!
//! - **Legacy (Anki 2.1.x)**: decks and note types live as JSON blobs in a
//!   single `col` row.
//! - **Normalized (Anki 24.x+)**: decks and note types are rows in
//!   dedicated tables, optionally supplemented by `fields` and `templates`
//!   tables.
//!
//! Extraction is best-effort: only the mandatory collection metadata source
//! is fatal, everything optional degrades to a documented default (empty
//! list, zero count, or `None`) with a logged diagnostic.
//!
//! # Example
//!
//! ```no_run
//! use apkg_inspect::AnkiPackage;
//!
//! # fn example() -> apkg_inspect::Result<()> {
//! let package = AnkiPackage::open("deck.apkg")?;
//! let metadata = package.metadata()?;
//!
//! for deck in &metadata.decks {
//!     println!("{}: {} cards", deck.name, deck.total_cards);
//! }
//! println!("{} notes total", metadata.statistics.total_notes);
//! # Ok(())
//! # }
//! ```
//!
//! An already-opened [`rusqlite::Connection`] can be inspected directly
//! with [`extract_metadata`], which picks the schema strategy, or with
//! [`extract_legacy`] / [`extract_modern`] to force one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod display;
pub mod error;
pub mod metadata;

mod extract;
mod legacy;
mod modern;
mod package;

pub use error::{Error, Result};
pub use extract::extract_metadata;
pub use legacy::extract_legacy;
pub use metadata::{
    CardDistribution, CollectionMetadata, DeckSummary, NoteTypeKind, NoteTypeSummary, Statistics,
    TagCount,
};
pub use modern::extract_modern;
pub use package::AnkiPackage;
