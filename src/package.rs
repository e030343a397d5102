//! Opening .apkg containers.
//!
//! An .apkg export is a ZIP archive holding the collection SQLite database
//! (plus media, which this crate ignores). Newer exports ship the database
//! as `collection.anki21b`, compressed with zstd; older ones ship an
//! uncompressed `collection.anki21` or `collection.anki2`. The database is
//! staged into a temporary directory so SQLite can open it from disk.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::extract::extract_metadata;
use crate::metadata::CollectionMetadata;

/// Collection database members in preference order, newest format first.
const COLLECTION_MEMBERS: [&str; 3] = [
    "collection.anki21b",
    "collection.anki21",
    "collection.anki2",
];

/// An opened .apkg package.
///
/// Holds the SQLite handle over the staged collection database. The staging
/// directory lives as long as the package, so the handle stays valid.
///
/// # Example
///
/// ```no_run
/// use apkg_inspect::AnkiPackage;
///
/// # fn example() -> apkg_inspect::Result<()> {
/// let package = AnkiPackage::open("japanese-core.apkg")?;
/// let metadata = package.metadata()?;
/// println!("{} notes", metadata.statistics.total_notes);
/// # Ok(())
/// # }
/// ```
pub struct AnkiPackage {
    conn: Connection,
    member: &'static str,
    _staging: TempDir,
}

impl AnkiPackage {
    /// Open an .apkg file and stage its collection database.
    ///
    /// Picks the newest collection member present in the archive and
    /// decompresses the zstd variant. Fails with [`Error::NoCollection`]
    /// when the archive contains no collection database at all.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let member = COLLECTION_MEMBERS
            .into_iter()
            .find(|name| names.iter().any(|n| n == name))
            .ok_or_else(|| Error::NoCollection(path.display().to_string()))?;
        debug!(member, "staging collection database from package");

        let mut raw = Vec::new();
        archive.by_name(member)?.read_to_end(&mut raw)?;

        let staging = TempDir::new()?;
        let db_path = staging.path().join(member);
        if member.ends_with(".anki21b") {
            let mut out = File::create(&db_path)?;
            zstd::stream::copy_decode(Cursor::new(raw), &mut out)?;
        } else {
            std::fs::write(&db_path, &raw)?;
        }

        let conn = Connection::open(&db_path)?;
        Ok(Self {
            conn,
            member,
            _staging: staging,
        })
    }

    /// Name of the collection member that was opened.
    pub fn collection_member(&self) -> &'static str {
        self.member
    }

    /// The SQLite handle over the staged collection database.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Extract the normalized metadata record for this collection.
    pub fn metadata(&self) -> Result<CollectionMetadata> {
        extract_metadata(&self.conn)
    }
}
