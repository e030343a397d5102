//! Metadata extraction entry point and shared aggregation routines.
//!
//! Anki has shipped two generations of collection schema: the legacy layout
//! (2.1.x) keeps decks and note types as JSON blobs inside a single `col`
//! row, while the newer layout (24.x+) normalizes them into dedicated
//! tables. [`extract_metadata`] inspects the database and dispatches to one
//! of the two strategies; the routines here are the aggregation steps both
//! strategies share, because the `notes` and `cards` tables kept a stable
//! shape across both generations.

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;
use crate::metadata::{CardDistribution, CollectionMetadata, TagCount};

/// Tag lists are truncated to this many entries.
pub(crate) const MAX_TAGS: usize = 20;

/// Extract collection metadata, selecting the schema strategy automatically.
///
/// The presence of a `notetypes` table identifies the normalized 24.x+
/// schema; anything else is treated as the legacy single-row layout.
///
/// # Example
///
/// ```no_run
/// use rusqlite::Connection;
///
/// # fn example() -> apkg_inspect::Result<()> {
/// let conn = Connection::open("collection.anki2")?;
/// let metadata = apkg_inspect::extract_metadata(&conn)?;
/// println!("{} decks, {} cards", metadata.decks.len(), metadata.statistics.total_cards);
/// # Ok(())
/// # }
/// ```
pub fn extract_metadata(conn: &Connection) -> Result<CollectionMetadata> {
    if table_exists(conn, "notetypes")? {
        debug!("notetypes table present, reading normalized schema");
        crate::modern::extract_modern(conn)
    } else {
        debug!("no notetypes table, reading legacy schema");
        crate::legacy::extract_legacy(conn)
    }
}

/// Check whether a table exists in the opened database.
pub(crate) fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([name])?)
}

/// Per-deck card counts. Relearning cards appear only in the global
/// distribution; per deck, `total` covers exactly new + learning + review.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DeckCardCounts {
    pub new: i64,
    pub learning: i64,
    pub review: i64,
    pub total: i64,
}

/// Card counts grouped by deck plus the collection-wide distribution.
#[derive(Debug, Clone, Default)]
pub(crate) struct CardStatistics {
    pub by_deck: HashMap<i64, DeckCardCounts>,
    pub distribution: CardDistribution,
    pub total: i64,
}

/// Count cards grouped by (deck id, state code).
///
/// State codes: 0 = new, 1 = learning, 2 = review, 3 = relearning.
/// Degrades to all-zero statistics if the `cards` table is unreadable.
pub(crate) fn card_statistics(conn: &Connection) -> CardStatistics {
    match query_card_statistics(conn) {
        Ok(stats) => stats,
        Err(e) => {
            warn!("card statistics unavailable, counts default to zero: {e}");
            CardStatistics::default()
        }
    }
}

fn query_card_statistics(conn: &Connection) -> rusqlite::Result<CardStatistics> {
    let mut stmt = conn.prepare("SELECT did, type, COUNT(*) FROM cards GROUP BY did, type")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut stats = CardStatistics::default();
    for row in rows {
        let (deck_id, state, count) = row?;
        let bucket = stats.by_deck.entry(deck_id).or_default();
        stats.total += count;
        match state {
            0 => {
                bucket.new += count;
                bucket.total += count;
                stats.distribution.new += count;
            }
            1 => {
                bucket.learning += count;
                bucket.total += count;
                stats.distribution.learning += count;
            }
            2 => {
                bucket.review += count;
                bucket.total += count;
                stats.distribution.review += count;
            }
            3 => stats.distribution.relearning += count,
            other => {
                debug!(state = other, "card rows with unknown state counted in the global total only")
            }
        }
    }
    Ok(stats)
}

/// Total number of notes. Degrades to zero if the table is unreadable.
pub(crate) fn total_notes(conn: &Connection) -> i64 {
    match conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0)) {
        Ok(count) => count,
        Err(e) => {
            warn!("note count unavailable, defaulting to zero: {e}");
            0
        }
    }
}

/// Note counts keyed by note type id. Degrades to an empty map.
pub(crate) fn note_counts_by_model(conn: &Connection) -> HashMap<i64, i64> {
    match query_note_counts(conn) {
        Ok(counts) => counts,
        Err(e) => {
            warn!("per-model note counts unavailable: {e}");
            HashMap::new()
        }
    }
}

fn query_note_counts(conn: &Connection) -> rusqlite::Result<HashMap<i64, i64>> {
    let mut stmt = conn.prepare("SELECT mid, COUNT(*) FROM notes GROUP BY mid")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
    rows.collect()
}

/// Tag frequency from the space-delimited `notes.tags` column.
///
/// Splits each note's tag string on whitespace and counts occurrences,
/// ignoring empty tokens. Degrades to an empty list.
pub(crate) fn tags_from_notes(conn: &Connection) -> Vec<TagCount> {
    match query_note_tags(conn) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("tag scan over notes failed, tag list defaults to empty: {e}");
            Vec::new()
        }
    }
}

fn query_note_tags(conn: &Connection) -> rusqlite::Result<Vec<TagCount>> {
    let mut stmt = conn.prepare("SELECT tags FROM notes WHERE tags != ''")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut counts: HashMap<String, (i64, usize)> = HashMap::new();
    let mut order = 0usize;
    for tag_string in rows {
        for tag in tag_string?.split_whitespace() {
            let entry = counts.entry(tag.to_string()).or_insert_with(|| {
                let slot = (0, order);
                order += 1;
                slot
            });
            entry.0 += 1;
        }
    }
    Ok(top_tags(counts))
}

/// Sort tag counts descending, break ties by first-encountered order, and
/// truncate to [`MAX_TAGS`].
pub(crate) fn top_tags(counts: HashMap<String, (i64, usize)>) -> Vec<TagCount> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
        count_b.cmp(count_a).then(seen_a.cmp(seen_b))
    });
    entries.truncate(MAX_TAGS);
    entries
        .into_iter()
        .map(|(tag, (count, _))| TagCount { tag, count })
        .collect()
}

/// Average ease factor over review cards with a positive factor.
///
/// Anki stores ease as permille (2500 = 250%); the result is divided by ten
/// and rounded so it reads as a percentage. `None` when no card qualifies
/// or the query fails.
pub(crate) fn average_ease(conn: &Connection) -> Option<i64> {
    let avg = conn.query_row(
        "SELECT AVG(factor) FROM cards WHERE type = 2 AND factor > 0",
        [],
        |row| row.get::<_, Option<f64>>(0),
    );
    match avg {
        Ok(Some(factor)) => Some((factor / 10.0).round() as i64),
        Ok(None) => None,
        Err(e) => {
            warn!("average ease unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with_cards(rows: &[(i64, i64, i64, i64)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE cards (id INTEGER PRIMARY KEY, did INTEGER, type INTEGER, factor INTEGER)",
        )
        .unwrap();
        for (id, did, state, factor) in rows {
            conn.execute(
                "INSERT INTO cards (id, did, type, factor) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, did, state, factor],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn card_statistics_groups_by_deck_and_state() {
        let conn = conn_with_cards(&[
            (1, 2, 0, 0),
            (2, 2, 0, 0),
            (3, 2, 2, 2500),
            (4, 3, 1, 0),
            (5, 3, 3, 2100),
        ]);
        let stats = card_statistics(&conn);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.distribution.new, 2);
        assert_eq!(stats.distribution.learning, 1);
        assert_eq!(stats.distribution.review, 1);
        assert_eq!(stats.distribution.relearning, 1);
        assert_eq!(stats.distribution.total(), stats.total);

        let deck2 = stats.by_deck[&2];
        assert_eq!((deck2.new, deck2.review, deck2.total), (2, 1, 3));

        // Relearning stays out of the per-deck breakdown and total.
        let deck3 = stats.by_deck[&3];
        assert_eq!((deck3.learning, deck3.total), (1, 1));
        assert_eq!(deck3.new + deck3.learning + deck3.review, deck3.total);
    }

    #[test]
    fn card_statistics_degrades_without_table() {
        let conn = Connection::open_in_memory().unwrap();
        let stats = card_statistics(&conn);
        assert_eq!(stats.total, 0);
        assert!(stats.by_deck.is_empty());
    }

    #[test]
    fn average_ease_rounds_permille_to_percent() {
        let conn = conn_with_cards(&[(1, 2, 2, 2200), (2, 2, 2, 2800)]);
        assert_eq!(average_ease(&conn), Some(250));
    }

    #[test]
    fn average_ease_ignores_non_review_and_zero_factor() {
        let conn = conn_with_cards(&[(1, 2, 0, 2500), (2, 2, 2, 0)]);
        assert_eq!(average_ease(&conn), None);
    }

    #[test]
    fn top_tags_sorts_by_count_then_first_seen() {
        let mut counts = HashMap::new();
        counts.insert("late".to_string(), (3, 5));
        counts.insert("early".to_string(), (3, 1));
        counts.insert("rare".to_string(), (1, 0));
        counts.insert("common".to_string(), (7, 9));

        let tags = top_tags(counts);
        let names: Vec<_> = tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, ["common", "early", "late", "rare"]);
    }

    #[test]
    fn top_tags_truncates_to_twenty() {
        let counts: HashMap<String, (i64, usize)> = (0..30)
            .map(|i| (format!("tag{i}"), (30 - i as i64, i)))
            .collect();
        assert_eq!(top_tags(counts).len(), MAX_TAGS);
    }

    #[test]
    fn table_exists_reports_presence() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE notetypes (id INTEGER PRIMARY KEY)")
            .unwrap();
        assert!(table_exists(&conn, "notetypes").unwrap());
        assert!(!table_exists(&conn, "decks").unwrap());
    }
}
