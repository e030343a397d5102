//! Extraction strategy for the normalized (Anki 24.x+) schema.
//!
//! Newer collections keep decks and note types in dedicated tables. The
//! `notetypes.config` column is a binary-serialized (protobuf) blob that
//! this crate does not decode; field and template names are recovered from
//! the optional `fields` and `templates` tables instead, and without those
//! the lists stay empty.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;
use crate::extract;
use crate::metadata::{
    CollectionMetadata, DeckSummary, NoteTypeKind, NoteTypeSummary, Statistics, TagCount,
};

/// A note type assembled from the `notetypes` row plus the optional
/// `fields` and `templates` tables.
#[derive(Debug, Default)]
struct ModernNoteType {
    name: Option<String>,
    fields: Vec<String>,
    templates: Vec<String>,
    cloze: bool,
}

/// What a decoded `notetypes.config` blob would contribute.
#[derive(Debug, Default)]
struct NoteTypeConfig {
    fields: Vec<String>,
    templates: Vec<String>,
    is_cloze: bool,
}

/// Placeholder for decoding the `notetypes.config` protobuf blob.
///
/// The blob is a binary-serialized structure this crate deliberately does
/// not parse, so the result is always empty field/template lists and a
/// non-cloze kind. When the supplementary `fields` and `templates` tables
/// are also absent, note type summaries end up with empty field lists and
/// zero template counts; that capability gap is documented rather than
/// hidden.
fn decode_notetype_config(_config: &[u8]) -> NoteTypeConfig {
    NoteTypeConfig::default()
}

/// Extract metadata from a normalized-schema collection database.
///
/// Nothing here is individually fatal apart from a broken handle: each
/// table is read in isolation and degrades to empty defaults when missing
/// or unreadable.
pub fn extract_modern(conn: &Connection) -> Result<CollectionMetadata> {
    let decks = deck_names(conn);
    let mut notetypes = note_types(conn);
    attach_names(conn, &mut notetypes, "fields", |nt| &mut nt.fields);
    attach_names(conn, &mut notetypes, "templates", |nt| &mut nt.templates);

    let stats = extract::card_statistics(conn);
    let total_notes = extract::total_notes(conn);
    let tags = tag_counts(conn);
    let average_ease = extract::average_ease(conn);
    let (created, modified) = timestamps(conn);

    Ok(CollectionMetadata {
        schema: "Anki 24.x+".to_string(),
        created,
        modified,
        decks: deck_summaries(&decks, &stats),
        models: note_type_summaries(conn, &notetypes),
        tags,
        statistics: Statistics {
            total_notes,
            total_cards: stats.total,
            average_ease,
            card_distribution: stats.distribution,
        },
    })
}

/// Read `decks(id, name)` into a map. Degrades to empty.
fn deck_names(conn: &Connection) -> HashMap<i64, Option<String>> {
    let result = (|| -> rusqlite::Result<HashMap<i64, Option<String>>> {
        let mut stmt = conn.prepare("SELECT id, name FROM decks")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect()
    })();
    match result {
        Ok(decks) => decks,
        Err(e) => {
            warn!("decks table unavailable, deck list defaults to empty: {e}");
            HashMap::new()
        }
    }
}

/// Read `notetypes(id, name, config)` into a map, passing each config blob
/// through the no-op decoder. Degrades to empty.
fn note_types(conn: &Connection) -> HashMap<i64, ModernNoteType> {
    let result = (|| -> rusqlite::Result<HashMap<i64, ModernNoteType>> {
        let mut stmt = conn.prepare("SELECT id, name, config FROM notetypes")?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let name: Option<String> = row.get(1)?;
            let config: Option<Vec<u8>> = row.get(2)?;
            Ok((id, name, config))
        })?;

        let mut notetypes = HashMap::new();
        for row in rows {
            let (id, name, config) = row?;
            let config = config
                .as_deref()
                .map(decode_notetype_config)
                .unwrap_or_default();
            notetypes.insert(
                id,
                ModernNoteType {
                    name,
                    fields: config.fields,
                    templates: config.templates,
                    cloze: config.is_cloze,
                },
            );
        }
        Ok(notetypes)
    })();
    match result {
        Ok(notetypes) => notetypes,
        Err(e) => {
            warn!("notetypes table unavailable, note type list defaults to empty: {e}");
            HashMap::new()
        }
    }
}

/// Append names from the optional `fields` or `templates` table, ordered by
/// `(ntid, ord)`. Missing tables are expected and only logged.
fn attach_names(
    conn: &Connection,
    notetypes: &mut HashMap<i64, ModernNoteType>,
    table: &str,
    target: impl Fn(&mut ModernNoteType) -> &mut Vec<String>,
) {
    let result = (|| -> rusqlite::Result<()> {
        let mut stmt =
            conn.prepare(&format!("SELECT ntid, name FROM {table} ORDER BY ntid, ord"))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (ntid, name) = row?;
            if let Some(notetype) = notetypes.get_mut(&ntid) {
                target(notetype).push(name);
            }
        }
        Ok(())
    })();
    if let Err(e) = result {
        debug!("no usable {table} table: {e}");
    }
}

/// Tag frequency, preferring the dedicated `tags` table (one row per tag)
/// and falling back to scanning `notes.tags` when the table is missing or
/// empty.
fn tag_counts(conn: &Connection) -> Vec<TagCount> {
    match query_tag_table(conn) {
        Ok(tags) if !tags.is_empty() => tags,
        Ok(_) => {
            debug!("tags table empty, falling back to note tag strings");
            extract::tags_from_notes(conn)
        }
        Err(e) => {
            debug!("no usable tags table ({e}), falling back to note tag strings");
            extract::tags_from_notes(conn)
        }
    }
}

fn query_tag_table(conn: &Connection) -> rusqlite::Result<Vec<TagCount>> {
    let mut stmt = conn.prepare("SELECT tag FROM tags")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut counts: HashMap<String, (i64, usize)> = HashMap::new();
    let mut order = 0usize;
    for tag in rows {
        let tag = tag?;
        if tag.is_empty() {
            continue;
        }
        let entry = counts.entry(tag).or_insert_with(|| {
            let slot = (0, order);
            order += 1;
            slot
        });
        entry.0 += 1;
    }
    Ok(extract::top_tags(counts))
}

/// Creation and modification timestamps in milliseconds.
///
/// Prefers the `col(crt, mod)` row (crt is seconds, mod already
/// source-native). Falls back to note ids, which are millisecond epoch
/// timestamps in this schema, with `MAX(mod)` scaled from seconds. Last
/// resort is the current wall clock.
fn timestamps(conn: &Connection) -> (i64, i64) {
    let col = conn.query_row("SELECT crt, mod FROM col", [], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    });
    match col {
        Ok((crt, modified)) => (crt * 1000, modified),
        Err(e) => {
            debug!("no usable col row for timestamps ({e}), trying notes");
            note_timestamps(conn)
        }
    }
}

fn note_timestamps(conn: &Connection) -> (i64, i64) {
    let bounds = conn.query_row("SELECT MIN(id), MAX(mod) FROM notes", [], |row| {
        Ok((
            row.get::<_, Option<i64>>(0)?,
            row.get::<_, Option<i64>>(1)?,
        ))
    });
    match bounds {
        Ok((Some(created), Some(modified))) => (created, modified * 1000),
        Ok(_) => {
            debug!("notes table empty, timestamps default to now");
            (now_millis(), now_millis())
        }
        Err(e) => {
            debug!("could not determine timestamps from notes: {e}");
            (now_millis(), now_millis())
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Build deck summaries, omitting decks without cards. The legacy path
/// keeps empty decks; this one does not.
fn deck_summaries(
    decks: &HashMap<i64, Option<String>>,
    stats: &extract::CardStatistics,
) -> Vec<DeckSummary> {
    let mut summaries = Vec::new();
    for (&id, name) in decks {
        let counts = stats.by_deck.get(&id).copied().unwrap_or_default();
        if counts.total == 0 {
            continue;
        }
        summaries.push(DeckSummary {
            id,
            name: name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unnamed Deck".to_string()),
            description: String::new(),
            new_cards: counts.new,
            learning_cards: counts.learning,
            review_cards: counts.review,
            total_cards: counts.total,
            is_dynamic: false,
        });
    }
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

/// Build note type summaries, keeping only types with at least one note.
fn note_type_summaries(
    conn: &Connection,
    notetypes: &HashMap<i64, ModernNoteType>,
) -> Vec<NoteTypeSummary> {
    let note_counts = extract::note_counts_by_model(conn);

    let mut summaries = Vec::new();
    for (&id, notetype) in notetypes {
        let note_count = note_counts.get(&id).copied().unwrap_or_default();
        if note_count == 0 {
            continue;
        }
        summaries.push(NoteTypeSummary {
            id,
            name: notetype
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unnamed Note Type".to_string()),
            field_count: notetype.fields.len(),
            template_count: notetype.templates.len(),
            kind: if notetype.cloze {
                NoteTypeKind::Cloze
            } else {
                NoteTypeKind::Standard
            },
            fields: notetype.fields.clone(),
            note_count,
        });
    }
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_decode_is_a_stub() {
        let config = decode_notetype_config(&[0x0a, 0x05, 0x42, 0x61, 0x73, 0x69, 0x63]);
        assert!(config.fields.is_empty());
        assert!(config.templates.is_empty());
        assert!(!config.is_cloze);
    }
}
