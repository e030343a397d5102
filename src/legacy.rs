//! Extraction strategy for the legacy (Anki 2.1.x) schema.
//!
//! Legacy collections keep deck and note type definitions as JSON blobs in
//! the single row of the `col` table, keyed by id. That row is the one
//! mandatory input: a missing or empty `col` table, or an undecodable blob,
//! aborts the extraction. Everything else degrades to defaults.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::extract;
use crate::metadata::{
    CollectionMetadata, DeckSummary, NoteTypeKind, NoteTypeSummary, Statistics,
};

/// The reserved default deck; the legacy path always omits it.
const DEFAULT_DECK_ID: &str = "1";

/// A deck definition as stored in the `col.decks` JSON blob.
///
/// Anki writes many more keys (`lrnToday`, `collapsed`, ...); only the ones
/// used for the summary are decoded, everything else is ignored.
#[derive(Debug, Deserialize)]
struct LegacyDeck {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(rename = "dyn", default)]
    dynamic: Option<i64>,
}

/// A note type definition as stored in the `col.models` JSON blob.
#[derive(Debug, Deserialize)]
struct LegacyModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    flds: Vec<LegacyField>,
    #[serde(default)]
    tmpls: Vec<serde_json::Value>,
    /// 1 marks a cloze model.
    #[serde(rename = "type", default)]
    kind: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LegacyField {
    #[serde(default)]
    name: Option<String>,
}

/// Row of interest from the `col` table.
struct ColRow {
    decks_json: String,
    models_json: String,
    conf_json: String,
    created_secs: i64,
    modified: i64,
    ver: Option<i64>,
}

/// Extract metadata from a legacy-schema collection database.
///
/// Fatal conditions: missing/empty `col` table, or `decks`/`models`/`conf`
/// columns that do not decode as JSON objects. Optional data (cards, notes,
/// tags) degrades to zero/empty defaults on failure.
pub fn extract_legacy(conn: &Connection) -> Result<CollectionMetadata> {
    let col = read_col_row(conn)?;

    let decks: HashMap<String, LegacyDeck> =
        serde_json::from_str(&col.decks_json).map_err(|source| Error::MalformedJson {
            column: "decks",
            source,
        })?;
    let models: HashMap<String, LegacyModel> =
        serde_json::from_str(&col.models_json).map_err(|source| Error::MalformedJson {
            column: "models",
            source,
        })?;
    // conf is decoded for validation only; nothing in the summary uses it.
    let _conf: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&col.conf_json)
        .map_err(|source| Error::MalformedJson {
            column: "conf",
            source,
        })?;

    let stats = extract::card_statistics(conn);
    let total_notes = extract::total_notes(conn);
    let tags = extract::tags_from_notes(conn);
    let average_ease = extract::average_ease(conn);

    Ok(CollectionMetadata {
        schema: col
            .ver
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        created: col.created_secs * 1000,
        modified: col.modified,
        decks: deck_summaries(&decks, &stats),
        models: note_type_summaries(conn, &models),
        tags,
        statistics: Statistics {
            total_notes,
            total_cards: stats.total,
            average_ease,
            card_distribution: stats.distribution,
        },
    })
}

fn read_col_row(conn: &Connection) -> Result<ColRow> {
    let row = conn.query_row(
        "SELECT decks, models, conf, crt, mod, ver FROM col",
        [],
        |row| {
            Ok(ColRow {
                decks_json: row
                    .get::<_, Option<String>>(0)?
                    .unwrap_or_else(|| "{}".to_string()),
                models_json: row
                    .get::<_, Option<String>>(1)?
                    .unwrap_or_else(|| "{}".to_string()),
                conf_json: row
                    .get::<_, Option<String>>(2)?
                    .unwrap_or_else(|| "{}".to_string()),
                created_secs: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
                modified: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
                ver: row.get(5)?,
            })
        },
    );
    match row {
        Ok(col) => Ok(col),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::EmptyCollection),
        Err(e) => Err(e.into()),
    }
}

/// Build deck summaries from the decoded `decks` blob.
///
/// Decks with zero cards are kept here, unlike the normalized-schema path.
/// That asymmetry is deliberate; see DESIGN.md.
fn deck_summaries(
    decks: &HashMap<String, LegacyDeck>,
    stats: &extract::CardStatistics,
) -> Vec<DeckSummary> {
    let mut summaries = Vec::new();
    for (id, deck) in decks {
        if id == DEFAULT_DECK_ID {
            continue;
        }
        let Ok(id) = id.parse::<i64>() else {
            warn!(deck_id = %id, "skipping deck with non-numeric id");
            continue;
        };
        let counts = stats.by_deck.get(&id).copied().unwrap_or_default();
        summaries.push(DeckSummary {
            id,
            name: deck
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unnamed Deck".to_string()),
            description: deck.desc.clone().unwrap_or_default(),
            new_cards: counts.new,
            learning_cards: counts.learning,
            review_cards: counts.review,
            total_cards: counts.total,
            is_dynamic: deck.dynamic == Some(1),
        });
    }
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

/// Build note type summaries from the decoded `models` blob, keeping only
/// types that have at least one note.
fn note_type_summaries(
    conn: &Connection,
    models: &HashMap<String, LegacyModel>,
) -> Vec<NoteTypeSummary> {
    let note_counts = extract::note_counts_by_model(conn);

    let mut summaries = Vec::new();
    for (id, model) in models {
        let Ok(id) = id.parse::<i64>() else {
            warn!(model_id = %id, "skipping note type with non-numeric id");
            continue;
        };
        let note_count = note_counts.get(&id).copied().unwrap_or_default();
        if note_count == 0 {
            continue;
        }
        let fields: Vec<String> = model
            .flds
            .iter()
            .map(|f| f.name.clone().unwrap_or_default())
            .collect();
        summaries.push(NoteTypeSummary {
            id,
            name: model
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unnamed Note Type".to_string()),
            field_count: fields.len(),
            template_count: model.tmpls.len(),
            kind: if model.kind == Some(1) {
                NoteTypeKind::Cloze
            } else {
                NoteTypeKind::Standard
            },
            fields,
            note_count,
        });
    }
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}
