//! Shared fixtures: minimal collection databases in both schema layouts.
//!
//! The tables carry only the columns the extractor reads; real Anki
//! databases have more, but the queries under test never touch them.

#![allow(dead_code)]

use rusqlite::Connection;

/// Create the legacy (2.1.x) tables: single-row `col` plus `notes`/`cards`.
pub fn create_legacy_schema(conn: &Connection) {
    conn.execute_batch(
        "CREATE TABLE col (
            id INTEGER PRIMARY KEY,
            crt INTEGER,
            mod INTEGER,
            ver INTEGER,
            conf TEXT,
            models TEXT,
            decks TEXT
        );
        CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            mid INTEGER,
            mod INTEGER,
            tags TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE cards (
            id INTEGER PRIMARY KEY,
            nid INTEGER,
            did INTEGER,
            type INTEGER,
            factor INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
}

/// Insert the single `col` row with the given JSON blobs.
pub fn insert_col_row(conn: &Connection, decks_json: &str, models_json: &str) {
    conn.execute(
        "INSERT INTO col (id, crt, mod, ver, conf, models, decks)
         VALUES (1, 1700000000, 1700000500000, 11, '{}', ?1, ?2)",
        rusqlite::params![models_json, decks_json],
    )
    .unwrap();
}

/// Create the normalized (24.x+) tables. `fields`, `templates`, `tags`, and
/// `col` are optional in real exports, so tests add them separately.
pub fn create_modern_schema(conn: &Connection) {
    conn.execute_batch(
        "CREATE TABLE decks (id INTEGER PRIMARY KEY, name TEXT);
        CREATE TABLE notetypes (id INTEGER PRIMARY KEY, name TEXT, config BLOB);
        CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            mid INTEGER,
            mod INTEGER,
            tags TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE cards (
            id INTEGER PRIMARY KEY,
            nid INTEGER,
            did INTEGER,
            type INTEGER,
            factor INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
}

/// Add the optional `fields` and `templates` tables.
pub fn create_field_and_template_tables(conn: &Connection) {
    conn.execute_batch(
        "CREATE TABLE fields (ntid INTEGER, ord INTEGER, name TEXT);
        CREATE TABLE templates (ntid INTEGER, ord INTEGER, name TEXT);",
    )
    .unwrap();
}

/// Add the optional `tags` table (one row per tag occurrence).
pub fn create_tags_table(conn: &Connection) {
    conn.execute_batch("CREATE TABLE tags (tag TEXT)").unwrap();
}

/// Add the optional modern `col` table carrying only timestamps.
pub fn create_modern_col(conn: &Connection, crt_secs: i64, modified: i64) {
    conn.execute_batch("CREATE TABLE col (id INTEGER PRIMARY KEY, crt INTEGER, mod INTEGER)")
        .unwrap();
    conn.execute(
        "INSERT INTO col (id, crt, mod) VALUES (1, ?1, ?2)",
        rusqlite::params![crt_secs, modified],
    )
    .unwrap();
}

pub fn insert_note(conn: &Connection, id: i64, mid: i64, modified: i64, tags: &str) {
    conn.execute(
        "INSERT INTO notes (id, mid, mod, tags) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, mid, modified, tags],
    )
    .unwrap();
}

pub fn insert_card(conn: &Connection, id: i64, nid: i64, did: i64, state: i64, factor: i64) {
    conn.execute(
        "INSERT INTO cards (id, nid, did, type, factor) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, nid, did, state, factor],
    )
    .unwrap();
}

/// Legacy deck JSON object with the keys Anki writes.
pub fn legacy_deck_json(id: i64, name: &str, desc: &str, dynamic: i64) -> String {
    format!(
        r#"{{"id": {id}, "name": "{name}", "desc": "{desc}", "dyn": {dynamic}, "collapsed": false, "conf": 1}}"#
    )
}

/// Legacy model JSON object with two fields and one template.
pub fn legacy_model_json(id: i64, name: &str, kind: i64) -> String {
    format!(
        r#"{{"id": {id}, "name": "{name}", "type": {kind},
            "flds": [{{"name": "Front", "ord": 0}}, {{"name": "Back", "ord": 1}}],
            "tmpls": [{{"name": "Card 1", "ord": 0}}]}}"#
    )
}

/// The canonical scenario: deck 2 "Default" with 3 new cards and 2 review
/// cards (factors 2200 and 2800), model 10 "Basic" with 5 notes.
pub fn populate_canonical_cards_and_notes(conn: &Connection) {
    for i in 0..5 {
        insert_note(conn, 1000 + i, 10, 1700000000 + i, "");
    }
    for i in 0..3 {
        insert_card(conn, 2000 + i, 1000 + i, 2, 0, 0);
    }
    insert_card(conn, 2003, 1003, 2, 2, 2200);
    insert_card(conn, 2004, 1004, 2, 2, 2800);
}
