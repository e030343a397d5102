//! The normalized metadata record produced by an extraction.
//!
//! Every type here is an immutable projection of the collection database,
//! built once per extraction call. Serialized field names use camelCase so
//! the JSON output matches what rendering layers expect (`newCards`,
//! `totalCards`, `cardDistribution`, ...).

use serde::Serialize;

/// Complete metadata for one Anki collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    /// Schema version tag: the `col.ver` number for legacy collections,
    /// `"Anki 24.x+"` for the normalized schema.
    pub schema: String,
    /// Collection creation time, milliseconds since epoch.
    pub created: i64,
    /// Last modification time, milliseconds since epoch.
    pub modified: i64,
    /// Deck summaries, sorted by name.
    pub decks: Vec<DeckSummary>,
    /// Note type summaries, sorted by name. Types with zero notes are omitted.
    pub models: Vec<NoteTypeSummary>,
    /// Top 20 tags by occurrence count, descending. Ties keep the order in
    /// which the tags were first encountered.
    pub tags: Vec<TagCount>,
    /// Collection-wide card and note statistics.
    pub statistics: Statistics,
}

/// Summary of a single deck.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    /// Deck id.
    pub id: i64,
    /// Deck name, `"Unnamed Deck"` when absent.
    pub name: String,
    /// Deck description. Always empty for the normalized schema, which does
    /// not carry one in the `decks` table.
    pub description: String,
    /// Cards in the new state.
    pub new_cards: i64,
    /// Cards in the learning state.
    pub learning_cards: i64,
    /// Cards in the review state.
    pub review_cards: i64,
    /// Sum of the new, learning, and review counts. Relearning cards are
    /// reported only in the global distribution.
    pub total_cards: i64,
    /// Whether this is a filtered (dynamic) deck. Only the legacy schema
    /// exposes the flag; always false for the normalized schema.
    pub is_dynamic: bool,
}

/// Summary of a note type (model).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteTypeSummary {
    /// Note type id.
    pub id: i64,
    /// Note type name, `"Unnamed Note Type"` when absent.
    pub name: String,
    /// Number of fields.
    pub field_count: usize,
    /// Number of card templates.
    pub template_count: usize,
    /// Standard or cloze.
    #[serde(rename = "type")]
    pub kind: NoteTypeKind,
    /// Field names in display order.
    pub fields: Vec<String>,
    /// Number of notes using this type.
    pub note_count: i64,
}

/// Whether a note type generates standard or cloze-deletion cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoteTypeKind {
    /// Regular front/back templates.
    Standard,
    /// Cloze deletion.
    Cloze,
}

/// A tag and how many times it occurs across the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    /// The tag string.
    pub tag: String,
    /// Occurrence count.
    pub count: i64,
}

/// Collection-wide statistics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Total number of notes.
    pub total_notes: i64,
    /// Total number of cards.
    pub total_cards: i64,
    /// Average ease factor over review cards with a positive factor,
    /// expressed as a percentage (Anki stores permille; 2500 becomes 250).
    /// `None` when no card qualifies.
    pub average_ease: Option<i64>,
    /// How cards are distributed across states.
    pub card_distribution: CardDistribution,
}

/// Card counts per scheduling state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardDistribution {
    /// Cards never studied.
    pub new: i64,
    /// Cards in the initial learning steps.
    pub learning: i64,
    /// Graduated cards under regular review.
    pub review: i64,
    /// Lapsed cards being relearned.
    pub relearning: i64,
}

impl CardDistribution {
    /// Sum across all four states.
    pub fn total(&self) -> i64 {
        self.new + self.learning + self.review + self.relearning
    }
}
