use serde::{Deserialize, Serialize};

/// Column titles fabricated when a document contains no columns at all
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Root of a parsed board document
///
/// The board is a transient view derived from text. Nothing here is persisted
/// except through [`crate::serialize`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Free text appearing before the first column heading
    pub preamble: String,
    pub columns: Vec<Column>,
    pub settings: BoardSettings,
}

/// A `## heading` and the tasks under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    pub cards: Vec<Card>,
    pub settings: ColumnSettings,
}

/// A single `- [ ]` task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub text: String,
    /// Indented lines following the task, joined by `\n`
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    /// Cards moved into this column are marked completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_complete: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_thumbnails: Option<bool>,
}

impl Board {
    pub fn find_column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn find_column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// First card with this id, scanning columns in order
    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| card.id == card_id)
    }

    pub fn find_card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.columns
            .iter_mut()
            .flat_map(|c| c.cards.iter_mut())
            .find(|card| card.id == card_id)
    }

    /// Locate a card as `(column index, card index)`
    pub fn locate_card(&self, card_id: &str) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column
                .cards
                .iter()
                .position(|card| card.id == card_id)
                .map(|pos| (ci, pos))
        })
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    /// Semantic equality: everything except entity ids.
    pub fn content_eq(&self, other: &Board) -> bool {
        self.preamble == other.preamble
            && self.settings.shows_thumbnails() == other.settings.shows_thumbnails()
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.content_eq(b))
    }
}

impl BoardSettings {
    /// Thumbnails are shown unless explicitly disabled
    pub fn shows_thumbnails(&self) -> bool {
        self.show_thumbnails.unwrap_or(true)
    }
}

impl Column {
    pub fn new(id: String, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            cards: Vec::new(),
            settings: ColumnSettings::default(),
        }
    }

    pub fn is_auto_complete(&self) -> bool {
        self.settings.auto_complete == Some(true)
    }

    pub fn content_eq(&self, other: &Column) -> bool {
        self.title == other.title
            && self.is_auto_complete() == other.is_auto_complete()
            && self.cards.len() == other.cards.len()
            && self
                .cards
                .iter()
                .zip(&other.cards)
                .all(|(a, b)| a.content_eq(b))
    }
}

impl Card {
    pub fn new(id: String, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            description: String::new(),
            completed: false,
        }
    }

    pub fn content_eq(&self, other: &Card) -> bool {
        self.text == other.text
            && self.description == other.description
            && self.completed == other.completed
    }
}
