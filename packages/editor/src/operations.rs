//! # Board Mutations
//!
//! Semantic edit operations on a [`Board`].
//!
//! ## Semantics
//!
//! - Every operation edits the board in place.
//! - An unknown card or column id is never an error: the board is left
//!   untouched. Ids can be invalidated at any moment by a reparse of
//!   externally edited text, so a stale id is an expected input.
//! - Indexes are clamped into range.
//!
//! ### Move
//! - The card is looked up across all columns (first match).
//! - Moving into an auto-complete column always marks the card completed.
//!
//! ### Updates
//! - Patches are partial: only fields that are `Some` are written.

use markban_parser::{Board, Card, Column, IdGenerator};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Partial update of a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of column settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_complete: Option<bool>,
}

/// Partial update of board settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_thumbnails: Option<bool>,
}

/// Move a card to `to_index` within the target column.
///
/// Returns false when either the card or the target column is missing.
pub fn move_card(board: &mut Board, card_id: &str, to_column_id: &str, to_index: usize) -> bool {
    let Some((from_col, from_pos)) = board.locate_card(card_id) else {
        trace!(card_id, "move_card: card not found");
        return false;
    };
    let Some(to_col) = board.columns.iter().position(|c| c.id == to_column_id) else {
        trace!(to_column_id, "move_card: target column not found");
        return false;
    };

    let mut card = board.columns[from_col].cards.remove(from_pos);
    let target = &mut board.columns[to_col];
    if target.is_auto_complete() {
        card.completed = true;
    }
    let index = to_index.min(target.cards.len());
    target.cards.insert(index, card);
    true
}

/// Flip the completed flag of a card
pub fn toggle_card(board: &mut Board, card_id: &str) -> bool {
    match board.find_card_mut(card_id) {
        Some(card) => {
            card.completed = !card.completed;
            true
        }
        None => {
            trace!(card_id, "toggle_card: card not found");
            false
        }
    }
}

/// Add an empty, incomplete card. Returns the new card id.
pub fn add_card(
    board: &mut Board,
    column_id: &str,
    text: &str,
    at_index: Option<usize>,
) -> Option<String> {
    add_card_with_ids(board, column_id, text, at_index, &mut IdGenerator::random())
}

pub fn add_card_with_ids(
    board: &mut Board,
    column_id: &str,
    text: &str,
    at_index: Option<usize>,
    ids: &mut IdGenerator,
) -> Option<String> {
    let Some(column) = board.find_column_mut(column_id) else {
        trace!(column_id, "add_card: column not found");
        return None;
    };

    let card = Card::new(ids.card_id(), text);
    let id = card.id.clone();
    insert_at(&mut column.cards, card, at_index);
    Some(id)
}

/// Update text and/or description of a card
pub fn update_card(board: &mut Board, card_id: &str, patch: CardPatch) -> bool {
    let Some(card) = board.find_card_mut(card_id) else {
        trace!(card_id, "update_card: card not found");
        return false;
    };
    if let Some(text) = patch.text {
        card.text = text;
    }
    if let Some(description) = patch.description {
        card.description = description;
    }
    true
}

/// Remove a card
pub fn delete_card(board: &mut Board, card_id: &str) -> bool {
    match board.locate_card(card_id) {
        Some((col, pos)) => {
            board.columns[col].cards.remove(pos);
            true
        }
        None => {
            trace!(card_id, "delete_card: card not found");
            false
        }
    }
}

/// Add an empty column. Returns the new column id.
pub fn add_column(board: &mut Board, title: &str, at_index: Option<usize>) -> String {
    add_column_with_ids(board, title, at_index, &mut IdGenerator::random())
}

pub fn add_column_with_ids(
    board: &mut Board,
    title: &str,
    at_index: Option<usize>,
    ids: &mut IdGenerator,
) -> String {
    let column = Column::new(ids.column_id(), title);
    let id = column.id.clone();
    insert_at(&mut board.columns, column, at_index);
    id
}

/// Rename a column
pub fn update_column_title(board: &mut Board, column_id: &str, title: &str) -> bool {
    let Some(column) = board.find_column_mut(column_id) else {
        trace!(column_id, "update_column_title: column not found");
        return false;
    };
    column.title = title.to_string();
    true
}

/// Remove a column together with its cards
pub fn delete_column(board: &mut Board, column_id: &str) -> bool {
    let before = board.columns.len();
    board.columns.retain(|c| c.id != column_id);
    if board.columns.len() == before {
        trace!(column_id, "delete_column: column not found");
        return false;
    }
    true
}

/// Reorder a column
pub fn move_column(board: &mut Board, column_id: &str, to_index: usize) -> bool {
    let Some(from) = board.columns.iter().position(|c| c.id == column_id) else {
        trace!(column_id, "move_column: column not found");
        return false;
    };
    let column = board.columns.remove(from);
    let index = to_index.min(board.columns.len());
    board.columns.insert(index, column);
    true
}

/// Shallow-merge column settings
pub fn update_column_settings(
    board: &mut Board,
    column_id: &str,
    patch: ColumnSettingsPatch,
) -> bool {
    let Some(column) = board.find_column_mut(column_id) else {
        trace!(column_id, "update_column_settings: column not found");
        return false;
    };
    match patch.auto_complete {
        Some(value) if column.settings.auto_complete != Some(value) => {
            column.settings.auto_complete = Some(value);
            true
        }
        _ => false,
    }
}

/// Shallow-merge board settings. Returns false when no field changed.
pub fn update_board_settings(board: &mut Board, patch: BoardSettingsPatch) -> bool {
    match patch.show_thumbnails {
        Some(value) if board.settings.show_thumbnails != Some(value) => {
            board.settings.show_thumbnails = Some(value);
            true
        }
        _ => false,
    }
}

fn insert_at<T>(items: &mut Vec<T>, item: T, at_index: Option<usize>) {
    match at_index {
        Some(index) => items.insert(index.min(items.len()), item),
        None => items.push(item),
    }
}
