//! Serializable form of the board operations.
//!
//! A Live View sends these instead of full text when it wants the host to
//! perform the edit. Each variant maps one-to-one onto a function in
//! [`crate::operations`].

use crate::operations::{self, BoardSettingsPatch, CardPatch, ColumnSettingsPatch};
use markban_parser::{Board, IdGenerator};
use serde::{Deserialize, Serialize};

/// Semantic board edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    MoveCard {
        card_id: String,
        to_column_id: String,
        to_index: usize,
    },
    ToggleCard {
        card_id: String,
    },
    AddCard {
        column_id: String,
        text: String,
        #[serde(default)]
        at_index: Option<usize>,
    },
    UpdateCard {
        card_id: String,
        #[serde(flatten)]
        patch: CardPatch,
    },
    DeleteCard {
        card_id: String,
    },
    AddColumn {
        title: String,
        #[serde(default)]
        at_index: Option<usize>,
    },
    UpdateColumnTitle {
        column_id: String,
        title: String,
    },
    DeleteColumn {
        column_id: String,
    },
    MoveColumn {
        column_id: String,
        to_index: usize,
    },
    UpdateColumnSettings {
        column_id: String,
        settings: ColumnSettingsPatch,
    },
    UpdateBoardSettings {
        settings: BoardSettingsPatch,
    },
}

/// What a mutation did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The board changed
    Applied,
    /// A card or column was created with this id
    Created(String),
    /// An id did not resolve; the board is unchanged
    Noop,
}

impl MutationOutcome {
    fn from_applied(applied: bool) -> Self {
        if applied {
            MutationOutcome::Applied
        } else {
            MutationOutcome::Noop
        }
    }

    pub fn changed(&self) -> bool {
        !matches!(self, MutationOutcome::Noop)
    }
}

impl Mutation {
    /// Apply with randomly generated ids for new entities
    pub fn apply(&self, board: &mut Board) -> MutationOutcome {
        self.apply_with_ids(board, &mut IdGenerator::random())
    }

    pub fn apply_with_ids(&self, board: &mut Board, ids: &mut IdGenerator) -> MutationOutcome {
        match self {
            Mutation::MoveCard {
                card_id,
                to_column_id,
                to_index,
            } => MutationOutcome::from_applied(operations::move_card(
                board,
                card_id,
                to_column_id,
                *to_index,
            )),

            Mutation::ToggleCard { card_id } => {
                MutationOutcome::from_applied(operations::toggle_card(board, card_id))
            }

            Mutation::AddCard {
                column_id,
                text,
                at_index,
            } => match operations::add_card_with_ids(board, column_id, text, *at_index, ids) {
                Some(id) => MutationOutcome::Created(id),
                None => MutationOutcome::Noop,
            },

            Mutation::UpdateCard { card_id, patch } => MutationOutcome::from_applied(
                operations::update_card(board, card_id, patch.clone()),
            ),

            Mutation::DeleteCard { card_id } => {
                MutationOutcome::from_applied(operations::delete_card(board, card_id))
            }

            Mutation::AddColumn { title, at_index } => MutationOutcome::Created(
                operations::add_column_with_ids(board, title, *at_index, ids),
            ),

            Mutation::UpdateColumnTitle { column_id, title } => MutationOutcome::from_applied(
                operations::update_column_title(board, column_id, title),
            ),

            Mutation::DeleteColumn { column_id } => {
                MutationOutcome::from_applied(operations::delete_column(board, column_id))
            }

            Mutation::MoveColumn {
                column_id,
                to_index,
            } => {
                MutationOutcome::from_applied(operations::move_column(board, column_id, *to_index))
            }

            Mutation::UpdateColumnSettings {
                column_id,
                settings,
            } => MutationOutcome::from_applied(operations::update_column_settings(
                board,
                column_id,
                settings.clone(),
            )),

            Mutation::UpdateBoardSettings { settings } => MutationOutcome::from_applied(
                operations::update_board_settings(board, settings.clone()),
            ),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::MoveCard { .. } => "moveCard",
            Mutation::ToggleCard { .. } => "toggleCard",
            Mutation::AddCard { .. } => "addCard",
            Mutation::UpdateCard { .. } => "updateCard",
            Mutation::DeleteCard { .. } => "deleteCard",
            Mutation::AddColumn { .. } => "addColumn",
            Mutation::UpdateColumnTitle { .. } => "updateColumnTitle",
            Mutation::DeleteColumn { .. } => "deleteColumn",
            Mutation::MoveColumn { .. } => "moveColumn",
            Mutation::UpdateColumnSettings { .. } => "updateColumnSettings",
            Mutation::UpdateBoardSettings { .. } => "updateBoardSettings",
        }
    }
}
