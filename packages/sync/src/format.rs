//! Document formats a controller can drive.
//!
//! The controller only ever moves full text between store and view; the
//! format decides what model travels alongside it and which structured
//! edits the view may send instead of text.

use markban_editor::Mutation;
use markban_parser::{Board, IdGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub trait SyncFormat: Send + Sync + 'static {
    type Model: Clone + Serialize + Send + Sync + 'static;
    type Edit: std::fmt::Debug + DeserializeOwned + Send + 'static;

    fn parse(&self, text: &str) -> Self::Model;

    fn serialize(&self, model: &Self::Model) -> String;

    /// Apply a structured edit. Returns false when nothing changed.
    fn apply_edit(&self, model: &mut Self::Model, edit: &Self::Edit) -> bool;
}

/// Task boards: the view receives the parsed [`Board`] and may send [`Mutation`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardFormat;

impl SyncFormat for BoardFormat {
    type Model = Board;
    type Edit = Mutation;

    fn parse(&self, text: &str) -> Board {
        markban_parser::parse_with_ids(text, &mut IdGenerator::random())
    }

    fn serialize(&self, model: &Board) -> String {
        markban_parser::serialize(model)
    }

    fn apply_edit(&self, model: &mut Board, edit: &Mutation) -> bool {
        let outcome = edit.apply(model);
        if !outcome.changed() {
            trace!(mutation = edit.name(), "mutation did not change the board");
        }
        outcome.changed()
    }
}

/// Plain rich documents. The view owns its own tree and always sends full text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownFormat;

/// A markdown view has no structured edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoEdit {}

impl SyncFormat for MarkdownFormat {
    type Model = String;
    type Edit = NoEdit;

    fn parse(&self, text: &str) -> String {
        text.to_string()
    }

    fn serialize(&self, model: &String) -> String {
        model.clone()
    }

    fn apply_edit(&self, _model: &mut String, edit: &NoEdit) -> bool {
        match *edit {}
    }
}
