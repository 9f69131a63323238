//! # Markban Parser
//!
//! Text grammar for markdown task boards.
//!
//! ```text
//! [no-thumbnails]          board setting (optional)
//!
//! Free text preamble
//!
//! ## To Do                 column
//!
//! - [ ] Write docs         card
//!   description line       card description (two-space indent)
//!
//! ## Done [auto-complete]  column with settings
//!
//! - [x] Ship it
//! ```
//!
//! [`parse`] never fails and [`serialize`] is its normalizing inverse:
//! `parse(&serialize(&board))` is content-equal to `board`.

pub mod ast;
pub mod id_generator;
pub mod lexer;
pub mod parser;
pub mod serializer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{Board, BoardSettings, Card, Column, ColumnSettings};
pub use id_generator::{get_document_id, IdGenerator};
pub use lexer::{classify_line, tokenize, LineKind};
pub use parser::{parse, parse_with_ids};
pub use serializer::{serialize, Serializer};
