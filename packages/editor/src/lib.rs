//! # Markban Editor
//!
//! Semantic edit operations over a parsed board.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: board text → Board                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Board → Board                       │
//! │  - move / toggle / add / update / delete    │
//! │  - column and board settings                │
//! │  - unknown ids are silent no-ops            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: Board → board text                  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use markban_editor::{operations, Mutation};
//! use markban_parser::{parse, serialize};
//!
//! let mut board = parse("## Todo\n- [ ] write docs\n## Done [auto-complete]\n");
//! let card_id = board.columns[0].cards[0].id.clone();
//! let done_id = board.columns[1].id.clone();
//!
//! operations::move_card(&mut board, &card_id, &done_id, 0);
//! assert!(board.columns[1].cards[0].completed);
//!
//! Mutation::ToggleCard { card_id }.apply(&mut board);
//! assert_eq!(serialize(&board), "## Todo\n\n## Done [auto-complete]\n\n- [ ] write docs\n");
//! ```

mod mutation;
pub mod operations;

pub use mutation::{Mutation, MutationOutcome};
pub use operations::{
    add_card, add_column, delete_card, delete_column, move_card, move_column, toggle_card,
    update_board_settings, update_card, update_column_settings, update_column_title,
    BoardSettingsPatch, CardPatch, ColumnSettingsPatch,
};
