use crate::ast::*;
use crate::lexer::{AUTO_COMPLETE_TOKEN, DESCRIPTION_INDENT, NO_THUMBNAILS_TOKEN};

/// Serializer converts a Board back to board text
///
/// Output is normalized: settings first, then the preamble, then columns in
/// order with a blank line after each heading and after each column's cards.
/// Whitespace from the original text is not preserved, only the content.
pub struct Serializer {
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_string: DESCRIPTION_INDENT.to_string(),
        }
    }

    /// Serialize a Board to text ending in exactly one newline
    pub fn serialize(&self, board: &Board) -> String {
        let mut output = String::new();

        if !board.settings.shows_thumbnails() {
            output.push_str(NO_THUMBNAILS_TOKEN);
            output.push_str("\n\n");
        }

        if !board.preamble.trim().is_empty() {
            output.push_str(&board.preamble);
            output.push_str("\n\n");
        }

        for column in &board.columns {
            self.serialize_column(column, &mut output);
        }

        let mut text = strip_leading_blank_lines(output.trim_end()).to_string();
        text.push('\n');
        text
    }

    fn serialize_column(&self, column: &Column, output: &mut String) {
        output.push_str("## ");
        output.push_str(&column.title);
        if column.is_auto_complete() {
            output.push(' ');
            output.push_str(AUTO_COMPLETE_TOKEN);
        }
        output.push_str("\n\n");

        for card in &column.cards {
            self.serialize_card(card, output);
        }

        if !column.cards.is_empty() {
            output.push('\n');
        }
    }

    fn serialize_card(&self, card: &Card, output: &mut String) {
        output.push_str(if card.completed { "- [x] " } else { "- [ ] " });
        output.push_str(&card.text);
        output.push('\n');

        if card.description.is_empty() {
            return;
        }
        for line in card.description.lines() {
            output.push_str(&self.indent_string);
            output.push_str(line);
            output.push('\n');
        }
    }
}

/// Drop whole blank lines at the start, keeping the indentation of the first
/// non-blank line
fn strip_leading_blank_lines(text: &str) -> &str {
    let mut rest = text;
    while let Some((line, tail)) = rest.split_once('\n') {
        if !line.trim().is_empty() {
            break;
        }
        rest = tail;
    }
    rest
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a board to text
pub fn serialize(board: &Board) -> String {
    Serializer::new().serialize(board)
}
