//! Board assembly.
//!
//! Consumes classified lines and maintains the "current column" and
//! "current card" cursors. Parsing never fails: lines that do not fit the
//! board structure end up in the preamble or are dropped.

use crate::ast::{Board, BoardSettings, Card, Column, ColumnSettings, DEFAULT_COLUMNS};
use crate::id_generator::IdGenerator;
use crate::lexer::{self, Line, LineKind};

/// Parse board text, issuing fresh random ids
pub fn parse(source: &str) -> Board {
    parse_with_ids(source, &mut IdGenerator::random())
}

/// Parse board text with an explicit id generator
pub fn parse_with_ids(source: &str, ids: &mut IdGenerator) -> Board {
    let mut builder = BoardBuilder::new(ids);
    for line in lexer::tokenize(source) {
        builder.push(&line);
    }
    builder.finish()
}

/// Card being assembled, with its raw description lines
struct OpenCard {
    card: Card,
    description: Vec<String>,
    /// Cleared by the first blank or unindented line after the task
    accepting: bool,
}

pub struct BoardBuilder<'g> {
    ids: &'g mut IdGenerator,
    preamble: Vec<String>,
    columns: Vec<Column>,
    card: Option<OpenCard>,
}

impl<'g> BoardBuilder<'g> {
    pub fn new(ids: &'g mut IdGenerator) -> Self {
        Self {
            ids,
            preamble: Vec::new(),
            columns: Vec::new(),
            card: None,
        }
    }

    fn in_preamble(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn push(&mut self, line: &Line<'_>) {
        match &line.kind {
            LineKind::ColumnHeading {
                title,
                auto_complete,
            } => {
                self.close_card();
                let mut column = Column::new(self.ids.column_id(), title.clone());
                if *auto_complete {
                    column.settings = ColumnSettings {
                        auto_complete: Some(true),
                    };
                }
                self.columns.push(column);
            }

            LineKind::Task { completed, text } => {
                self.close_card();
                if self.in_preamble() {
                    return;
                }
                let mut card = Card::new(self.ids.card_id(), *text);
                card.completed = *completed;
                self.card = Some(OpenCard {
                    card,
                    description: Vec::new(),
                    accepting: true,
                });
            }

            LineKind::Indented { content } => {
                if self.in_preamble() {
                    self.preamble.push(line.raw.to_string());
                    return;
                }
                if let Some(open) = self.card.as_mut().filter(|c| c.accepting) {
                    open.description.push(content.to_string());
                }
            }

            LineKind::Blank | LineKind::Text { .. } => {
                if self.in_preamble() {
                    self.preamble.push(line.raw.to_string());
                    return;
                }
                if let Some(open) = self.card.as_mut() {
                    open.accepting = false;
                }
            }
        }
    }

    fn close_card(&mut self) {
        let Some(open) = self.card.take() else {
            return;
        };
        let mut card = open.card;
        card.description = open.description.join("\n").trim().to_string();
        if let Some(column) = self.columns.last_mut() {
            column.cards.push(card);
        }
    }

    pub fn finish(mut self) -> Board {
        self.close_card();

        while self.preamble.last().is_some_and(|l| l.trim().is_empty()) {
            self.preamble.pop();
        }
        let leading = self
            .preamble
            .iter()
            .take_while(|l| l.trim().is_empty())
            .count();
        self.preamble.drain(..leading);
        let (preamble, settings) = extract_board_settings(self.preamble);

        let mut columns = self.columns;
        if columns.is_empty() {
            columns = DEFAULT_COLUMNS
                .iter()
                .map(|title| Column::new(self.ids.column_id(), *title))
                .collect();
        }

        Board {
            preamble,
            columns,
            settings,
        }
    }
}

/// Pull `[no-thumbnails]` out of the preamble lines
fn extract_board_settings(lines: Vec<String>) -> (String, BoardSettings) {
    let re = lexer::no_thumbnails_re();
    if !lines.iter().any(|l| re.is_match(l)) {
        return (lines.join("\n"), BoardSettings::default());
    }

    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if re.is_match(&line) {
            let stripped = re.replace_all(&line, "").trim_end().to_string();
            if !stripped.trim().is_empty() {
                kept.push(stripped);
            }
        } else {
            kept.push(line);
        }
    }

    let start = kept.iter().position(|l| !l.trim().is_empty());
    let end = kept.iter().rposition(|l| !l.trim().is_empty());
    let preamble = match (start, end) {
        (Some(start), Some(end)) => kept[start..=end].join("\n"),
        _ => String::new(),
    };

    (
        preamble,
        BoardSettings {
            show_thumbnails: Some(false),
        },
    )
}
