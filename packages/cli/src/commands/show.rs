use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use markban_parser::{parse_with_ids, Board, IdGenerator};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Board file
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn show(args: ShowArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.file);
    let source = fs::read_to_string(&path)?;
    // stable ids so repeated runs print the same JSON
    let mut ids = IdGenerator::for_document(&path.display().to_string());
    let board = parse_with_ids(&source, &mut ids);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&board)?),
        OutputFormat::Text => print!("{}", render_text(&board)),
    }
    Ok(())
}

fn render_text(board: &Board) -> String {
    let mut out = String::new();

    for line in board.preamble.lines() {
        out.push_str(&format!("{}\n", line.dimmed()));
    }
    if !board.preamble.trim().is_empty() {
        out.push('\n');
    }

    for column in &board.columns {
        let done = column.cards.iter().filter(|c| c.completed).count();
        let mut heading = format!(
            "{} {}",
            column.title.bright_blue().bold(),
            format!("({}/{})", done, column.cards.len()).dimmed()
        );
        if column.is_auto_complete() {
            heading.push_str(&format!(" {}", "auto-complete".yellow()));
        }
        out.push_str(&heading);
        out.push('\n');

        for card in &column.cards {
            let mark = if card.completed {
                "✓".green()
            } else {
                "○".normal()
            };
            out.push_str(&format!("  {} {}\n", mark, card.text));
            for line in card.description.lines() {
                out.push_str(&format!("      {}\n", line.dimmed()));
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use markban_parser::parse;

    #[test]
    fn test_render_text_lists_cards() {
        colored::control::set_override(false);
        let board = parse(
            "# Sprint\n\n## Todo\n\n- [ ] a\n  note\n\n## Done [auto-complete]\n\n- [x] b\n",
        );
        let text = render_text(&board);
        assert_eq!(
            text,
            "# Sprint\n\nTodo (0/1)\n  ○ a\n      note\n\nDone (1/1) auto-complete\n  ✓ b\n\n"
        );
    }
}
