use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

const SAMPLE_BOARD: &str = "# My Board

## Backlog

- [ ] Try dragging this card
- [ ] Cards can have notes
  Indent lines by two spaces to add them.

## In Progress

## Done [auto-complete]

- [x] Run markban init
";

const SAMPLE_TEMPLATE: &str = "## To Do

## Doing

## Done [auto-complete]
";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing markban...".bright_blue().bold());

    let config = Config::default();
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let board_path = config.get_default_board(cwd);
    if !board_path.exists() {
        fs::write(&board_path, SAMPLE_BOARD)?;
        println!("  {} Created {}", "✓".green(), config.default_board);
    }

    let templates_dir = config.get_templates_dir(cwd);
    if !templates_dir.exists() {
        fs::create_dir_all(&templates_dir)?;
        fs::write(templates_dir.join("kanban.md"), SAMPLE_TEMPLATE)?;
        println!("  {} Created {}/kanban.md", "✓".green(), config.templates_dir);
    }

    println!();
    println!("{}", "✅ Board initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: markban show {}", config.default_board);
    println!("  2. Run: markban edit {}", config.default_board);

    Ok(())
}
