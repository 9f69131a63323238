mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, fmt, init, show, EditArgs, FmtArgs, InitArgs, ShowArgs};
use tracing_subscriber::EnvFilter;

/// Markban CLI - task boards in plain markdown
#[derive(Parser, Debug)]
#[command(name = "markban")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a sample board
    Init(InitArgs),

    /// Normalize board files
    Fmt(FmtArgs),

    /// Print a parsed board
    Show(ShowArgs),

    /// Keep a board file in sync with a view speaking JSON lines on stdio
    Edit(EditArgs),
}

fn init_logging() {
    // stdout belongs to the edit protocol
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("markban=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Fmt(args) => fmt(args, &cwd),
        Command::Show(args) => show(args, &cwd),
        Command::Edit(args) => edit(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
