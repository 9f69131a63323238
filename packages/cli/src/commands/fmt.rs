use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use markban_parser::{parse, serialize, tokenize, LineKind};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct FmtArgs {
    /// Board file or directory to format (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report files that would change without writing them
    #[arg(long)]
    pub check: bool,
}

pub fn fmt(args: FmtArgs, cwd: &Path) -> Result<()> {
    let target = cwd.join(&args.path);

    let files = if target.is_file() {
        vec![target.clone()]
    } else if target.is_dir() {
        find_board_files(&target)?
    } else {
        return Err(anyhow!("Path does not exist: {}", target.display()));
    };

    if files.is_empty() {
        println!("{}", "⚠️  No board files found".yellow());
        return Ok(());
    }

    let mut changed = 0;
    for file in &files {
        let relative_path = file.strip_prefix(cwd).unwrap_or(file);
        let source = fs::read_to_string(file)?;
        let formatted = format_source(&source);
        if formatted == source {
            continue;
        }

        changed += 1;
        if args.check {
            println!("  {} {}", "✗".red(), relative_path.display());
        } else {
            fs::write(file, &formatted)?;
            println!("  {} {}", "✓".green(), relative_path.display());
        }
    }

    println!();
    if args.check && changed > 0 {
        return Err(anyhow!("{} of {} files need formatting", changed, files.len()));
    }
    println!(
        "{} {} files checked, {} {}",
        "✅".green(),
        files.len(),
        changed,
        if args.check { "need formatting" } else { "reformatted" }
    );

    Ok(())
}

pub fn format_source(source: &str) -> String {
    serialize(&parse(source))
}

/// Markdown files with at least one column heading
fn find_board_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "md").unwrap_or(true) {
            continue;
        }
        let source = fs::read_to_string(path)?;
        if is_board(&source) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_board(source: &str) -> bool {
    tokenize(source)
        .iter()
        .any(|line| matches!(line.kind, LineKind::ColumnHeading { .. }))
}
