//! `markban edit`: a controller on a board file with the Live View on stdio.
//!
//! Each stdin line is one JSON view message, each stdout line one JSON host
//! message. Logs go to stderr.

use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use markban_sync::{
    spawn, BoardFormat, ControllerOptions, FileStore, HostMessage, MarkdownFormat, SyncEvent,
    SyncFormat, TemplateLibrary, ViewMessage,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Board file (defaults to the configured board)
    pub file: Option<PathBuf>,

    /// Treat the file as a plain markdown document instead of a board
    #[arg(long)]
    pub markdown: bool,
}

pub fn edit(args: EditArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = match &args.file {
        Some(file) => cwd.join(file),
        None => config.get_default_board(cwd),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let templates = Arc::new(TemplateLibrary::new());
        let templates_dir = config.get_templates_dir(cwd);
        if templates_dir.is_dir() {
            templates.init(&templates_dir).await?;
        } else {
            debug!(dir = %templates_dir.display(), "no templates directory");
        }

        let store = Arc::new(
            FileStore::open(&path).with_context(|| format!("Cannot watch {}", path.display()))?,
        );
        let (observer, events) = mpsc::unbounded_channel();
        let options = ControllerOptions {
            config: config.sync_config(),
            display_name: None,
            templates: Some(templates.clone()),
            observer: Some(observer),
        };

        info!(path = %path.display(), "editing");
        let result = if args.markdown {
            run_session(MarkdownFormat, store, options, events).await
        } else {
            run_session(BoardFormat, store, options, events).await
        };
        templates.dispose();
        result
    })
}

async fn run_session<F>(
    format: F,
    store: Arc<FileStore>,
    options: ControllerOptions,
    mut events: mpsc::UnboundedReceiver<SyncEvent>,
) -> Result<()>
where
    F: SyncFormat,
{
    let (handle, mut from_host) = spawn(format, store, options);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match serde_json::from_str::<ViewMessage<F::Edit>>(&line) {
                    Ok(message) => {
                        if handle.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("ignoring malformed view message: {}", e),
                },
                None => break,
            },
            message = from_host.recv() => match message {
                Some(message) => write_message(&mut stdout, &message).await?,
                None => break,
            },
            Some(event) = events.recv() => log_event(&event),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.dispose().await;
    Ok(())
}

async fn write_message<M: Serialize>(
    stdout: &mut tokio::io::Stdout,
    message: &HostMessage<M>,
) -> Result<()> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

fn log_event(event: &SyncEvent) {
    match event {
        SyncEvent::Persisted { bytes, at } => debug!(bytes, %at, "saved"),
        SyncEvent::Passthrough { kind, payload } => {
            info!(kind = %kind, payload = %payload, "view request not handled by the CLI")
        }
        other => debug!(event = ?other, "sync event"),
    }
}
