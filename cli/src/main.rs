//! Interactive terminal front end for a similarity session.
//!
//! Usage: simmatrix [--config simmatrix.toml] [TEXT...]
//!
//! Reads line commands from stdin and prints the matrix every time a new
//! one is applied.

mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use simmatrix_session::{ModelProviderType, Session, SessionConfig, SessionHandle, SessionView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP};

#[derive(Parser)]
#[command(name = "simmatrix")]
#[command(about = "Live cosine similarity matrix for a list of texts", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Quiet period in milliseconds before edits are embedded.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Embedding provider.
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Clear the matrix while a newer one is being computed.
    #[arg(long)]
    clear_stale: bool,

    /// Initial inputs (replace the configured ones).
    texts: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Hashing,
    Http,
}

impl From<ProviderArg> for ModelProviderType {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Hashing => Self::Hashing,
            ProviderArg::Http => Self::Http,
        }
    }
}

impl Cli {
    fn into_config(self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };

        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        if let Some(provider) = self.provider {
            config.model.provider = provider.into();
        }
        if self.clear_stale {
            config.keep_stale_matrix = false;
        }
        if !self.texts.is_empty() {
            config.initial_inputs = self.texts;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config()?;
    let loader = config.model.loader();
    let handle = Session::spawn(config, loader)?;

    println!("{HELP}\n");
    print!("{}", render::inputs(&handle.snapshot()));

    let result = run(&handle).await;
    handle.shutdown().await;
    result
}

async fn run(handle: &SessionHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut views = handle.subscribe();
    let mut last_printed: Option<SessionView> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match commands::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(handle, command).await {
                            println!("error: {e}");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("error: {e}"),
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if needs_redraw(last_printed.as_ref(), &view) {
                    print!("{}{}", render::embeddings(&view), render::matrix(&view));
                    last_printed = Some(view);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}

async fn execute(handle: &SessionHandle, command: Command) -> Result<()> {
    debug!("Executing {command:?}");
    match command {
        Command::Add => {
            handle.create().await?;
        }
        Command::Set { index, text } => {
            handle.update(index, text).await?;
        }
        Command::Delete(index) => {
            handle.delete(index).await?;
        }
        Command::Pointer(event) => {
            handle.pointer(event).await?;
            let view = handle.snapshot();
            print!("{}{}", render::inputs(&view), render::matrix(&view));
        }
        Command::Show => {
            let view = handle.snapshot();
            print!(
                "{}{}{}",
                render::inputs(&view),
                render::embeddings(&view),
                render::matrix(&view)
            );
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

/// Redraw when the displayed output or a status line changed.
fn needs_redraw(last: Option<&SessionView>, view: &SessionView) -> bool {
    let Some(last) = last else {
        return true;
    };
    let same_matrix = match (&last.matrix, &view.matrix) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    !same_matrix || last.model != view.model || last.status != view.status
}
