//! redline: a line-oriented editor for patent drafts.
//!
//! Reads `redline.toml` (or the path given with `--config`), opens the
//! SQLite state cache, connects to the document API and the AI review
//! channel, then reads commands from stdin. Type `help` for the command list.
//!
//! ```
//! cargo run -p redline-cli -- --url http://localhost:8000
//! ```

mod app;
mod command;
mod render;
mod settings;

use std::{
  io::{self, IsTerminal as _, Write as _},
  path::PathBuf,
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use redline_client::{ApiClient, ApiConfig, SuggestionSocket};
use redline_core::state::PersistedState;
use redline_session::{Debouncer, SessionController};
use redline_store_sqlite::SqliteStateStore;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  app::{App, Flow},
  settings::Overrides,
};

#[derive(Parser)]
#[command(author, version, about = "Patent draft editor with AI review")]
struct Args {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "redline.toml")]
  config: PathBuf,

  /// Base URL of the document API.
  #[arg(long)]
  url: Option<String>,

  /// WebSocket URL of the review channel.
  #[arg(long)]
  socket_url: Option<String>,

  /// Path of the SQLite state cache.
  #[arg(long)]
  state: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so they stay out of the command output.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let cfg = settings::load(&args.config, Overrides {
    api_url:    args.url,
    socket_url: args.socket_url,
    state_path: args.state,
  })?;

  if let Some(parent) = cfg.state_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create state directory {}", parent.display()))?;
  }

  let store = SqliteStateStore::open(&cfg.state_path)
    .await
    .with_context(|| format!("failed to open state cache at {}", cfg.state_path.display()))?;
  let api = ApiClient::new(ApiConfig {
    base_url: cfg.api_url.clone(),
  })
  .context("failed to build HTTP client")?;

  let mut socket =
    SuggestionSocket::spawn(cfg.socket_url.clone(), Duration::from_millis(cfg.reconnect_ms))
      .context("failed to start review channel")?;
  let debouncer = Debouncer::spawn(Duration::from_millis(cfg.debounce_ms), socket.sender());

  tracing::info!(api = %cfg.api_url, socket = %cfg.socket_url, "starting session");

  let session = SessionController::new(
    api,
    PersistedState::new(Arc::new(store)),
    cfg.initial_document,
  )
  .with_suggestions(debouncer);
  let mut app = App::new(session, io::stdout().is_terminal());

  let mut stdout = io::stdout();
  app.start(&mut stdout).await?;

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    write!(stdout, "> ")?;
    stdout.flush()?;

    tokio::select! {
      line = lines.next_line() => {
        let Some(line) = line.context("failed to read stdin")? else {
          break;
        };
        if app.handle_line(&line, &mut stdout).await? == Flow::Quit {
          break;
        }
      }
      Some(event) = socket.recv() => {
        app.on_channel_event(event, &mut stdout)?;
      }
    }
  }

  Ok(())
}
