//! Client configuration: defaults, then `redline.toml`, then `REDLINE_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use redline_core::document::DocumentId;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  /// Base URL of the document REST API.
  pub api_url:          String,
  /// WebSocket endpoint of the AI reviewer.
  pub socket_url:       String,
  /// SQLite file holding the UI state cache.
  pub state_path:       PathBuf,
  /// Patent opened when no compare session is cached.
  pub initial_document: DocumentId,
  /// Quiet period before an edit is sent for review.
  pub debounce_ms:      u64,
  /// Wait between reconnect attempts of the review channel.
  pub reconnect_ms:     u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_url:          "http://localhost:8000".to_string(),
      socket_url:       "ws://localhost:8000/ws".to_string(),
      state_path:       PathBuf::from("redline-state.db"),
      initial_document: 1,
      debounce_ms:      500,
      reconnect_ms:     1000,
    }
  }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default)]
pub struct Overrides {
  pub api_url:    Option<String>,
  pub socket_url: Option<String>,
  pub state_path: Option<PathBuf>,
}

/// Build the effective configuration. A missing file is not an error.
pub fn load(path: &Path, overrides: Overrides) -> anyhow::Result<ClientConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("REDLINE"))
    .build()
    .with_context(|| format!("failed to read config file {}", path.display()))?;

  let mut cfg: ClientConfig = settings
    .try_deserialize()
    .context("failed to deserialise ClientConfig")?;

  if let Some(url) = overrides.api_url {
    cfg.api_url = url;
  }
  if let Some(url) = overrides.socket_url {
    cfg.socket_url = url;
  }
  if let Some(path) = overrides.state_path {
    cfg.state_path = path;
  }
  cfg.state_path = expand_tilde(&cfg.state_path);
  Ok(cfg)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load(&dir.path().join("absent.toml"), Overrides::default()).unwrap();
    assert_eq!(cfg, ClientConfig::default());
  }

  #[test]
  fn file_values_then_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redline.toml");
    std::fs::write(
      &path,
      "api_url = \"http://review.local:9000\"\ninitial_document = 4\ndebounce_ms = 250\n",
    )
    .unwrap();

    let cfg = load(&path, Overrides::default()).unwrap();
    assert_eq!(cfg.api_url, "http://review.local:9000");
    assert_eq!(cfg.initial_document, 4);
    assert_eq!(cfg.debounce_ms, 250);
    assert_eq!(cfg.reconnect_ms, 1000);

    let cfg = load(&path, Overrides {
      api_url:    Some("http://flag:1".to_string()),
      socket_url: None,
      state_path: Some(PathBuf::from("/tmp/s.db")),
    })
    .unwrap();
    assert_eq!(cfg.api_url, "http://flag:1");
    assert_eq!(cfg.socket_url, "ws://localhost:8000/ws");
    assert_eq!(cfg.state_path, PathBuf::from("/tmp/s.db"));
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/redline/state.db")),
      PathBuf::from(home).join("redline/state.db")
    );
    assert_eq!(expand_tilde(Path::new("rel.db")), PathBuf::from("rel.db"));
  }
}
