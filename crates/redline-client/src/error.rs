//! Error type for `redline-client`.
//!
//! Per-request failures are reported as [`redline_core::TransportError`]
//! through the `DocumentApi` trait; this type covers setup only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Build(#[from] reqwest::Error),

  #[error("invalid socket url {url:?}: expected ws:// or wss://")]
  SocketUrl { url: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
