//! Error types for `redline-core`.

use std::fmt;

use thiserror::Error;

/// A failed REST call: which operation, the HTTP status if the server
/// answered at all, and the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
  pub operation: String,
  pub status:    Option<u16>,
  pub cause:     String,
}

impl TransportError {
  /// The server answered with a non-success status.
  pub fn status(operation: impl Into<String>, status: u16) -> Self {
    Self {
      operation: operation.into(),
      status:    Some(status),
      cause:     format!("server responded with status {status}"),
    }
  }

  /// The request never produced a usable response.
  pub fn cause(operation: impl Into<String>, cause: impl fmt::Display) -> Self {
    Self {
      operation: operation.into(),
      status:    None,
      cause:     cause.to_string(),
    }
  }
}

impl fmt::Display for TransportError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.status {
      Some(status) => write!(f, "{} → {status}: {}", self.operation, self.cause),
      None => write!(f, "{}: {}", self.operation, self.cause),
    }
  }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Error)]
pub enum Error {
  #[error("transport error: {0}")]
  Transport(#[from] TransportError),

  #[error("malformed suggestion payload: {0}")]
  StreamDecode(String),

  #[error("diff input rejected: {0}")]
  DiffInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
