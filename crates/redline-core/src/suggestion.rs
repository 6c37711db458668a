//! AI review suggestions streamed back over the suggestion channel.
//!
//! Inbound frames are untrusted model output relayed by the backend, so they
//! are decoded into a strict envelope before anything else sees them.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One finding from the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
  /// Category, e.g. "Punctuation" or "Claim dependency".
  #[serde(rename = "type")]
  pub kind:        String,
  pub severity:    String,
  /// 1-based paragraph the finding refers to.
  pub paragraph:   u32,
  pub description: String,
  pub suggestion:  String,
}

/// The `{ "issues": [...] }` wrapper every inbound frame must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEnvelope {
  pub issues: Vec<Issue>,
}

impl SuggestionEnvelope {
  /// Validate and decode one inbound text frame.
  pub fn decode(frame: &str) -> Result<Self> {
    serde_json::from_str(frame).map_err(|e| Error::StreamDecode(e.to_string()))
  }
}

/// A connection-level event from the suggestion channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
  Open,
  Closed,
  Message(String),
}

impl std::fmt::Display for Issue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{} ({}) - {}\n  Suggestion: {}",
      self.kind, self.severity, self.description, self.suggestion
    )
  }
}
