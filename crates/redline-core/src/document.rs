//! Documents, versions, and the per-document version index.
//!
//! A document is the top-level patent record; a version is a snapshot of a
//! document's content that can be edited and saved independently afterwards.
//! The parent linkage of a version never changes once it is created.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The patent document number.
pub type DocumentId = i64;

/// Server-assigned version identifier, unique across all documents.
pub type VersionId = i64;

// ─── Document ────────────────────────────────────────────────────────────────

/// The main (non-version) content of a patent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub id:      DocumentId,
  /// Rich text as produced by the editor; may contain markup.
  pub content: String,
}

// ─── Version ─────────────────────────────────────────────────────────────────

/// A full version record including its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
  pub id:            VersionId,
  pub patent_parent: DocumentId,
  pub content:       String,
  #[serde(with = "timestamp")]
  pub created_at:    NaiveDateTime,
}

impl Version {
  pub fn summary(&self) -> VersionSummary {
    VersionSummary {
      id:            self.id,
      created_at:    self.created_at,
      patent_parent: self.patent_parent,
    }
  }
}

/// A version without its content, as listed in the version index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
  pub id:            VersionId,
  #[serde(with = "timestamp")]
  pub created_at:    NaiveDateTime,
  pub patent_parent: DocumentId,
}

/// Returned by the server when a version is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedVersion {
  pub version_id: VersionId,
  #[serde(with = "timestamp")]
  pub created_at: NaiveDateTime,
}

// ─── Version index ───────────────────────────────────────────────────────────

/// Every known version, grouped by parent document.
///
/// Ordered by document id so enumeration is stable; the order of versions
/// within one document is whatever the server returned, with local
/// additions appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIndex(BTreeMap<DocumentId, Vec<VersionSummary>>);

impl VersionIndex {
  pub fn new() -> Self { Self::default() }

  pub fn versions_of(&self, doc: DocumentId) -> &[VersionSummary] {
    self.0.get(&doc).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &[VersionSummary])> {
    self.0.iter().map(|(doc, versions)| (*doc, versions.as_slice()))
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Append a version under its parent document.
  pub fn insert(&mut self, summary: VersionSummary) {
    self.0.entry(summary.patent_parent).or_default().push(summary);
  }

  /// Remove a version from its document's list. Returns `true` if it was
  /// present. The document key stays, possibly with an empty list.
  pub fn remove(&mut self, doc: DocumentId, version: VersionId) -> bool {
    let Some(list) = self.0.get_mut(&doc) else {
      return false;
    };
    let before = list.len();
    list.retain(|v| v.id != version);
    list.len() != before
  }

  /// Replace one document's list wholesale.
  pub fn set_versions(&mut self, doc: DocumentId, versions: Vec<VersionSummary>) {
    self.0.insert(doc, versions);
  }
}

impl FromIterator<VersionSummary> for VersionIndex {
  fn from_iter<I: IntoIterator<Item = VersionSummary>>(iter: I) -> Self {
    let mut index = Self::new();
    for summary in iter {
      index.insert(summary);
    }
    index
  }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Serde adapter for server timestamps.
///
/// Most endpoints send `%Y-%m-%d %H:%M`; the per-document listing sends
/// ISO-8601 with seconds and fractions. Both are accepted; output is always
/// the short form.
pub mod timestamp {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

  const ACCEPTED: &[&str] = &[
    DISPLAY_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
  ];

  pub fn parse(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ACCEPTED
      .iter()
      .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
  }

  pub fn format(dt: &NaiveDateTime) -> String { dt.format(DISPLAY_FORMAT).to_string() }

  pub fn serialize<S: Serializer>(dt: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&format(dt))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(de)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised timestamp {raw:?}")))
  }

  /// Optional variant; an empty string stands for "no timestamp".
  pub mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(
      dt: &Option<NaiveDateTime>,
      ser: S,
    ) -> Result<S::Ok, S::Error> {
      match dt {
        Some(dt) => super::serialize(dt, ser),
        None => ser.serialize_str(""),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      de: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
      let raw = Option::<String>::deserialize(de)?.unwrap_or_default();
      if raw.trim().is_empty() {
        return Ok(None);
      }
      super::parse(&raw)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp {raw:?}")))
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
