//! The `DocumentApi` trait: the boundary to the remote document store.
//!
//! Implemented over HTTP by `redline-client`. The compare engine and the
//! session controller depend on this abstraction, never on a concrete
//! transport, so tests can substitute an in-process fake.

use std::future::Future;

use crate::{
  document::{CreatedVersion, Document, DocumentId, Version, VersionId, VersionIndex, VersionSummary},
  error::TransportError,
};

/// Abstraction over the remote patent/version store.
///
/// Every call is a network round trip and may fail with a
/// [`TransportError`]. Implementations never retry and never touch local
/// state; callers decide how a failure is surfaced.
pub trait DocumentApi: Send + Sync {
  // ── Documents ─────────────────────────────────────────────────────────

  /// Load the main content of `doc`.
  fn fetch_document(
    &self,
    doc: DocumentId,
  ) -> impl Future<Output = Result<Document, TransportError>> + Send + '_;

  /// Overwrite the main content of `doc`.
  fn save_document<'a>(
    &'a self,
    doc: DocumentId,
    content: &'a str,
  ) -> impl Future<Output = Result<(), TransportError>> + Send + 'a;

  // ── Versions ──────────────────────────────────────────────────────────

  /// Load one version of `doc`, including its content.
  fn fetch_version(
    &self,
    doc: DocumentId,
    version: VersionId,
  ) -> impl Future<Output = Result<Version, TransportError>> + Send + '_;

  /// Overwrite the content of an existing version.
  fn save_version<'a>(
    &'a self,
    doc: DocumentId,
    version: VersionId,
    content: &'a str,
  ) -> impl Future<Output = Result<(), TransportError>> + Send + 'a;

  /// Snapshot `content` as a new version of `doc`. The document itself is
  /// not modified.
  fn create_version<'a>(
    &'a self,
    doc: DocumentId,
    content: &'a str,
  ) -> impl Future<Output = Result<CreatedVersion, TransportError>> + Send + 'a;

  /// Delete a version permanently.
  fn delete_version(
    &self,
    doc: DocumentId,
    version: VersionId,
  ) -> impl Future<Output = Result<(), TransportError>> + Send + '_;

  // ── Listings ──────────────────────────────────────────────────────────

  /// Every version of every document, grouped by parent.
  fn list_all_versions(
    &self,
  ) -> impl Future<Output = Result<VersionIndex, TransportError>> + Send + '_;

  /// The versions of a single document, oldest first.
  fn list_versions(
    &self,
    doc: DocumentId,
  ) -> impl Future<Output = Result<Vec<VersionSummary>, TransportError>> + Send + '_;
}

/// Where a buffer lives on the server: the document's main content or one of
/// its versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
  Document(DocumentId),
  Version(DocumentId, VersionId),
}

impl SaveTarget {
  pub fn new(doc: DocumentId, version: Option<VersionId>) -> Self {
    match version {
      Some(v) => Self::Version(doc, v),
      None => Self::Document(doc),
    }
  }

  /// Persist `content` to this target through `api`.
  pub async fn save<A: DocumentApi>(&self, api: &A, content: &str) -> Result<(), TransportError> {
    match *self {
      Self::Document(doc) => api.save_document(doc, content).await,
      Self::Version(doc, version) => api.save_version(doc, version, content).await,
    }
  }
}

impl std::fmt::Display for SaveTarget {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Document(doc) => write!(f, "patent {doc}"),
      Self::Version(doc, v) => write!(f, "patent {doc} version {v}"),
    }
  }
}
