//! An in-process [`DocumentApi`] that records every call.

use std::{
  collections::{BTreeMap, HashSet},
  sync::{Arc, Mutex, MutexGuard},
};

use redline_core::{
  TransportError,
  api::DocumentApi,
  document::{
    CreatedVersion, Document, DocumentId, Version, VersionId, VersionIndex, VersionSummary,
    timestamp,
  },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  FetchDocument(DocumentId),
  SaveDocument(DocumentId, String),
  FetchVersion(DocumentId, VersionId),
  SaveVersion(DocumentId, VersionId, String),
  CreateVersion(DocumentId, String),
  DeleteVersion(DocumentId, VersionId),
  ListAllVersions,
  ListVersions(DocumentId),
}

impl Call {
  pub fn is_save(&self) -> bool {
    matches!(self, Self::SaveDocument(..) | Self::SaveVersion(..))
  }
}

#[derive(Default)]
struct Backend {
  documents: BTreeMap<DocumentId, String>,
  versions:  BTreeMap<VersionId, Version>,
  next_id:   VersionId,
  calls:     Vec<Call>,
  failing:   HashSet<&'static str>,
}

/// Cheap to clone; clones share the same backend.
#[derive(Clone, Default)]
pub struct FakeApi {
  inner: Arc<Mutex<Backend>>,
}

impl FakeApi {
  pub fn new() -> Self {
    let api = Self::default();
    api.lock().next_id = 100;
    api
  }

  fn lock(&self) -> MutexGuard<'_, Backend> { self.inner.lock().unwrap() }

  pub fn with_document(self, doc: DocumentId, content: &str) -> Self {
    self.lock().documents.insert(doc, content.to_string());
    self
  }

  pub fn with_version(self, doc: DocumentId, id: VersionId, content: &str) -> Self {
    self.lock().versions.insert(id, Version {
      id,
      patent_parent: doc,
      content: content.to_string(),
      created_at: timestamp::parse("2025-03-04 09:15").unwrap(),
    });
    self
  }

  /// Make every call to `op` (e.g. `"save_document"`) fail with a 500.
  pub fn fail(&self, op: &'static str) { self.lock().failing.insert(op); }

  pub fn heal(&self, op: &'static str) { self.lock().failing.remove(op); }

  pub fn calls(&self) -> Vec<Call> { self.lock().calls.clone() }

  pub fn saves(&self) -> Vec<Call> {
    self.calls().into_iter().filter(Call::is_save).collect()
  }

  pub fn clear_calls(&self) { self.lock().calls.clear(); }

  pub fn document(&self, doc: DocumentId) -> Option<String> {
    self.lock().documents.get(&doc).cloned()
  }

  pub fn version(&self, id: VersionId) -> Option<String> {
    self.lock().versions.get(&id).map(|v| v.content.clone())
  }

  fn record(&self, op: &'static str, call: Call) -> Result<MutexGuard<'_, Backend>, TransportError> {
    let mut backend = self.lock();
    backend.calls.push(call);
    if backend.failing.contains(op) {
      return Err(TransportError::status(op, 500));
    }
    Ok(backend)
  }
}

fn not_found(op: &str) -> TransportError { TransportError::status(op, 404) }

impl DocumentApi for FakeApi {
  async fn fetch_document(&self, doc: DocumentId) -> Result<Document, TransportError> {
    let backend = self.record("fetch_document", Call::FetchDocument(doc))?;
    let content = backend
      .documents
      .get(&doc)
      .cloned()
      .ok_or_else(|| not_found("fetch_document"))?;
    Ok(Document { id: doc, content })
  }

  async fn save_document(&self, doc: DocumentId, content: &str) -> Result<(), TransportError> {
    let mut backend =
      self.record("save_document", Call::SaveDocument(doc, content.to_string()))?;
    backend.documents.insert(doc, content.to_string());
    Ok(())
  }

  async fn fetch_version(
    &self,
    doc: DocumentId,
    version: VersionId,
  ) -> Result<Version, TransportError> {
    let backend = self.record("fetch_version", Call::FetchVersion(doc, version))?;
    backend
      .versions
      .get(&version)
      .cloned()
      .ok_or_else(|| not_found("fetch_version"))
  }

  async fn save_version(
    &self,
    doc: DocumentId,
    version: VersionId,
    content: &str,
  ) -> Result<(), TransportError> {
    let mut backend = self.record(
      "save_version",
      Call::SaveVersion(doc, version, content.to_string()),
    )?;
    let entry = backend
      .versions
      .get_mut(&version)
      .ok_or_else(|| not_found("save_version"))?;
    entry.content = content.to_string();
    Ok(())
  }

  async fn create_version(
    &self,
    doc: DocumentId,
    content: &str,
  ) -> Result<CreatedVersion, TransportError> {
    let mut backend =
      self.record("create_version", Call::CreateVersion(doc, content.to_string()))?;
    backend.next_id += 1;
    let id = backend.next_id;
    let created_at = timestamp::parse("2025-03-05 10:30").unwrap();
    backend.versions.insert(id, Version {
      id,
      patent_parent: doc,
      content: content.to_string(),
      created_at,
    });
    Ok(CreatedVersion {
      version_id: id,
      created_at,
    })
  }

  async fn delete_version(&self, doc: DocumentId, version: VersionId) -> Result<(), TransportError> {
    let mut backend = self.record("delete_version", Call::DeleteVersion(doc, version))?;
    backend
      .versions
      .remove(&version)
      .map(drop)
      .ok_or_else(|| not_found("delete_version"))
  }

  async fn list_all_versions(&self) -> Result<VersionIndex, TransportError> {
    let backend = self.record("list_all_versions", Call::ListAllVersions)?;
    Ok(backend.versions.values().map(Version::summary).collect())
  }

  async fn list_versions(&self, doc: DocumentId) -> Result<Vec<VersionSummary>, TransportError> {
    let backend = self.record("list_versions", Call::ListVersions(doc))?;
    Ok(
      backend
        .versions
        .values()
        .filter(|v| v.patent_parent == doc)
        .map(Version::summary)
        .collect(),
    )
  }
}
