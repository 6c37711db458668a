//! [`SessionController`]: drives one editing session.
//!
//! Every action takes `&mut self` and is awaited to completion by the
//! caller, so two actions can never interleave and a slow response can
//! never land on top of a newer one.
//!
//! REST failures are logged, reported through [`SessionController::take_status`],
//! and leave the session as it was. Actions return `bool` (or an `Option`)
//! so a front end can react without inspecting errors.

use std::collections::VecDeque;

use redline_core::{
  api::{DocumentApi, SaveTarget},
  diff::DiffSpan,
  document::{DocumentId, VersionId, VersionIndex, VersionSummary, timestamp},
  normalize::normalize,
  selector::compute_selectable,
  state::{PersistedState, StateStore},
  suggestion::{ChannelEvent, Issue, SuggestionEnvelope},
};
use tracing::{debug, error, info, warn};

use crate::{compare::CompareEngine, debounce::Debouncer};

/// How many raw inbound suggestion frames are kept for inspection.
pub const MESSAGE_HISTORY: usize = 50;

pub struct SessionController<A, S> {
  api:              A,
  state:            PersistedState<S>,
  initial_document: DocumentId,

  document_id:      DocumentId,
  version_id:       Option<VersionId>,
  version_name:     Option<String>,
  content:          String,
  original_content: String,
  versions:         VersionIndex,

  compare:          Option<CompareEngine<S>>,

  suggestions:      Option<Debouncer>,
  issues:           Vec<Issue>,
  history:          VecDeque<String>,
  connected:        bool,

  status:           Option<String>,
}

impl<A: DocumentApi, S: StateStore> SessionController<A, S> {
  pub fn new(api: A, state: PersistedState<S>, initial_document: DocumentId) -> Self {
    Self {
      api,
      state,
      initial_document,
      document_id: initial_document,
      version_id: None,
      version_name: None,
      content: String::new(),
      original_content: String::new(),
      versions: VersionIndex::new(),
      compare: None,
      suggestions: None,
      issues: Vec::new(),
      history: VecDeque::with_capacity(MESSAGE_HISTORY),
      connected: false,
      status: None,
    }
  }

  /// Route edits to the suggestion feed through `debouncer`.
  pub fn with_suggestions(mut self, debouncer: Debouncer) -> Self {
    self.suggestions = Some(debouncer);
    self
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn api(&self) -> &A { &self.api }

  pub fn document_id(&self) -> DocumentId { self.document_id }

  pub fn version_id(&self) -> Option<VersionId> { self.version_id }

  /// Creation time of the open version, as shown next to the title.
  pub fn version_name(&self) -> Option<&str> { self.version_name.as_deref() }

  pub fn content(&self) -> &str { &self.content }

  pub fn versions(&self) -> &VersionIndex { &self.versions }

  pub fn has_unsaved_changes(&self) -> bool { self.content != self.original_content }

  pub fn compare(&self) -> Option<&CompareEngine<S>> { self.compare.as_ref() }

  pub fn compare_mut(&mut self) -> Option<&mut CompareEngine<S>> { self.compare.as_mut() }

  pub fn is_compare_mode(&self) -> bool { self.compare.is_some() }

  pub fn issues(&self) -> &[Issue] { &self.issues }

  pub fn history(&self) -> impl Iterator<Item = &str> { self.history.iter().map(String::as_str) }

  pub fn is_connected(&self) -> bool { self.connected }

  /// The outcome of the most recent action, if it had anything to say.
  /// Reading it clears it.
  pub fn take_status(&mut self) -> Option<String> { self.status.take() }

  // ── Startup ───────────────────────────────────────────────────────────

  /// Load the session. A cached compare session is resumed when there is
  /// one; otherwise the initial document is opened.
  pub async fn init(&mut self) -> bool {
    self.compare = None;
    let snapshot = self.state.init().await;
    let versions_ok = self.load_versions().await;

    if let Some(engine) = CompareEngine::restore(self.state.clone(), &snapshot) {
      self.document_id = engine.document_id();
      self.version_id = snapshot.version_id;
      self.version_name = None;
      self.content = snapshot.document_content.unwrap_or_default();
      self.original_content = self.content.clone();
      self.compare = Some(engine);
      info!(document_id = self.document_id, "resumed compare mode");
      return versions_ok;
    }

    let doc_ok = self.load_document(self.initial_document).await;
    versions_ok && doc_ok
  }

  // ── Editing ───────────────────────────────────────────────────────────

  /// Replace the editor buffer and feed its plain text to the reviewer.
  pub fn set_content(&mut self, content: impl Into<String>) {
    self.content = content.into();
    if let Some(debouncer) = &self.suggestions {
      debouncer.push(normalize(&self.content));
    }
  }

  /// Save the buffer to wherever it was loaded from.
  pub async fn save(&mut self) -> bool {
    let target = self.target();
    match target.save(&self.api, &self.content).await {
      Ok(()) => {
        self.original_content = self.content.clone();
        self.report(format!("Saved {target}"));
        true
      }
      Err(e) => {
        error!(%target, "save failed: {e}");
        self.report(format!("Could not save {target}: {e}"));
        false
      }
    }
  }

  // ── Navigation ────────────────────────────────────────────────────────

  /// Open the main content of `doc`, saving unsaved edits first.
  pub async fn switch_to_main(&mut self, doc: DocumentId) -> bool {
    if !self.save_if_dirty().await {
      return false;
    }
    self.load_document(doc).await
  }

  /// Open `version` of `doc`, saving unsaved edits first.
  pub async fn switch_to_version(&mut self, doc: DocumentId, version: VersionId) -> bool {
    if !self.save_if_dirty().await {
      return false;
    }
    self.load_version(doc, version).await
  }

  // ── Version lifecycle ─────────────────────────────────────────────────

  /// Snapshot the buffer as a new version of the open document and open it.
  pub async fn create_version(&mut self) -> Option<VersionId> {
    let doc = self.document_id;
    let created = match self.api.create_version(doc, &self.content).await {
      Ok(created) => created,
      Err(e) => {
        error!(doc, "create version failed: {e}");
        self.report(format!("Could not create a version of patent {doc}: {e}"));
        return None;
      }
    };

    self.versions.insert(VersionSummary {
      id:            created.version_id,
      created_at:    created.created_at,
      patent_parent: doc,
    });
    info!(doc, version = created.version_id, "version created");
    self.load_version(doc, created.version_id).await;
    Some(created.version_id)
  }

  /// Delete a version and fall back to its document's main content.
  pub async fn delete_version(&mut self, doc: DocumentId, version: VersionId) -> bool {
    if let Err(e) = self.api.delete_version(doc, version).await {
      error!(doc, version, "delete version failed: {e}");
      self.report(format!("Could not delete version {version}: {e}"));
      return false;
    }
    self.versions.remove(doc, version);
    info!(doc, version, "version deleted");
    self.load_document(doc).await
  }

  /// Refresh one document's version list from the server.
  pub async fn refresh_versions(&mut self, doc: DocumentId) -> bool {
    match self.api.list_versions(doc).await {
      Ok(list) => {
        self.versions.set_versions(doc, list);
        true
      }
      Err(e) => {
        error!(doc, "listing versions failed: {e}");
        self.report(format!("Could not list versions of patent {doc}: {e}"));
        false
      }
    }
  }

  // ── Compare mode ──────────────────────────────────────────────────────

  /// Save the buffer and switch to compare mode with it on the left.
  pub async fn enter_compare(&mut self) -> bool {
    if self.compare.is_some() {
      return true;
    }
    let target = self.target();
    if let Err(e) = target.save(&self.api, &self.content).await {
      error!(%target, "save before compare failed: {e}");
      self.report(format!("Could not save {target}: {e}"));
      return false;
    }
    self.original_content = self.content.clone();

    let selectable = compute_selectable(&self.versions, self.document_id, self.version_id);
    self.state.set_selectable(&selectable).await;
    self.state.set_compare_mode(true).await;
    self.state.set_document_content(&self.content).await;
    self.state.set_document_id(self.document_id).await;
    self.state.set_version_id(self.version_id).await;

    self.compare = Some(CompareEngine::new(
      self.state.clone(),
      self.document_id,
      self.version_id,
      &self.content,
      selectable,
    ));
    info!(%target, "entered compare mode");
    true
  }

  /// Load a selectable entry (`None` for main) into the right pane.
  pub async fn choose_right(&mut self, id: Option<VersionId>) -> bool {
    let Some(engine) = self.compare.as_mut() else {
      return false;
    };
    let Some(entry) = engine.selectable().iter().find(|e| e.id == id).cloned() else {
      self.report("That version is not available to compare".to_string());
      return false;
    };
    engine.choose_right(&self.api, &entry).await
  }

  /// Run the comparison; returns a copy of the spans.
  pub async fn run_compare(&mut self) -> Option<Vec<DiffSpan>> {
    let engine = self.compare.as_mut()?;
    engine.run_compare(&self.api).await.map(<[DiffSpan]>::to_vec)
  }

  /// Leave compare mode and start the session over.
  pub async fn exit_compare(&mut self) -> bool {
    if let Some(engine) = self.compare.take() {
      engine.exit().await;
    }
    self.init().await
  }

  // ── Suggestion feed ───────────────────────────────────────────────────

  pub fn handle_channel_event(&mut self, event: ChannelEvent) {
    match event {
      ChannelEvent::Open => {
        info!("suggestion feed connected");
        self.connected = true;
      }
      ChannelEvent::Closed => {
        info!("suggestion feed disconnected");
        self.connected = false;
      }
      ChannelEvent::Message(text) => {
        if self.history.len() == MESSAGE_HISTORY {
          self.history.pop_front();
        }
        self.history.push_back(text);
        let Some(latest) = self.history.back() else {
          return;
        };
        match SuggestionEnvelope::decode(latest) {
          Ok(envelope) => {
            debug!(issues = envelope.issues.len(), "suggestions received");
            self.issues = envelope.issues;
          }
          Err(e) => warn!("ignoring suggestion frame: {e}"),
        }
      }
    }
  }

  // ── Plumbing ──────────────────────────────────────────────────────────

  fn target(&self) -> SaveTarget { SaveTarget::new(self.document_id, self.version_id) }

  fn report(&mut self, status: String) { self.status = Some(status); }

  async fn save_if_dirty(&mut self) -> bool {
    if !self.has_unsaved_changes() {
      return true;
    }
    self.save().await
  }

  async fn load_versions(&mut self) -> bool {
    match self.api.list_all_versions().await {
      Ok(index) => {
        self.versions = index;
        true
      }
      Err(e) => {
        error!("loading versions failed: {e}");
        self.report(format!("Could not load versions: {e}"));
        false
      }
    }
  }

  async fn load_document(&mut self, doc: DocumentId) -> bool {
    match self.api.fetch_document(doc).await {
      Ok(document) => {
        self.content = document.content.clone();
        self.original_content = document.content;
        self.document_id = doc;
        self.version_id = None;
        self.version_name = None;
        self.state.set_document_id(doc).await;
        self.state.set_version_id(None).await;
        info!(doc, "opened patent");
        true
      }
      Err(e) => {
        error!(doc, "loading patent failed: {e}");
        self.report(format!("Could not load patent {doc}: {e}"));
        false
      }
    }
  }

  async fn load_version(&mut self, doc: DocumentId, version: VersionId) -> bool {
    match self.api.fetch_version(doc, version).await {
      Ok(loaded) => {
        self.content = loaded.content.clone();
        self.original_content = loaded.content;
        self.document_id = loaded.patent_parent;
        self.version_id = Some(loaded.id);
        self.version_name = Some(timestamp::format(&loaded.created_at));
        self.state.set_document_id(loaded.patent_parent).await;
        self.state.set_version_id(Some(loaded.id)).await;
        info!(doc = loaded.patent_parent, version = loaded.id, "opened version");
        true
      }
      Err(e) => {
        error!(doc, version, "loading version failed: {e}");
        self.report(format!("Could not load version {version}: {e}"));
        false
      }
    }
  }
}
