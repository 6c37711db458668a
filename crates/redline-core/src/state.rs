//! The persisted UI state: a small string-keyed cache that survives restarts.
//!
//! [`StateStore`] is the raw key-value abstraction; `redline-store-sqlite`
//! backs it with a file and [`MemoryStateStore`] keeps it in process for
//! tests. [`PersistedState`] layers typed accessors on top and owns the
//! parsing policy: a value that does not parse is treated as absent.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex},
};

use tracing::{debug, warn};

use crate::{
  document::{DocumentId, VersionId},
  selector::SelectableVersion,
};

// ─── Keys ────────────────────────────────────────────────────────────────────

pub mod keys {
  pub const CURRENT_DOCUMENT_CONTENT: &str = "currentDocumentContent";
  pub const CURRENT_DOCUMENT_ID: &str = "currentDocumentId";
  pub const CURRENT_VERSION_ID: &str = "currentVersionId";
  pub const IS_COMPARE_MODE: &str = "isCompareMode";
  pub const SELECTABLE_VERSIONS: &str = "selectableVersions";
  pub const RIGHT_LABEL: &str = "rightLabel";
  pub const RIGHT_CONTENT: &str = "rightContent";
  pub const RESULT_HTML: &str = "resultHtml";

  /// Everything cleared when compare mode is left. The current document
  /// content is not among them; it is overwritten by the next session load.
  pub const COMPARE_KEYS: [&str; 7] = [
    IS_COMPARE_MODE,
    RIGHT_CONTENT,
    RIGHT_LABEL,
    CURRENT_DOCUMENT_ID,
    CURRENT_VERSION_ID,
    SELECTABLE_VERSIONS,
    RESULT_HTML,
  ];
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A string-keyed, string-valued store.
///
/// All methods return `Send` futures so implementations can sit behind a
/// multi-threaded runtime.
pub trait StateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read `key`, `None` if never written or removed.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Write `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every key in `keys`. Missing keys are ignored.
  fn clear<'a>(
    &'a self,
    keys: &'a [&'a str],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// A [`StateStore`] that lives only as long as the process. Cheap to clone;
/// clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
  inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStateStore {
  pub fn new() -> Self { Self::default() }

  /// Every key currently present, sorted.
  pub fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.lock().keys().cloned().collect();
    keys.sort();
    keys
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    // A poisoned map is still a valid map.
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl StateStore for MemoryStateStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.lock().get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), Infallible> {
    self.lock().insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  async fn clear(&self, keys: &[&str]) -> Result<(), Infallible> {
    let mut map = self.lock();
    for key in keys {
      map.remove(*key);
    }
    Ok(())
  }
}

// ─── Typed view ──────────────────────────────────────────────────────────────

/// Everything read back from the store at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSnapshot {
  pub document_content: Option<String>,
  pub document_id:      Option<DocumentId>,
  pub version_id:       Option<VersionId>,
  pub compare_mode:     bool,
  pub selectable:       Vec<SelectableVersion>,
  pub right_label:      Option<String>,
  pub right_content:    Option<String>,
  pub result_html:      Option<String>,
}

/// Typed, best-effort access to a [`StateStore`].
///
/// Writes that fail are logged and dropped: losing a cached UI value must
/// never interrupt an editing session. Reads that fail or do not parse come
/// back as `None`.
pub struct PersistedState<S> {
  store: Arc<S>,
}

impl<S> Clone for PersistedState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: StateStore> PersistedState<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Read the full snapshot. Called once when a session starts.
  pub async fn init(&self) -> UiSnapshot {
    let snapshot = UiSnapshot {
      document_content: self.raw(keys::CURRENT_DOCUMENT_CONTENT).await,
      document_id:      self.parsed(keys::CURRENT_DOCUMENT_ID).await,
      version_id:       self.parsed(keys::CURRENT_VERSION_ID).await,
      compare_mode:     self
        .parsed::<bool>(keys::IS_COMPARE_MODE)
        .await
        .unwrap_or(false),
      selectable:       self.selectable().await,
      right_label:      self.raw(keys::RIGHT_LABEL).await,
      right_content:    self
        .raw(keys::RIGHT_CONTENT)
        .await
        .filter(|c| !c.is_empty()),
      result_html:      self.raw(keys::RESULT_HTML).await,
    };
    debug!(
      compare_mode = snapshot.compare_mode,
      document_id = ?snapshot.document_id,
      version_id = ?snapshot.version_id,
      "restored ui state"
    );
    snapshot
  }

  pub async fn selectable(&self) -> Vec<SelectableVersion> {
    self.parsed_json(keys::SELECTABLE_VERSIONS).await.unwrap_or_default()
  }

  // ── Writes ────────────────────────────────────────────────────────────

  pub async fn set_document_id(&self, doc: DocumentId) {
    self.write(keys::CURRENT_DOCUMENT_ID, &doc.to_string()).await;
  }

  /// `None` removes the key so a later read cannot mistake it for an id.
  pub async fn set_version_id(&self, version: Option<VersionId>) {
    match version {
      Some(v) => self.write(keys::CURRENT_VERSION_ID, &v.to_string()).await,
      None => self.remove(&[keys::CURRENT_VERSION_ID]).await,
    }
  }

  pub async fn set_compare_mode(&self, on: bool) {
    self.write(keys::IS_COMPARE_MODE, if on { "true" } else { "false" }).await;
  }

  pub async fn set_document_content(&self, content: &str) {
    self.write(keys::CURRENT_DOCUMENT_CONTENT, content).await;
  }

  pub async fn set_selectable(&self, versions: &[SelectableVersion]) {
    match serde_json::to_string(versions) {
      Ok(json) => self.write(keys::SELECTABLE_VERSIONS, &json).await,
      Err(e) => warn!("could not encode selectable versions: {e}"),
    }
  }

  pub async fn set_right(&self, label: &str, content: &str) {
    self.write(keys::RIGHT_LABEL, label).await;
    self.write(keys::RIGHT_CONTENT, content).await;
  }

  pub async fn set_result_html(&self, html: &str) {
    self.write(keys::RESULT_HTML, html).await;
  }

  /// Drop every compare-mode key.
  pub async fn clear_compare(&self) { self.remove(&keys::COMPARE_KEYS).await; }

  // ── Plumbing ──────────────────────────────────────────────────────────

  async fn write(&self, key: &str, value: &str) {
    if let Err(e) = self.store.set(key, value).await {
      warn!(key, "could not persist ui state: {e}");
    }
  }

  async fn remove(&self, keys: &[&str]) {
    if let Err(e) = self.store.clear(keys).await {
      warn!(?keys, "could not clear ui state: {e}");
    }
  }

  async fn raw(&self, key: &str) -> Option<String> {
    match self.store.get(key).await {
      Ok(value) => value,
      Err(e) => {
        warn!(key, "could not read ui state: {e}");
        None
      }
    }
  }

  async fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
    let raw = self.raw(key).await?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
      warn!(key, value = %raw, "ignoring unparseable cached value");
    }
    parsed
  }

  async fn parsed_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.raw(key).await?;
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(e) => {
        warn!(key, "ignoring invalid cached json: {e}");
        None
      }
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
