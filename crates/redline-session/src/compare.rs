//! Compare mode: two panes, best-effort persistence of pane edits, and the
//! semantic diff between them.
//!
//! The left pane always shows what was open when compare mode was entered.
//! The right pane starts empty and is filled from one of the selectable
//! versions. Either pane can be edited after it is activated; edits are
//! written back to the server only when a comparison is run.

use redline_core::{
  api::{DocumentApi, SaveTarget},
  diff::{self, DiffSpan},
  document::{DocumentId, VersionId},
  normalize::{is_blank, normalize},
  selector::{DEFAULT_RIGHT_LABEL, SelectableVersion, pane_label, parse_pane_label},
  state::{PersistedState, StateStore, UiSnapshot},
};
use tracing::{debug, error, info, warn};

/// Which pane is currently accepting edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveSide {
  #[default]
  None,
  Left,
  Right,
}

/// One pane's buffer plus the snapshot it is compared against to decide
/// whether it needs saving.
#[derive(Debug, Clone, Default)]
struct Pane {
  text:     String,
  original: Option<String>,
}

impl Pane {
  fn new(text: String) -> Self { Self { text, original: None } }

  fn is_dirty(&self) -> bool { self.original.as_ref().is_some_and(|o| *o != self.text) }

  /// Snapshot taken the first time the pane is activated. Later
  /// activations keep it so edits made across several activations are
  /// still detected.
  fn mark_active(&mut self) {
    if self.original.is_none() {
      self.original = Some(self.text.clone());
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct CompareEngine<S> {
  state:        PersistedState<S>,
  document_id:  DocumentId,
  left_version: Option<VersionId>,
  left_label:   String,
  left:         Pane,
  right:        Option<Pane>,
  right_label:  String,
  right_target: Option<SaveTarget>,
  selectable:   Vec<SelectableVersion>,
  active:       ActiveSide,
  result:       Vec<DiffSpan>,
}

impl<S: StateStore> CompareEngine<S> {
  /// Start a fresh comparison with `left_content` (rich text) on the left.
  pub fn new(
    state: PersistedState<S>,
    document_id: DocumentId,
    left_version: Option<VersionId>,
    left_content: &str,
    selectable: Vec<SelectableVersion>,
  ) -> Self {
    Self {
      state,
      document_id,
      left_version,
      left_label: pane_label(document_id, left_version),
      left: Pane::new(normalize(left_content)),
      right: None,
      right_label: DEFAULT_RIGHT_LABEL.to_string(),
      right_target: None,
      selectable,
      active: ActiveSide::None,
      result: Vec::new(),
    }
  }

  /// Rebuild the engine from a cached snapshot. `None` unless the snapshot
  /// says compare mode was on and names the document it was comparing.
  pub fn restore(state: PersistedState<S>, snapshot: &UiSnapshot) -> Option<Self> {
    if !snapshot.compare_mode {
      return None;
    }
    let document_id = snapshot.document_id?;
    let mut engine = Self::new(
      state,
      document_id,
      snapshot.version_id,
      snapshot.document_content.as_deref().unwrap_or_default(),
      snapshot.selectable.clone(),
    );

    if let Some(content) = &snapshot.right_content {
      engine.right = Some(Pane::new(content.clone()));
      if let Some(label) = &snapshot.right_label {
        engine.right_label = label.clone();
        engine.right_target =
          parse_pane_label(label).map(|(doc, version)| SaveTarget::new(doc, version));
      }
    }

    if let Some(html) = &snapshot.result_html {
      match diff::parse_html(html) {
        Some(spans) => engine.result = spans,
        None => warn!("ignoring unreadable cached diff"),
      }
    }

    debug!(document_id, "restored compare session");
    Some(engine)
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn document_id(&self) -> DocumentId { self.document_id }

  pub fn left_label(&self) -> &str { &self.left_label }

  pub fn left(&self) -> &str { &self.left.text }

  pub fn right_label(&self) -> &str { &self.right_label }

  pub fn right(&self) -> Option<&str> { self.right.as_ref().map(|p| p.text.as_str()) }

  pub fn selectable(&self) -> &[SelectableVersion] { &self.selectable }

  pub fn active_side(&self) -> ActiveSide { self.active }

  /// The last computed diff, empty until a comparison has run.
  pub fn result(&self) -> &[DiffSpan] { &self.result }

  pub fn is_left_dirty(&self) -> bool { self.left.is_dirty() }

  pub fn is_right_dirty(&self) -> bool { self.right.as_ref().is_some_and(Pane::is_dirty) }

  /// A comparison needs something non-blank on the right.
  pub fn is_ready_to_compare(&self) -> bool {
    self.right.as_ref().is_some_and(|p| !is_blank(&p.text))
  }

  // ── Pane activation ───────────────────────────────────────────────────

  /// Activate the left pane. Refused until the right pane has content.
  pub fn select_left(&mut self) -> bool {
    if !self.is_ready_to_compare() {
      debug!("left pane locked until the right pane is chosen");
      return false;
    }
    self.left.mark_active();
    self.active = ActiveSide::Left;
    true
  }

  /// Activate the right pane. Refused while it is still empty.
  pub fn select_right(&mut self) -> bool {
    let Some(pane) = self.right.as_mut() else {
      debug!("right pane has nothing to edit yet");
      return false;
    };
    pane.mark_active();
    self.active = ActiveSide::Right;
    true
  }

  pub fn dismiss(&mut self) { self.active = ActiveSide::None; }

  /// Replace the active pane's buffer.
  pub fn edit_active(&mut self, content: impl Into<String>) {
    match self.active {
      ActiveSide::Left => self.left.text = content.into(),
      ActiveSide::Right => {
        if let Some(pane) = self.right.as_mut() {
          pane.text = content.into();
        }
      }
      ActiveSide::None => warn!("edit ignored: no pane is active"),
    }
  }

  // ── Right pane population ─────────────────────────────────────────────

  /// Load `entry` into the right pane. On failure the pane is unchanged.
  /// Refused once the right pane holds content; only an empty or blank pane
  /// can be (re)filled.
  pub async fn choose_right<A: DocumentApi>(&mut self, api: &A, entry: &SelectableVersion) -> bool {
    if self.is_ready_to_compare() {
      warn!(label = %self.right_label, "right pane already chosen");
      return false;
    }
    let doc = self.document_id;
    let fetched = match entry.id {
      None => api.fetch_document(doc).await.map(|d| d.content),
      Some(version) => api.fetch_version(doc, version).await.map(|v| v.content),
    };
    let content = match fetched {
      Ok(content) => normalize(&content),
      Err(e) => {
        error!("could not load {}: {e}", entry.label);
        return false;
      }
    };

    let label = pane_label(doc, entry.id);
    info!(%label, "right pane chosen");
    self.state.set_right(&label, &content).await;
    self.right = Some(Pane::new(content));
    self.right_label = label;
    self.right_target = Some(SaveTarget::new(doc, entry.id));
    if self.active == ActiveSide::Right {
      self.active = ActiveSide::None;
    }
    true
  }

  // ── Comparison ────────────────────────────────────────────────────────

  /// Save any edited pane, then diff left against right. `None` when the
  /// right pane has not been chosen yet.
  pub async fn run_compare<A: DocumentApi>(&mut self, api: &A) -> Option<&[DiffSpan]> {
    let Some(right) = self.right.as_ref().filter(|p| !is_blank(&p.text)) else {
      info!("nothing to compare against yet");
      return None;
    };
    let right_text = right.text.clone();

    if self.left.is_dirty() {
      let target = SaveTarget::new(self.document_id, self.left_version);
      if save_pane(api, target, &mut self.left).await {
        self.state.set_document_content(&self.left.text).await;
      }
    }

    if self.is_right_dirty() {
      match (self.right_target, self.right.as_mut()) {
        (Some(target), Some(pane)) => {
          save_pane(api, target, pane).await;
        }
        _ => warn!("right pane edits not saved: origin unknown"),
      }
    }

    let spans = diff::semantic_diff(&normalize(&self.left.text), &normalize(&right_text));
    self.state.set_result_html(&diff::render_html(&spans)).await;
    debug!(spans = spans.len(), "comparison computed");
    self.result = spans;
    Some(self.result.as_slice())
  }

  /// Leave compare mode: every compare key is dropped from the cache and
  /// the engine is consumed.
  pub async fn exit(self) {
    self.state.clear_compare().await;
    info!(document_id = self.document_id, "left compare mode");
  }
}

/// Best-effort save; a failure is logged and the pane stays dirty.
async fn save_pane<A: DocumentApi>(api: &A, target: SaveTarget, pane: &mut Pane) -> bool {
  match target.save(api, &pane.text).await {
    Ok(()) => {
      info!(%target, "saved pane edits");
      pane.original = Some(pane.text.clone());
      true
    }
    Err(e) => {
      error!(%target, "could not save pane edits: {e}");
      false
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
