//! Right-pane candidates for compare mode.
//!
//! Whatever is open on the left pane is never offered on the right. When the
//! left pane shows a version, the document's main content becomes a
//! candidate and is listed first.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentId, VersionId, VersionIndex, timestamp};

/// Label shown on the right pane before anything has been chosen.
pub const DEFAULT_RIGHT_LABEL: &str = "Version B";

/// One entry in the right-pane chooser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableVersion {
  /// `None` stands for the document's main content.
  pub id:         Option<VersionId>,
  pub label:      String,
  pub is_main:    bool,
  #[serde(default, rename = "created_at", with = "timestamp::option")]
  pub created_at: Option<NaiveDateTime>,
}

impl SelectableVersion {
  fn main(doc: DocumentId) -> Self {
    Self {
      id:         None,
      label:      format!("Patent {doc}"),
      is_main:    true,
      created_at: None,
    }
  }
}

/// Compute the right-pane candidates for a left pane showing `active_doc`
/// (and `active_version`, if a version is open).
pub fn compute_selectable(
  index: &VersionIndex,
  active_doc: DocumentId,
  active_version: Option<VersionId>,
) -> Vec<SelectableVersion> {
  let versions = index.versions_of(active_doc);
  let mut out = Vec::with_capacity(versions.len() + 1);

  if active_version.is_some() {
    out.push(SelectableVersion::main(active_doc));
  }

  out.extend(
    versions
      .iter()
      .filter(|v| Some(v.id) != active_version)
      .map(|v| SelectableVersion {
        id:         Some(v.id),
        label:      format!("Patent {active_doc} - Version {}", v.id),
        is_main:    false,
        created_at: Some(v.created_at),
      }),
  );
  out
}

/// Heading for a pane showing `doc`, or one of its versions.
pub fn pane_label(doc: DocumentId, version: Option<VersionId>) -> String {
  match version {
    Some(v) => format!("Patent {doc} - Version {v}"),
    None => format!("Patent {doc} - Main"),
  }
}

/// Inverse of [`pane_label`]. Used to recover where a restored right pane
/// came from, since only its label is cached.
pub fn parse_pane_label(label: &str) -> Option<(DocumentId, Option<VersionId>)> {
  let (doc, rest) = label.strip_prefix("Patent ")?.split_once(" - ")?;
  let doc = doc.parse().ok()?;
  if rest == "Main" {
    return Some((doc, None));
  }
  let version = rest.strip_prefix("Version ")?.parse().ok()?;
  Some((doc, Some(version)))
}
