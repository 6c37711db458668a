//! Plain-text and coloured output.
//!
//! With colour on, insertions are green and deletions red with a strike
//! through. Without it (output redirected), `{+…+}` and `[-…-]` markers are
//! used instead.

use std::io::{self, Write};

use crossterm::style::Stylize;
use redline_core::{
  diff::{DiffSpan, SpanKind},
  document::{DocumentId, VersionId, VersionIndex, timestamp},
  suggestion::Issue,
};

pub fn spans(out: &mut impl Write, spans: &[DiffSpan], color: bool) -> io::Result<()> {
  if spans.is_empty() {
    return writeln!(out, "(no differences computed yet)");
  }
  for span in spans {
    let text = span.text.as_str();
    match (span.kind, color) {
      (SpanKind::Unchanged, _) => write!(out, "{text}")?,
      (SpanKind::Insert, true) => write!(out, "{}", text.green())?,
      (SpanKind::Delete, true) => write!(out, "{}", text.red().crossed_out())?,
      (SpanKind::Insert, false) => write!(out, "{{+{text}+}}")?,
      (SpanKind::Delete, false) => write!(out, "[-{text}-]")?,
    }
  }
  writeln!(out)
}

pub fn issues(out: &mut impl Write, issues: &[Issue]) -> io::Result<()> {
  if issues.is_empty() {
    return writeln!(out, "No issues.");
  }
  for (n, issue) in issues.iter().enumerate() {
    writeln!(out, "{}. [paragraph {}] {issue}", n + 1, issue.paragraph)?;
  }
  Ok(())
}

/// The version listing, one line per patent, marking what is open.
pub fn versions(
  out: &mut impl Write,
  index: &VersionIndex,
  open: (DocumentId, Option<VersionId>),
) -> io::Result<()> {
  if index.is_empty() {
    return writeln!(out, "No versions yet.");
  }
  for (doc, versions) in index.documents() {
    let main_mark = if open == (doc, None) { "*" } else { "" };
    write!(out, "Patent {doc}{main_mark}:")?;
    if versions.is_empty() {
      write!(out, " (no versions)")?;
    }
    for v in versions {
      let mark = if open == (doc, Some(v.id)) { "*" } else { "" };
      write!(out, " v{}{mark} ({})", v.id, timestamp::format(&v.created_at))?;
    }
    writeln!(out)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use redline_core::document::VersionSummary;

  use super::*;

  fn text(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
  }

  #[test]
  fn plain_spans_use_markers() {
    let spans = vec![
      DiffSpan::new(SpanKind::Unchanged, "The quick "),
      DiffSpan::new(SpanKind::Delete, "red"),
      DiffSpan::new(SpanKind::Insert, "brown"),
      DiffSpan::new(SpanKind::Unchanged, " fox"),
    ];
    assert_eq!(
      text(|o| super::spans(o, &spans, false)),
      "The quick [-red-]{+brown+} fox\n"
    );
  }

  #[test]
  fn coloured_spans_keep_the_text() {
    let spans = vec![DiffSpan::new(SpanKind::Delete, "red")];
    let out = text(|o| super::spans(o, &spans, true));
    assert!(out.contains("red"));
    assert!(out.contains('\u{1b}'));
  }

  #[test]
  fn issue_list() {
    let issue = Issue {
      kind:        "Punctuation".to_string(),
      severity:    "low".to_string(),
      paragraph:   2,
      description: "Missing period.".to_string(),
      suggestion:  "Add one.".to_string(),
    };
    assert_eq!(
      text(|o| issues(o, &[issue])),
      "1. [paragraph 2] Punctuation (low) - Missing period.\n  Suggestion: Add one.\n"
    );
    assert_eq!(text(|o| issues(o, &[])), "No issues.\n");
  }

  #[test]
  fn version_listing_marks_open_entry() {
    let index: VersionIndex = [3, 4]
      .into_iter()
      .map(|id| VersionSummary {
        id,
        created_at: timestamp::parse("2025-01-02 03:04").unwrap(),
        patent_parent: 1,
      })
      .collect();
    assert_eq!(
      text(|o| versions(o, &index, (1, Some(4)))),
      "Patent 1: v3 (2025-01-02 03:04) v4* (2025-01-02 03:04)\n"
    );
  }
}
