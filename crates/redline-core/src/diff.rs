//! Semantic text diff: left text → right text as annotated spans.
//!
//! A Myers character diff from `similar` gives the minimal edit script. That
//! script is then reshaped for people rather than machines:
//!
//! 1. Adjacent like operations are merged and common prefixes/suffixes of
//!    paired delete/insert runs are factored out into unchanged text.
//! 2. Short unchanged fragments sandwiched between larger edits are folded
//!    into the edits ("semantic cleanup").
//! 3. Single edits between two unchanged runs are slid left or right to the
//!    most natural boundary (blank line, line break, sentence end, word
//!    break).
//! 4. A delete followed by an insert that overlap by at least half of either
//!    side have the overlap pulled out as unchanged text.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, utils::diff_chars};

// ─── Public types ────────────────────────────────────────────────────────────

/// What happened to a run of text going from left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
  /// Present only on the right.
  Insert,
  /// Present only on the left.
  Delete,
  /// Present on both sides.
  Unchanged,
}

/// One run of the rendered diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
  pub kind: SpanKind,
  pub text: String,
}

impl DiffSpan {
  pub fn new(kind: SpanKind, text: impl Into<String>) -> Self {
    Self { kind, text: text.into() }
  }
}

/// Compute the semantic diff between `left` and `right`.
///
/// Never fails; identical inputs yield a single unchanged span and two empty
/// inputs yield no spans at all. Concatenating the unchanged and delete spans
/// reproduces `left`; unchanged and insert spans reproduce `right`.
pub fn semantic_diff(left: &str, right: &str) -> Vec<DiffSpan> {
  let mut ops: Vec<Op> = diff_chars(Algorithm::Myers, left, right)
    .into_iter()
    .map(|(tag, text)| Op {
      kind: match tag {
        ChangeTag::Equal => SpanKind::Unchanged,
        ChangeTag::Delete => SpanKind::Delete,
        ChangeTag::Insert => SpanKind::Insert,
      },
      text: text.chars().collect(),
    })
    .filter(|op| !op.text.is_empty())
    .collect();

  cleanup_merge(&mut ops);
  cleanup_semantic(&mut ops);

  let mut spans: Vec<DiffSpan> = Vec::with_capacity(ops.len());
  for op in ops.into_iter().filter(|op| !op.text.is_empty()) {
    match spans.last_mut() {
      Some(last) if last.kind == op.kind => last.text.extend(op.text),
      _ => spans.push(DiffSpan {
        kind: op.kind,
        text: op.text.into_iter().collect(),
      }),
    }
  }
  spans
}

/// Reassemble the left-hand text from a span list.
pub fn left_text(spans: &[DiffSpan]) -> String {
  spans
    .iter()
    .filter(|s| s.kind != SpanKind::Insert)
    .map(|s| s.text.as_str())
    .collect()
}

/// Reassemble the right-hand text from a span list.
pub fn right_text(spans: &[DiffSpan]) -> String {
  spans
    .iter()
    .filter(|s| s.kind != SpanKind::Delete)
    .map(|s| s.text.as_str())
    .collect()
}

// ─── HTML rendering ──────────────────────────────────────────────────────────

/// Render spans as `<ins>`, `<del>`, and `<span>` elements, escaping text.
pub fn render_html(spans: &[DiffSpan]) -> String {
  let mut out = String::new();
  for span in spans {
    let tag = tag_for(span.kind);
    out.push('<');
    out.push_str(tag);
    out.push('>');
    escape_into(&span.text, &mut out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
  }
  out
}

/// Parse the output of [`render_html`] back into spans.
///
/// Returns `None` for anything [`render_html`] could not have produced.
pub fn parse_html(html: &str) -> Option<Vec<DiffSpan>> {
  let mut spans = Vec::new();
  let mut rest = html;
  while !rest.is_empty() {
    let (kind, tag) = [SpanKind::Insert, SpanKind::Delete, SpanKind::Unchanged]
      .into_iter()
      .map(|k| (k, tag_for(k)))
      .find(|(_, tag)| {
        rest
          .strip_prefix('<')
          .and_then(|r| r.strip_prefix(tag))
          .is_some_and(|r| r.starts_with('>'))
      })?;
    rest = &rest[tag.len() + 2..];
    let close = format!("</{tag}>");
    let end = rest.find(&close)?;
    let body = &rest[..end];
    if body.contains('<') || body.contains('>') {
      return None;
    }
    spans.push(DiffSpan::new(kind, unescape(body)?));
    rest = &rest[end + close.len()..];
  }
  Some(spans)
}

fn tag_for(kind: SpanKind) -> &'static str {
  match kind {
    SpanKind::Insert => "ins",
    SpanKind::Delete => "del",
    SpanKind::Unchanged => "span",
  }
}

fn escape_into(text: &str, out: &mut String) {
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      c => out.push(c),
    }
  }
}

fn unescape(text: &str) -> Option<String> {
  let mut out = String::with_capacity(text.len());
  let mut rest = text;
  while let Some(i) = rest.find('&') {
    out.push_str(&rest[..i]);
    rest = &rest[i..];
    let (ch, len) = if rest.starts_with("&amp;") {
      ('&', 5)
    } else if rest.starts_with("&lt;") {
      ('<', 4)
    } else if rest.starts_with("&gt;") {
      ('>', 4)
    } else {
      return None;
    };
    out.push(ch);
    rest = &rest[len..];
  }
  out.push_str(rest);
  Some(out)
}

// ─── Edit-script cleanup ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Op {
  kind: SpanKind,
  text: Vec<char>,
}

impl Op {
  fn new(kind: SpanKind, text: &[char]) -> Self {
    Self { kind, text: text.to_vec() }
  }

  fn is_equal(&self) -> bool { self.kind == SpanKind::Unchanged }
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
  a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
  a.iter()
    .rev()
    .zip(b.iter().rev())
    .take_while(|(x, y)| x == y)
    .count()
}

/// Length of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &[char], b: &[char]) -> usize {
  if a.is_empty() || b.is_empty() {
    return 0;
  }
  let len = a.len().min(b.len());
  let a = &a[a.len() - len..];
  let b = &b[..len];
  if a == b {
    return len;
  }

  // Grow a candidate suffix of `a`, jumping ahead to wherever it next
  // occurs in `b`.
  let mut best = 0;
  let mut length = 1;
  loop {
    let pattern = &a[len - length..];
    let Some(found) = b.windows(pattern.len()).position(|w| w == pattern) else {
      return best;
    };
    length += found;
    if length > len {
      return best;
    }
    if found == 0 || a[len - length..] == b[..length] {
      best = length;
      length += 1;
      if length > len {
        return best;
      }
    }
  }
}

/// Merge runs of like operations, factor shared prefixes/suffixes out of
/// delete/insert pairs, and slide single edits to absorb a neighbouring
/// equality where possible.
fn cleanup_merge(ops: &mut Vec<Op>) {
  loop {
    merge_pass(ops);
    if !shift_pass(ops) {
      return;
    }
  }
}

fn merge_pass(ops: &mut Vec<Op>) {
  // Trailing sentinel so the final run of edits is flushed.
  ops.push(Op::new(SpanKind::Unchanged, &[]));

  let mut pointer = 0;
  let mut count_delete = 0;
  let mut count_insert = 0;
  let mut text_delete: Vec<char> = Vec::new();
  let mut text_insert: Vec<char> = Vec::new();

  while pointer < ops.len() {
    match ops[pointer].kind {
      SpanKind::Insert => {
        count_insert += 1;
        text_insert.extend_from_slice(&ops[pointer].text);
        pointer += 1;
      }
      SpanKind::Delete => {
        count_delete += 1;
        text_delete.extend_from_slice(&ops[pointer].text);
        pointer += 1;
      }
      SpanKind::Unchanged => {
        if count_delete + count_insert > 1 {
          if count_delete != 0 && count_insert != 0 {
            let prefix = common_prefix(&text_insert, &text_delete);
            if prefix != 0 {
              let start = pointer - count_delete - count_insert;
              if start > 0 && ops[start - 1].is_equal() {
                ops[start - 1].text.extend_from_slice(&text_insert[..prefix]);
              } else {
                ops.insert(0, Op::new(SpanKind::Unchanged, &text_insert[..prefix]));
                pointer += 1;
              }
              text_insert.drain(..prefix);
              text_delete.drain(..prefix);
            }
            let suffix = common_suffix(&text_insert, &text_delete);
            if suffix != 0 {
              let mut merged = text_insert[text_insert.len() - suffix..].to_vec();
              merged.extend_from_slice(&ops[pointer].text);
              ops[pointer].text = merged;
              text_insert.truncate(text_insert.len() - suffix);
              text_delete.truncate(text_delete.len() - suffix);
            }
          }

          pointer -= count_delete + count_insert;
          ops.drain(pointer..pointer + count_delete + count_insert);
          if !text_delete.is_empty() {
            ops.insert(pointer, Op::new(SpanKind::Delete, &text_delete));
            pointer += 1;
          }
          if !text_insert.is_empty() {
            ops.insert(pointer, Op::new(SpanKind::Insert, &text_insert));
            pointer += 1;
          }
          pointer += 1;
        } else if pointer != 0 && ops[pointer - 1].is_equal() {
          let text = std::mem::take(&mut ops[pointer].text);
          ops[pointer - 1].text.extend(text);
          ops.remove(pointer);
        } else {
          pointer += 1;
        }
        count_insert = 0;
        count_delete = 0;
        text_delete.clear();
        text_insert.clear();
      }
    }
  }

  if ops.last().is_some_and(|op| op.text.is_empty()) {
    ops.pop();
  }
}

/// `A<ins>BA</ins>C` → `<ins>AB</ins>AC` and `A<ins>BC</ins>B` →
/// `AB<ins>CB</ins>`. Returns `true` if anything moved.
fn shift_pass(ops: &mut Vec<Op>) -> bool {
  let mut changed = false;
  let mut pointer = 1;
  while pointer + 1 < ops.len() {
    if ops[pointer - 1].is_equal() && ops[pointer + 1].is_equal() {
      let prev = ops[pointer - 1].text.clone();
      let edit = ops[pointer].text.clone();
      let next = ops[pointer + 1].text.clone();

      if !prev.is_empty() && edit.ends_with(&prev) {
        let mut shifted = prev.clone();
        shifted.extend_from_slice(&edit[..edit.len() - prev.len()]);
        ops[pointer].text = shifted;
        let mut following = prev;
        following.extend_from_slice(&next);
        ops[pointer + 1].text = following;
        ops.remove(pointer - 1);
        changed = true;
      } else if !next.is_empty() && edit.starts_with(&next) {
        ops[pointer - 1].text.extend_from_slice(&next);
        let mut shifted = edit[next.len()..].to_vec();
        shifted.extend_from_slice(&next);
        ops[pointer].text = shifted;
        ops.remove(pointer + 1);
        changed = true;
      }
    }
    pointer += 1;
  }
  changed
}

/// Fold equalities that are no longer than the edits on both sides of them
/// into those edits, then align edits to natural boundaries and pull out
/// large delete/insert overlaps.
fn cleanup_semantic(ops: &mut Vec<Op>) {
  let mut changed = false;
  // Indices of equalities seen so far, innermost last.
  let mut equalities: Vec<usize> = Vec::new();
  let mut last_equality: Option<Vec<char>> = None;
  let mut pointer: isize = 0;
  let mut insertions_before = 0;
  let mut deletions_before = 0;
  let mut insertions_after = 0;
  let mut deletions_after = 0;

  while (pointer as usize) < ops.len() {
    let p = pointer as usize;
    if ops[p].is_equal() {
      equalities.push(p);
      insertions_before = insertions_after;
      deletions_before = deletions_after;
      insertions_after = 0;
      deletions_after = 0;
      last_equality = Some(ops[p].text.clone());
    } else {
      if ops[p].kind == SpanKind::Insert {
        insertions_after += ops[p].text.len();
      } else {
        deletions_after += ops[p].text.len();
      }

      let fold = last_equality.as_ref().is_some_and(|eq| {
        !eq.is_empty()
          && eq.len() <= insertions_before.max(deletions_before)
          && eq.len() <= insertions_after.max(deletions_after)
      });
      if fold
        && let Some(eq) = last_equality.take()
        && let Some(at) = equalities.pop()
      {
        ops.insert(at, Op { kind: SpanKind::Delete, text: eq });
        ops[at + 1].kind = SpanKind::Insert;
        // The equality before the folded one must be re-evaluated now that
        // its neighbourhood changed.
        equalities.pop();
        pointer = equalities.last().map_or(-1, |&i| i as isize);
        insertions_before = 0;
        deletions_before = 0;
        insertions_after = 0;
        deletions_after = 0;
        changed = true;
      }
    }
    pointer += 1;
  }

  if changed {
    cleanup_merge(ops);
  }
  cleanup_semantic_lossless(ops);
  extract_overlaps(ops);
}

/// Slide each single edit bounded by equalities to the position with the
/// best boundary score.
fn cleanup_semantic_lossless(ops: &mut Vec<Op>) {
  let mut pointer: isize = 1;
  while pointer >= 0 && (pointer as usize) + 1 < ops.len() {
    let p = pointer as usize;
    if ops[p - 1].is_equal() && ops[p + 1].is_equal() {
      let mut equality1 = ops[p - 1].text.clone();
      let mut edit = ops[p].text.clone();
      let mut equality2 = ops[p + 1].text.clone();

      // First shift the edit as far left as it will go.
      let offset = common_suffix(&equality1, &edit);
      if offset > 0 {
        let common = edit[edit.len() - offset..].to_vec();
        equality1.truncate(equality1.len() - offset);
        let mut shifted = common.clone();
        shifted.extend_from_slice(&edit[..edit.len() - offset]);
        edit = shifted;
        let mut following = common;
        following.extend_from_slice(&equality2);
        equality2 = following;
      }

      // Then step right one character at a time, keeping the best fit.
      let mut best = (equality1.clone(), edit.clone(), equality2.clone());
      let mut best_score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
      while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
        let c = equality2.remove(0);
        equality1.push(edit.remove(0));
        edit.push(c);
        let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
        // `>=` prefers the rightmost of equally good positions.
        if score >= best_score {
          best_score = score;
          best = (equality1.clone(), edit.clone(), equality2.clone());
        }
      }

      let (best_equality1, best_edit, best_equality2) = best;
      if ops[p - 1].text != best_equality1 {
        let mut at = p;
        if best_equality1.is_empty() {
          ops.remove(at - 1);
          at -= 1;
          pointer -= 1;
        } else {
          ops[at - 1].text = best_equality1;
        }
        ops[at].text = best_edit;
        if best_equality2.is_empty() {
          ops.remove(at + 1);
          pointer -= 1;
        } else {
          ops[at + 1].text = best_equality2;
        }
      }
    }
    pointer += 1;
  }
}

/// How natural the boundary between `one` and `two` is, from 0 (inside a
/// word) to 6 (edge of the text).
fn boundary_score(one: &[char], two: &[char]) -> u8 {
  let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
    return 6;
  };

  let non_alnum1 = !c1.is_alphanumeric();
  let non_alnum2 = !c2.is_alphanumeric();
  let whitespace1 = non_alnum1 && c1.is_whitespace();
  let whitespace2 = non_alnum2 && c2.is_whitespace();
  let line_break1 = whitespace1 && (c1 == '\r' || c1 == '\n');
  let line_break2 = whitespace2 && (c2 == '\r' || c2 == '\n');
  let blank_line1 = line_break1 && ends_with_blank_line(one);
  let blank_line2 = line_break2 && starts_with_blank_line(two);

  if blank_line1 || blank_line2 {
    5
  } else if line_break1 || line_break2 {
    4
  } else if non_alnum1 && !whitespace1 && whitespace2 {
    3
  } else if whitespace1 || whitespace2 {
    2
  } else if non_alnum1 || non_alnum2 {
    1
  } else {
    0
  }
}

/// `\n\n` or `\n\r\n` at the end.
fn ends_with_blank_line(text: &[char]) -> bool {
  text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

/// `\n\n`, `\r\n\n`, `\n\r\n`, or `\r\n\r\n` at the start.
fn starts_with_blank_line(text: &[char]) -> bool {
  let rest = text.strip_prefix(&['\r']).unwrap_or(text);
  let Some(rest) = rest.strip_prefix(&['\n']) else {
    return false;
  };
  let rest = rest.strip_prefix(&['\r']).unwrap_or(rest);
  rest.starts_with(&['\n'])
}

/// `<del>abcxxx</del><ins>xxxdef</ins>` → `<del>abc</del>xxx<ins>def</ins>`,
/// and the mirror case, when the overlap is at least half of either edit.
fn extract_overlaps(ops: &mut Vec<Op>) {
  let mut pointer = 1;
  while pointer < ops.len() {
    if ops[pointer - 1].kind == SpanKind::Delete && ops[pointer].kind == SpanKind::Insert {
      let deletion = ops[pointer - 1].text.clone();
      let insertion = ops[pointer].text.clone();
      let forward = common_overlap(&deletion, &insertion);
      let backward = common_overlap(&insertion, &deletion);
      let half = |n: usize, of: &[char]| 2 * n >= of.len();

      if forward >= backward {
        if forward > 0 && (half(forward, &deletion) || half(forward, &insertion)) {
          ops.insert(pointer, Op::new(SpanKind::Unchanged, &insertion[..forward]));
          ops[pointer - 1].text = deletion[..deletion.len() - forward].to_vec();
          ops[pointer + 1].text = insertion[forward..].to_vec();
          pointer += 1;
        }
      } else if backward > 0 && (half(backward, &deletion) || half(backward, &insertion)) {
        ops.insert(pointer, Op::new(SpanKind::Unchanged, &deletion[..backward]));
        ops[pointer - 1] = Op::new(SpanKind::Insert, &insertion[..insertion.len() - backward]);
        ops[pointer + 1] = Op::new(SpanKind::Delete, &deletion[backward..]);
        pointer += 1;
      }
      pointer += 1;
    }
    pointer += 1;
  }
  ops.retain(|op| !op.text.is_empty());
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(spans: &[DiffSpan]) -> Vec<SpanKind> { spans.iter().map(|s| s.kind).collect() }

  fn ops(spec: &[(SpanKind, &str)]) -> Vec<Op> {
    spec
      .iter()
      .map(|(k, t)| Op { kind: *k, text: t.chars().collect() })
      .collect()
  }

  fn as_pairs(ops: &[Op]) -> Vec<(SpanKind, String)> {
    ops
      .iter()
      .map(|op| (op.kind, op.text.iter().collect()))
      .collect()
  }

  use SpanKind::{Delete as D, Insert as I, Unchanged as U};

  #[test]
  fn inserted_word_is_one_span() {
    let spans = semantic_diff("The quick fox", "The quick brown fox");
    let inserts: Vec<_> = spans.iter().filter(|s| s.kind == I).collect();
    assert_eq!(inserts.len(), 1, "spans: {spans:?}");
    assert_eq!(inserts[0].text, "brown ");
    assert!(spans.iter().all(|s| s.kind != D));
    assert_eq!(right_text(&spans), "The quick brown fox");
    assert_eq!(left_text(&spans), "The quick fox");
  }

  #[test]
  fn identical_and_empty_inputs() {
    assert_eq!(semantic_diff("same", "same"), vec![DiffSpan::new(U, "same")]);
    assert!(semantic_diff("", "").is_empty());
    assert_eq!(semantic_diff("", "new"), vec![DiffSpan::new(I, "new")]);
    assert_eq!(semantic_diff("old", ""), vec![DiffSpan::new(D, "old")]);
  }

  #[test]
  fn reconstructs_both_sides() {
    let pairs = [
      ("A device comprising a lever.", "A device comprising two levers and a spring."),
      ("claim 1\nclaim 2\n\nclaim 3", "claim 1\nclaim 2b\n\nclaim 4\n"),
      ("héllo wörld", "hello world!"),
      ("abc", "xyz"),
    ];
    for (left, right) in pairs {
      let spans = semantic_diff(left, right);
      assert_eq!(left_text(&spans), left, "left mismatch for {left:?} → {right:?}");
      assert_eq!(right_text(&spans), right, "right mismatch for {left:?} → {right:?}");
      assert!(spans.iter().all(|s| !s.text.is_empty()));
      assert!(
        spans.windows(2).all(|w| w[0].kind != w[1].kind),
        "adjacent like spans in {spans:?}"
      );
    }
  }

  #[test]
  fn unrelated_text_becomes_one_replacement() {
    // A minimal diff would keep the shared letters scattered through both
    // words; the semantic one replaces the word wholesale.
    let spans = semantic_diff("mouse", "sofas");
    assert_eq!(kinds(&spans), vec![D, I]);
    assert_eq!(spans[0].text, "mouse");
    assert_eq!(spans[1].text, "sofas");
  }

  #[test]
  fn merge_combines_and_factors() {
    let mut v = ops(&[(U, "a"), (D, "b"), (D, "c"), (I, "d"), (I, "e"), (U, "f")]);
    cleanup_merge(&mut v);
    assert_eq!(
      as_pairs(&v),
      vec![(U, "a".into()), (D, "bc".into()), (I, "de".into()), (U, "f".into())]
    );

    let mut v = ops(&[(D, "a"), (I, "abc"), (D, "dc")]);
    cleanup_merge(&mut v);
    assert_eq!(
      as_pairs(&v),
      vec![(U, "a".into()), (D, "d".into()), (I, "b".into()), (U, "c".into())]
    );
  }

  #[test]
  fn merge_slides_edits_over_equalities() {
    let mut v = ops(&[(U, "a"), (I, "ba"), (U, "c")]);
    cleanup_merge(&mut v);
    assert_eq!(as_pairs(&v), vec![(I, "ab".into()), (U, "ac".into())]);

    let mut v = ops(&[(U, "a"), (I, "bc"), (U, "b")]);
    cleanup_merge(&mut v);
    assert_eq!(as_pairs(&v), vec![(U, "ab".into()), (I, "cb".into())]);
  }

  #[test]
  fn semantic_folds_small_equalities() {
    let mut v = ops(&[(D, "ab"), (U, "cd"), (D, "e"), (U, "f"), (I, "g")]);
    cleanup_semantic(&mut v);
    assert_eq!(as_pairs(&v), vec![(D, "abcdef".into()), (I, "cdfg".into())]);
  }

  #[test]
  fn semantic_keeps_large_equalities() {
    let mut v = ops(&[(D, "a"), (U, "shared text"), (I, "b")]);
    let before = as_pairs(&v);
    cleanup_semantic(&mut v);
    assert_eq!(as_pairs(&v), before);
  }

  #[test]
  fn lossless_aligns_to_word_boundary() {
    let mut v = ops(&[(U, "The c"), (I, "ow and the c"), (U, "at.")]);
    cleanup_semantic_lossless(&mut v);
    assert_eq!(
      as_pairs(&v),
      vec![(U, "The ".into()), (I, "cow and the ".into()), (U, "cat.".into())]
    );
  }

  #[test]
  fn overlap_extraction() {
    let mut v = ops(&[(D, "abcxxx"), (I, "xxxdef")]);
    extract_overlaps(&mut v);
    assert_eq!(
      as_pairs(&v),
      vec![(D, "abc".into()), (U, "xxx".into()), (I, "def".into())]
    );

    let mut v = ops(&[(D, "xxxabc"), (I, "defxxx")]);
    extract_overlaps(&mut v);
    assert_eq!(
      as_pairs(&v),
      vec![(I, "def".into()), (U, "xxx".into()), (D, "abc".into())]
    );

    // Too small to bother.
    let mut v = ops(&[(D, "abcdefx"), (I, "xghijkl")]);
    let before = as_pairs(&v);
    extract_overlaps(&mut v);
    assert_eq!(as_pairs(&v), before);
  }

  #[test]
  fn overlap_lengths() {
    let c = |s: &str| s.chars().collect::<Vec<_>>();
    assert_eq!(common_overlap(&c(""), &c("abcd")), 0);
    assert_eq!(common_overlap(&c("abc"), &c("abcd")), 3);
    assert_eq!(common_overlap(&c("123456"), &c("abcd")), 0);
    assert_eq!(common_overlap(&c("123456xxx"), &c("xxxabcd")), 3);
  }

  #[test]
  fn boundary_scores() {
    let c = |s: &str| s.chars().collect::<Vec<_>>();
    assert_eq!(boundary_score(&c(""), &c("x")), 6);
    assert_eq!(boundary_score(&c("a\n\n"), &c("b")), 5);
    assert_eq!(boundary_score(&c("a\n"), &c("b")), 4);
    assert_eq!(boundary_score(&c("a."), &c(" b")), 3);
    assert_eq!(boundary_score(&c("a "), &c("b")), 2);
    assert_eq!(boundary_score(&c("a,"), &c("b")), 1);
    assert_eq!(boundary_score(&c("ab"), &c("cd")), 0);
  }

  #[test]
  fn html_round_trip_with_escaping() {
    let spans = vec![
      DiffSpan::new(U, "a < b & "),
      DiffSpan::new(D, "c > d"),
      DiffSpan::new(I, "e"),
    ];
    let html = render_html(&spans);
    assert_eq!(
      html,
      "<span>a &lt; b &amp; </span><del>c &gt; d</del><ins>e</ins>"
    );
    assert_eq!(parse_html(&html), Some(spans));
    assert_eq!(parse_html(""), Some(vec![]));
  }

  #[test]
  fn parse_html_rejects_foreign_markup() {
    assert_eq!(parse_html("<p>x</p>"), None);
    assert_eq!(parse_html("<ins>unterminated"), None);
    assert_eq!(parse_html("<span>a &nbsp; b</span>"), None);
    assert_eq!(parse_html("plain"), None);
  }
}
