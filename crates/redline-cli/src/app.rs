//! Command dispatcher: maps parsed input onto session actions and prints
//! the outcome.

use std::io::{self, Write};

use redline_core::{api::DocumentApi, state::StateStore, suggestion::ChannelEvent};
use redline_session::{ActiveSide, SessionController};

use crate::{
  command::{Command, HELP},
  render,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
}

pub struct App<A, S> {
  session: SessionController<A, S>,
  color:   bool,
}

impl<A: DocumentApi, S: StateStore> App<A, S> {
  pub fn new(session: SessionController<A, S>, color: bool) -> Self { Self { session, color } }

  /// Load the session and show where it starts.
  pub async fn start(&mut self, out: &mut impl Write) -> io::Result<()> {
    self.session.init().await;
    self.show(out)?;
    self.flush_status(out)
  }

  pub async fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
    if line.trim().is_empty() {
      return Ok(Flow::Continue);
    }
    let flow = match line.parse::<Command>() {
      Ok(cmd) => self.execute(cmd, out).await?,
      Err(e) => {
        writeln!(out, "{e:#}")?;
        Flow::Continue
      }
    };
    self.flush_status(out)?;
    Ok(flow)
  }

  pub fn on_channel_event(&mut self, event: ChannelEvent, out: &mut impl Write) -> io::Result<()> {
    let is_message = matches!(event, ChannelEvent::Message(_));
    let before = self.session.issues().to_vec();
    self.session.handle_channel_event(event);
    if is_message && self.session.issues() != before.as_slice() {
      writeln!(out, "\nReview updated:")?;
      render::issues(out, self.session.issues())?;
    }
    Ok(())
  }

  // ── Dispatch ──────────────────────────────────────────────────────────────

  async fn execute(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<Flow> {
    match cmd {
      Command::Help => writeln!(out, "{HELP}")?,
      Command::Quit => return Ok(Flow::Quit),
      Command::Issues => {
        if !self.session.is_connected() {
          writeln!(out, "(review channel offline)")?;
        }
        render::issues(out, self.session.issues())?;
      }
      Command::Show => self.show(out)?,
      Command::List => render::versions(
        out,
        self.session.versions(),
        (self.session.document_id(), self.session.version_id()),
      )?,
      cmd if self.session.is_compare_mode() => self.execute_compare(cmd, out).await?,
      cmd => self.execute_edit(cmd, out).await?,
    }
    Ok(Flow::Continue)
  }

  async fn execute_edit(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<()> {
    match cmd {
      Command::Open(doc) => {
        if self.session.switch_to_main(doc).await {
          self.show(out)?;
        }
      }
      Command::Version(doc, id) => {
        if self.session.switch_to_version(doc, id).await {
          self.show(out)?;
        }
      }
      Command::Set(text) => self.session.set_content(text),
      Command::Append(text) => {
        let content = format!("{}{text}", self.session.content());
        self.session.set_content(content);
      }
      Command::Save => {
        self.session.save().await;
      }
      Command::NewVersion => {
        if let Some(id) = self.session.create_version().await {
          writeln!(out, "Created version {id}.")?;
        }
      }
      Command::Delete(doc, id) => {
        if self.session.delete_version(doc, id).await {
          writeln!(out, "Deleted version {id}.")?;
        }
      }
      Command::Compare => {
        if self.session.enter_compare().await {
          self.show(out)?;
        }
      }
      _ => writeln!(out, "Only available in compare mode (`compare` to enter).")?,
    }
    Ok(())
  }

  async fn execute_compare(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<()> {
    match cmd {
      Command::Pick(id) => {
        let chosen = self.session.compare().is_some_and(|e| e.is_ready_to_compare());
        if chosen {
          writeln!(out, "The right pane is already chosen.")?;
        } else if self.session.choose_right(id).await {
          self.show(out)?;
        }
      }
      Command::Run => match self.session.run_compare().await {
        Some(spans) => render::spans(out, &spans, self.color)?,
        None if self.session.compare().is_some_and(|e| e.right().is_some()) => {
          writeln!(out, "The right pane is empty.")?
        }
        None => writeln!(out, "Pick something for the right pane first.")?,
      },
      Command::ExitCompare => {
        self.session.exit_compare().await;
        self.show(out)?;
      }
      cmd => {
        let Some(engine) = self.session.compare_mut() else {
          return Ok(());
        };
        match cmd {
          Command::Left => {
            if !engine.select_left() {
              writeln!(out, "Choose a right pane before editing the left one.")?;
            }
          }
          Command::Right => {
            if !engine.select_right() {
              writeln!(out, "The right pane is empty.")?;
            }
          }
          Command::Dismiss => engine.dismiss(),
          Command::Edit(text) => {
            if engine.active_side() == ActiveSide::None {
              writeln!(out, "Activate a pane first (`left` or `right`).")?;
            } else {
              engine.edit_active(text);
            }
          }
          _ => writeln!(out, "Not available in compare mode (`exit-compare` to leave).")?,
        }
      }
    }
    Ok(())
  }

  // ── Output ────────────────────────────────────────────────────────────────

  fn show(&self, out: &mut impl Write) -> io::Result<()> {
    let s = &self.session;
    let Some(engine) = s.compare() else {
      write!(out, "Patent {}", s.document_id())?;
      if let Some(id) = s.version_id() {
        write!(out, " - Version {id}")?;
      }
      if let Some(name) = s.version_name() {
        write!(out, " ({name})")?;
      }
      if s.has_unsaved_changes() {
        write!(out, " [unsaved]")?;
      }
      writeln!(out)?;
      return writeln!(out, "{}", s.content());
    };

    let marker = |side| if engine.active_side() == side { " [editing]" } else { "" };
    writeln!(out, "{}{}", engine.left_label(), marker(ActiveSide::Left))?;
    writeln!(out, "  {}", engine.left())?;
    writeln!(out, "{}{}", engine.right_label(), marker(ActiveSide::Right))?;
    match engine.right() {
      Some(text) => writeln!(out, "  {text}")?,
      None if engine.selectable().is_empty() => writeln!(out, "  There's no version to compare.")?,
      None => {
        writeln!(out, "  Choose a file to compare (`pick main|<id>`):")?;
        for entry in engine.selectable() {
          writeln!(out, "    {}", entry.label)?;
        }
      }
    }
    if !engine.result().is_empty() {
      writeln!(out, "Differences:")?;
      render::spans(out, engine.result(), self.color)?;
    }
    Ok(())
  }

  fn flush_status(&mut self, out: &mut impl Write) -> io::Result<()> {
    if let Some(status) = self.session.take_status() {
      writeln!(out, "{status}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use redline_core::{
    TransportError,
    document::{
      CreatedVersion, Document, DocumentId, Version, VersionId, VersionIndex, VersionSummary,
      timestamp,
    },
    state::{MemoryStateStore, PersistedState},
  };

  use super::*;

  /// Patent 1 with a single version 2; writes are accepted and dropped.
  struct StaticApi;

  fn version() -> Version {
    Version {
      id:            2,
      patent_parent: 1,
      content:       "<p>Claim 1 amended</p>".to_string(),
      created_at:    timestamp::parse("2025-03-04 09:15").unwrap(),
    }
  }

  impl DocumentApi for StaticApi {
    async fn fetch_document(&self, doc: DocumentId) -> Result<Document, TransportError> {
      match doc {
        1 => Ok(Document {
          id:      1,
          content: "<p>Claim 1</p>".to_string(),
        }),
        _ => Err(TransportError::status(format!("GET /document/{doc}"), 404)),
      }
    }

    async fn save_document(&self, _: DocumentId, _: &str) -> Result<(), TransportError> { Ok(()) }

    async fn fetch_version(&self, _: DocumentId, id: VersionId) -> Result<Version, TransportError> {
      match id {
        2 => Ok(version()),
        _ => Err(TransportError::status("GET version", 404)),
      }
    }

    async fn save_version(&self, _: DocumentId, _: VersionId, _: &str) -> Result<(), TransportError> {
      Ok(())
    }

    async fn create_version(&self, _: DocumentId, _: &str) -> Result<CreatedVersion, TransportError> {
      Err(TransportError::cause("POST versions", "read-only"))
    }

    async fn delete_version(&self, _: DocumentId, _: VersionId) -> Result<(), TransportError> {
      Ok(())
    }

    async fn list_all_versions(&self) -> Result<VersionIndex, TransportError> {
      Ok([version().summary()].into_iter().collect())
    }

    async fn list_versions(&self, _: DocumentId) -> Result<Vec<VersionSummary>, TransportError> {
      Ok(vec![version().summary()])
    }
  }

  async fn app() -> (App<StaticApi, MemoryStateStore>, Vec<u8>) {
    let state = PersistedState::new(Arc::new(MemoryStateStore::new()));
    let mut app = App::new(SessionController::new(StaticApi, state, 1), false);
    let mut out = Vec::new();
    app.start(&mut out).await.unwrap();
    (app, out)
  }

  async fn run(app: &mut App<StaticApi, MemoryStateStore>, line: &str) -> (Flow, String) {
    let mut out = Vec::new();
    let flow = app.handle_line(line, &mut out).await.unwrap();
    (flow, String::from_utf8(out).unwrap())
  }

  #[tokio::test]
  async fn start_shows_the_initial_patent() {
    let (_, out) = app().await;
    assert_eq!(String::from_utf8(out).unwrap(), "Patent 1\n<p>Claim 1</p>\n");
  }

  #[tokio::test]
  async fn edit_marks_unsaved_until_saved() {
    let (mut app, _) = app().await;
    run(&mut app, "append  more").await;
    let (_, shown) = run(&mut app, "show").await;
    assert!(shown.starts_with("Patent 1 [unsaved]\n"), "{shown}");

    let (_, saved) = run(&mut app, "save").await;
    assert_eq!(saved, "Saved patent 1\n");
    let (_, shown) = run(&mut app, "show").await;
    assert!(shown.starts_with("Patent 1\n"), "{shown}");
  }

  #[tokio::test]
  async fn compare_flow_prints_marked_diff() {
    let (mut app, _) = app().await;

    let (_, out) = run(&mut app, "run").await;
    assert!(out.contains("Only available in compare mode"));

    let (_, out) = run(&mut app, "compare").await;
    assert!(out.contains("Patent 1 - Main"));
    assert!(out.contains("Patent 1 - Version 2"));

    let (_, out) = run(&mut app, "left").await;
    assert!(out.contains("Choose a right pane"));

    run(&mut app, "pick 2").await;
    let (_, out) = run(&mut app, "run").await;
    assert!(out.starts_with("Claim 1"), "{out}");
    assert!(out.contains("amended+}"), "{out}");

    let (_, out) = run(&mut app, "open 3").await;
    assert!(out.contains("Not available in compare mode"));

    let (_, out) = run(&mut app, "exit-compare").await;
    assert_eq!(out, "Patent 1\n<p>Claim 1</p>\n");
  }

  #[tokio::test]
  async fn blank_right_pane_blocks_the_diff() {
    let (mut app, _) = app().await;
    run(&mut app, "compare").await;
    run(&mut app, "pick 2").await;
    run(&mut app, "right").await;
    run(&mut app, "edit   ").await;

    let (_, out) = run(&mut app, "run").await;
    assert_eq!(out, "The right pane is empty.\n");
  }

  #[tokio::test]
  async fn second_pick_is_refused() {
    let (mut app, _) = app().await;
    run(&mut app, "compare").await;
    run(&mut app, "pick 2").await;
    let (_, out) = run(&mut app, "pick 2").await;
    assert_eq!(out, "The right pane is already chosen.\n");
  }

  #[tokio::test]
  async fn failures_surface_as_status_lines() {
    let (mut app, _) = app().await;
    let (_, out) = run(&mut app, "new-version").await;
    assert!(out.starts_with("Could not create a version of patent 1"), "{out}");
    let (_, out) = run(&mut app, "bogus").await;
    assert!(out.starts_with("unknown command"), "{out}");
  }

  #[tokio::test]
  async fn issues_update_on_valid_frames_only() {
    let (mut app, _) = app().await;
    let mut out = Vec::new();
    app
      .on_channel_event(ChannelEvent::Message("nonsense".to_string()), &mut out)
      .unwrap();
    assert!(out.is_empty());

    let frame = r#"{"issues": [{"type": "Clarity", "severity": "low", "paragraph": 1,
      "description": "Vague term.", "suggestion": "Define it."}]}"#;
    app
      .on_channel_event(ChannelEvent::Message(frame.to_string()), &mut out)
      .unwrap();
    let shown = String::from_utf8(out).unwrap();
    assert!(shown.contains("1. [paragraph 1] Clarity (low) - Vague term."), "{shown}");

    let (flow, _) = run(&mut app, "quit").await;
    assert_eq!(flow, Flow::Quit);
  }
}
