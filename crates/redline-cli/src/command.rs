//! One line of user input, parsed.

use std::str::FromStr;

use anyhow::{Context as _, anyhow, bail};
use redline_core::document::{DocumentId, VersionId};

pub const HELP: &str = "\
Editing
  list                      versions of every patent
  show                      the open patent, or both compare panes
  open <doc>                open a patent's main content
  version <doc> <id>        open a version
  set <text>                replace the editor content
  append <text>             add text to the end of the editor content
  save                      save the editor content
  new-version               snapshot the editor content as a new version
  delete <doc> <id>         delete a version
  compare                   save and enter compare mode
Compare mode
  pick main|<id>            load the right pane
  left | right              activate a pane for editing
  dismiss                   deactivate both panes
  edit <text>               replace the active pane's text
  run                       save edited panes and show the diff
  exit-compare              leave compare mode
Other
  issues                    latest AI review findings
  help                      this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  List,
  Show,
  Open(DocumentId),
  Version(DocumentId, VersionId),
  Set(String),
  Append(String),
  Save,
  NewVersion,
  Delete(DocumentId, VersionId),
  Compare,
  Pick(Option<VersionId>),
  Left,
  Right,
  Dismiss,
  Edit(String),
  Run,
  ExitCompare,
  Issues,
  Help,
  Quit,
}

impl FromStr for Command {
  type Err = anyhow::Error;

  fn from_str(line: &str) -> anyhow::Result<Self> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let cmd = match word {
      "list" | "ls" => Self::List,
      "show" => Self::Show,
      "open" => Self::Open(number(rest, "document")?),
      "version" => {
        let (doc, id) = pair(rest)?;
        Self::Version(doc, id)
      }
      "set" => Self::Set(rest.to_string()),
      "append" => Self::Append(rest.to_string()),
      "save" => Self::Save,
      "new-version" => Self::NewVersion,
      "delete" => {
        let (doc, id) = pair(rest)?;
        Self::Delete(doc, id)
      }
      "compare" => Self::Compare,
      "pick" => match rest {
        "main" => Self::Pick(None),
        id => Self::Pick(Some(number(id, "version")?)),
      },
      "left" => Self::Left,
      "right" => Self::Right,
      "dismiss" => Self::Dismiss,
      "edit" => Self::Edit(rest.to_string()),
      "run" => Self::Run,
      "exit-compare" => Self::ExitCompare,
      "issues" => Self::Issues,
      "help" | "?" => Self::Help,
      "quit" | "exit" | "q" => Self::Quit,
      other => bail!("unknown command {other:?} (try `help`)"),
    };
    Ok(cmd)
  }
}

fn number(s: &str, what: &str) -> anyhow::Result<i64> {
  if s.is_empty() {
    bail!("missing {what} number");
  }
  s.parse().with_context(|| format!("{s:?} is not a {what} number"))
}

fn pair(s: &str) -> anyhow::Result<(DocumentId, VersionId)> {
  let mut parts = s.split_whitespace();
  let doc = number(parts.next().unwrap_or_default(), "document")?;
  let id = number(parts.next().unwrap_or_default(), "version")?;
  if parts.next().is_some() {
    return Err(anyhow!("expected `<doc> <id>`"));
  }
  Ok((doc, id))
}
