//! Line commands of the terminal shell
//!
//! Each input line becomes a [`Command`]; most of them wrap an app [`Message`].

use std::convert::Infallible;
use std::str::FromStr;

use thiserror::Error;

use crate::app::Message;
use crate::state::data::{ProjectDraft, ProjectForm};
use crate::state::edit::ProjectPatch;
use crate::state::session::Credentials;
use crate::ui::projection::Filter;

pub const HELP: &str = "\
commands:
  list                    show the project grid
  tags                    list category tags
  filter <tag|all>        filter the grid
  login <id> <password>   admin login
  logout                  admin logout
  add <draft json>        create a project
  add <title> | <headline> | <image> | <overview> | <tech, ...> | <tag, ...> | <github> | <site>
                          create a project from form fields (trailing ones optional)
  edit <id> <patch json>  replace some fields of a project
  delete <id>             delete a project (\"123\" for an all-digit key)
  clear                   delete every project
  sync                    re-read the backend
  quit                    exit";

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub enum Command {
    Show,
    Tags,
    Help,
    Quit,
    Send(Message),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(head, rest)| (head, rest.trim()))
            .unwrap_or((line, ""));

        let message = match head {
            "" | "list" => return Ok(Command::Show),
            "tags" => return Ok(Command::Tags),
            "help" => return Ok(Command::Help),
            "quit" | "exit" => return Ok(Command::Quit),
            "filter" => Message::SetFilter(parse(required(rest, "filter <tag|all>")?)),
            "login" => {
                let (id, password) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("login <id> <password>"))?;
                Message::Login(Credentials::new(id, password.trim()))
            }
            "logout" => Message::Logout,
            "add" => {
                let body = required(rest, ADD_USAGE)?;
                let draft = if body.starts_with('{') {
                    serde_json::from_str::<ProjectDraft>(body)?
                } else {
                    parse_form(body)?
                };
                Message::Submit { id: None, draft }
            }
            "edit" => {
                let (id, json) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("edit <id> <patch json>"))?;
                let patch = ProjectPatch::from_json(json)?;
                if patch.is_empty() {
                    return Err(CommandError::Usage("edit <id> <patch json with at least one field>"));
                }
                Message::Edit { id: parse(id), patch }
            }
            "delete" => Message::Delete(parse(required(rest, "delete <id>")?)),
            "clear" => Message::ClearAll,
            "sync" => Message::Refresh,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Command::Send(message))
    }
}

const ADD_USAGE: &str = "add <draft json> | add <title> | <headline> | ... (see 'help')";

/// Pipe-separated form fields in the order of the project form
fn parse_form(body: &str) -> Result<ProjectDraft, CommandError> {
    let fields: Vec<&str> = body.split('|').map(str::trim).collect();
    if fields.len() > 8 || fields[0].is_empty() {
        return Err(CommandError::Usage(ADD_USAGE));
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    Ok(ProjectDraft::from_form(&ProjectForm {
        title: field(0),
        headline: field(1),
        image_src: field(2),
        overview: field(3),
        tech_stack: field(4),
        category: field(5),
        github: field(6),
        site: field(7),
    }))
}

fn required<'a>(arg: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(arg)
    }
}

/// Parse a value whose parser cannot fail
fn parse<T: FromStr<Err = Infallible>>(raw: &str) -> T {
    match raw.parse() {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::RecordId;

    fn message(line: &str) -> Message {
        match line.parse::<Command>().unwrap() {
            Command::Send(message) => message,
            other => panic!("expected a message, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_commands() {
        assert!(matches!("".parse::<Command>().unwrap(), Command::Show));
        assert!(matches!(" list ".parse::<Command>().unwrap(), Command::Show));
        assert!(matches!("exit".parse::<Command>().unwrap(), Command::Quit));
        assert!(matches!(message("logout"), Message::Logout));
        assert!(matches!(message("clear"), Message::ClearAll));
    }

    #[test]
    fn test_filter() {
        assert!(matches!(message("filter all"), Message::SetFilter(Filter::All)));
        match message("filter web") {
            Message::SetFilter(filter) => assert_eq!(filter, Filter::tag("web")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_login() {
        match message("login admin 1234") {
            Message::Login(credentials) => assert_eq!(credentials, Credentials::new("admin", "1234")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!("login admin".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_add_and_edit() {
        match message(r#"add {"title": "Folio", "category": ["web"]}"#) {
            Message::Submit { id: None, draft } => {
                assert_eq!(draft.title, "Folio");
                assert_eq!(draft.category, vec!["web"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        match message(r#"edit 3 {"headline": "new"}"#) {
            Message::Edit { id, patch } => {
                assert_eq!(id, RecordId::Local(3));
                assert_eq!(patch.headline.as_deref(), Some("new"));
                assert!(patch.title.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!("add {oops".parse::<Command>(), Err(CommandError::Json(_))));
        assert!(matches!("edit 3 {}".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_add_form_fields() {
        let line = "add Chart | Skills chart | ./img/chart.png | | JavaScript,  Chart.js , | web,mobile | | https://x.dev";
        match message(line) {
            Message::Submit { id: None, draft } => {
                assert_eq!(draft.title, "Chart");
                assert_eq!(draft.headline, "Skills chart");
                assert_eq!(draft.image_src, "./img/chart.png");
                assert!(draft.overview.is_empty());
                assert_eq!(draft.tech_stack, vec!["JavaScript", "Chart.js"]);
                assert_eq!(draft.category, vec!["web", "mobile"]);
                assert!(draft.links.github.is_empty());
                assert_eq!(draft.links.site, "https://x.dev");
            }
            other => panic!("unexpected {other:?}"),
        }

        match message("add Just a title") {
            Message::Submit { draft, .. } => {
                assert_eq!(draft.title, "Just a title");
                assert!(draft.category.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!("add | no title".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!(
            "add a|b|c|d|e|f|g|h|i".parse::<Command>(),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn test_delete_keyed_id() {
        match message("delete 018b2f0000a1-0") {
            Message::Delete(id) => assert_eq!(id, RecordId::Key("018b2f0000a1-0".to_string())),
            other => panic!("unexpected {other:?}"),
        }
        match message(r#"delete "123""#) {
            Message::Delete(id) => assert_eq!(id, RecordId::Key("123".to_string())),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!("delete".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_unknown() {
        assert!(matches!("launch".parse::<Command>(), Err(CommandError::Unknown(_))));
    }
}
