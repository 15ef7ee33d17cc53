//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the persistence layer, the record store and the view projection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a project record.
///
/// Locally assigned ids are ascending integers. Backends that assign ids
/// themselves (the shared, remote-style collection) hand out opaque keys.
/// Serialized untagged, so seed files can keep plain numeric ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum RecordId {
    Local(i64),
    Key(String),
}

impl RecordId {
    /// The integer value of a locally assigned id
    pub fn as_local(&self) -> Option<i64> {
        match self {
            RecordId::Local(n) => Some(*n),
            RecordId::Key(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Local(n) => write!(f, "{n}"),
            // quoted when the bare text would not read back as this key
            RecordId::Key(key) if needs_quotes(key) => {
                write!(f, "\"{key}\"")
            }
            RecordId::Key(key) => f.write_str(key),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    /// Reads back what [`Display`](fmt::Display) writes.
    ///
    /// A canonical integer (`12`, `-3`) is a local id. Text in double quotes
    /// is always a key, so an all-digit key is written `"123"`. Anything
    /// else is a key as is.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(key) = s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            return Ok(RecordId::Key(key.to_string()));
        }

        Ok(match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => RecordId::Local(n),
            _ => RecordId::Key(s.to_string()),
        })
    }
}

fn needs_quotes(key: &str) -> bool {
    key.parse::<i64>().is_ok() || key.starts_with('"') || key.trim() != key
}

/// External links of a project
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Links {
    pub github: String,
    pub site: String,
}

/// Represents a single project in the portfolio
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Unique id, assigned by the store on creation
    pub id: RecordId,
    pub title: String,
    /// One-line summary shown under the title
    pub headline: String,
    pub overview: String,
    /// Path or URL of the cover image, stored as opaque text
    pub image_src: String,
    pub tech_stack: Vec<String>,
    /// Tags used as the filter dimension
    pub category: Vec<String>,
    pub links: Links,
}

impl ProjectRecord {
    /// Build a record from a draft and an already assigned id
    pub fn from_draft(id: RecordId, draft: ProjectDraft) -> Self {
        Self {
            id,
            title: draft.title,
            headline: draft.headline,
            overview: draft.overview,
            image_src: draft.image_src,
            tech_stack: draft.tech_stack,
            category: draft.category,
            links: draft.links,
        }
    }

    /// Whether `tag` is one of this record's categories
    pub fn has_category(&self, tag: &str) -> bool {
        self.category.iter().any(|c| c == tag)
    }
}

/// Everything a record carries except its id.
/// This is what the project form submits for a new record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDraft {
    pub title: String,
    pub headline: String,
    pub overview: String,
    pub image_src: String,
    pub tech_stack: Vec<String>,
    pub category: Vec<String>,
    pub links: Links,
}

/// Raw text fields of the project form, before list splitting
#[derive(Debug, Clone, Default)]
pub struct ProjectForm<'a> {
    pub title: &'a str,
    pub headline: &'a str,
    pub image_src: &'a str,
    pub overview: &'a str,
    /// Comma-separated, e.g. "Rust, SQLite"
    pub tech_stack: &'a str,
    /// Comma-separated, e.g. "web, cli"
    pub category: &'a str,
    pub github: &'a str,
    pub site: &'a str,
}

impl ProjectDraft {
    /// Build a draft from raw form input.
    /// List fields are split on commas, trimmed, and empty entries dropped.
    pub fn from_form(form: &ProjectForm<'_>) -> Self {
        Self {
            title: form.title.to_string(),
            headline: form.headline.to_string(),
            overview: form.overview.to_string(),
            image_src: form.image_src.to_string(),
            tech_stack: split_list(form.tech_stack),
            category: split_list(form.category),
            links: Links {
                github: form.github.to_string(),
                site: form.site.to_string(),
            },
        }
    }
}

/// Split a comma-separated form value into trimmed, non-empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_untagged_json() {
        let local: RecordId = serde_json::from_str("7").unwrap();
        let key: RecordId = serde_json::from_str("\"a9Fq\"").unwrap();

        assert_eq!(local, RecordId::Local(7));
        assert_eq!(key, RecordId::Key("a9Fq".to_string()));
        assert_eq!(serde_json::to_string(&local).unwrap(), "7");
    }

    #[test]
    fn test_record_id_from_str() {
        assert_eq!("12".parse::<RecordId>().unwrap(), RecordId::Local(12));
        assert_eq!("-3".parse::<RecordId>().unwrap(), RecordId::Local(-3));
        assert_eq!(
            " k-1 ".parse::<RecordId>().unwrap(),
            RecordId::Key("k-1".to_string())
        );
        // not the canonical spelling of an integer
        assert_eq!("007".parse::<RecordId>().unwrap(), RecordId::Key("007".to_string()));
        assert_eq!("+5".parse::<RecordId>().unwrap(), RecordId::Key("+5".to_string()));
    }

    #[test]
    fn test_all_digit_key_is_reachable() {
        let key = RecordId::Key("123".to_string());

        assert_eq!(key.to_string(), "\"123\"");
        assert_eq!("\"123\"".parse::<RecordId>().unwrap(), key);
        assert_eq!("123".parse::<RecordId>().unwrap(), RecordId::Local(123));
    }

    #[test]
    fn test_record_id_display_reads_back() {
        let ids = [
            RecordId::Local(0),
            RecordId::Local(i64::MIN),
            RecordId::Key("a9Fq".to_string()),
            RecordId::Key("9223372036854775807".to_string()),
            RecordId::Key("\"quoted\"".to_string()),
            RecordId::Key(String::new()),
            RecordId::Key(" padded ".to_string()),
        ];

        for id in ids {
            assert_eq!(id.to_string().parse::<RecordId>().unwrap(), id);
        }
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json = r#"{
            "id": 1,
            "title": "Folio",
            "headline": "Portfolio site",
            "overview": "",
            "imageSrc": "./img/folio.png",
            "techStack": ["HTML", "CSS"],
            "category": ["web"],
            "links": { "github": "https://github.com/x/folio", "site": "https://x.dev" }
        }"#;

        let record: ProjectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.image_src, "./img/folio.png");
        assert_eq!(record.tech_stack, vec!["HTML", "CSS"]);
        assert!(record.has_category("web"));
        assert!(!record.has_category("we"));
    }

    #[test]
    fn test_form_splits_lists() {
        let form = ProjectForm {
            title: "Chart",
            tech_stack: "JavaScript,  Chart.js , ",
            category: " web,mobile",
            site: "https://x.dev",
            ..Default::default()
        };

        let draft = ProjectDraft::from_form(&form);
        assert_eq!(draft.tech_stack, vec!["JavaScript", "Chart.js"]);
        assert_eq!(draft.category, vec!["web", "mobile"]);
        assert_eq!(draft.links.site, "https://x.dev");
        assert!(draft.links.github.is_empty());
    }
}
