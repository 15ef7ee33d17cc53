//! Project grid projection
//! Decides which records are visible and whether admin controls are offered
use std::fmt;
use std::str::FromStr;

use crate::state::data::ProjectRecord;
use crate::state::session::Permission;

/// Sentinel filter value that matches every record
pub const ALL: &str = "all";

/// Category filter of the project grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Tag(String),
}

impl Filter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Filter::Tag(tag.into())
    }

    pub fn matches(&self, record: &ProjectRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Tag(tag) => record.has_category(tag),
        }
    }
}

impl FromStr for Filter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s == ALL {
            Filter::All
        } else {
            Filter::Tag(s.to_string())
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Tag(tag) => f.write_str(tag),
        }
    }
}

/// What the rendering surface should show
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    /// Visible records, in collection order
    pub visible: Vec<&'a ProjectRecord>,
    /// Offer edit/delete affordances per record
    pub show_admin_controls: bool,
}

impl Projection<'_> {
    /// Nothing to show ("no projects" message)
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

/// Compute the visible subset. Pure; recompute on every input change.
pub fn project<'a>(
    records: &'a [ProjectRecord],
    filter: &Filter,
    permission: Permission,
) -> Projection<'a> {
    Projection {
        visible: records.iter().filter(|r| filter.matches(r)).collect(),
        show_admin_controls: permission.is_logged_in(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{ProjectDraft, RecordId};

    fn record(id: i64, tags: &[&str]) -> ProjectRecord {
        ProjectRecord::from_draft(
            RecordId::Local(id),
            ProjectDraft {
                title: format!("p{id}"),
                category: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    fn ids(projection: &Projection<'_>) -> Vec<RecordId> {
        projection.visible.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_all_returns_everything_without_controls() {
        let records = vec![record(1, &["web"]), record(2, &[]), record(3, &["mobile"])];

        let projection = project(&records, &Filter::All, Permission::LoggedOut);

        assert_eq!(projection.visible, records.iter().collect::<Vec<_>>());
        assert!(!projection.show_admin_controls);
    }

    #[test]
    fn test_tag_keeps_matching_in_order() {
        let records = vec![
            record(1, &["web", "api"]),
            record(2, &["mobile"]),
            record(3, &["design", "web"]),
            record(4, &["website"]),
        ];

        let projection = project(&records, &Filter::tag("web"), Permission::LoggedIn);

        assert_eq!(ids(&projection), vec![RecordId::Local(1), RecordId::Local(3)]);
        assert!(projection.show_admin_controls);
    }

    #[test]
    fn test_mobile_scenario() {
        let records = vec![record(1, &["web"]), record(2, &["mobile"])];

        let projection = project(&records, &Filter::tag("mobile"), Permission::LoggedOut);

        assert_eq!(ids(&projection), vec![RecordId::Local(2)]);
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        let records = vec![record(1, &["web"])];

        assert!(project(&records, &Filter::tag("games"), Permission::LoggedIn).is_empty());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!(" web ".parse::<Filter>().unwrap(), Filter::tag("web"));
        assert_eq!(Filter::All.to_string(), "all");
    }
}
