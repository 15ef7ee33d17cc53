//! Partial edits of project records
//!
//! A patch lists the fields an edit replaces. Fields left as `None`
//! keep their current value. Replacement is shallow: a list or the
//! link pair is swapped wholesale, never merged.

use serde::{Deserialize, Serialize};

use super::data::{Links, ProjectDraft, ProjectRecord};

/// Field replacements for an existing record
///
/// The id is not part of a patch, it never changes after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub headline: Option<String>,
    pub overview: Option<String>,
    pub image_src: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub category: Option<Vec<String>>,
    pub links: Option<Links>,
}

impl ProjectPatch {
    /// Create an empty patch (changes nothing)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = Some(headline.into());
        self
    }

    pub fn category<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Parse from JSON (e.g. a shell command argument)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this patch leaves every field alone
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Replace the fields present in this patch on `record`
    pub fn apply_to(self, record: &mut ProjectRecord) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(headline) = self.headline {
            record.headline = headline;
        }
        if let Some(overview) = self.overview {
            record.overview = overview;
        }
        if let Some(image_src) = self.image_src {
            record.image_src = image_src;
        }
        if let Some(tech_stack) = self.tech_stack {
            record.tech_stack = tech_stack;
        }
        if let Some(category) = self.category {
            record.category = category;
        }
        if let Some(links) = self.links {
            record.links = links;
        }
    }
}

/// A full draft replaces every field, which is what the edit form submits.
impl From<ProjectDraft> for ProjectPatch {
    fn from(draft: ProjectDraft) -> Self {
        Self {
            title: Some(draft.title),
            headline: Some(draft.headline),
            overview: Some(draft.overview),
            image_src: Some(draft.image_src),
            tech_stack: Some(draft.tech_stack),
            category: Some(draft.category),
            links: Some(draft.links),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::RecordId;

    fn record() -> ProjectRecord {
        ProjectRecord {
            id: RecordId::Local(3),
            title: "Weather".to_string(),
            headline: "Forecast widget".to_string(),
            overview: "Fetches a forecast".to_string(),
            image_src: "./img/weather.png".to_string(),
            tech_stack: vec!["JavaScript".to_string()],
            category: vec!["web".to_string(), "api".to_string()],
            links: Links {
                github: "https://github.com/x/weather".to_string(),
                site: "https://x.dev/weather".to_string(),
            },
        }
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ProjectPatch::default().is_empty());
        assert!(!ProjectPatch::new().title("x").is_empty());
    }

    #[test]
    fn test_apply_replaces_only_present_fields() {
        let before = record();
        let mut after = before.clone();

        ProjectPatch::new()
            .headline("Seven day forecast")
            .category(["mobile"])
            .apply_to(&mut after);

        assert_eq!(after.headline, "Seven day forecast");
        // lists are replaced, not extended
        assert_eq!(after.category, vec!["mobile"]);
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, before.title);
        assert_eq!(after.overview, before.overview);
        assert_eq!(after.tech_stack, before.tech_stack);
        assert_eq!(after.links, before.links);
    }

    #[test]
    fn test_partial_json() {
        let patch = ProjectPatch::from_json(r#"{"imageSrc": "./img/new.png"}"#).unwrap();

        assert_eq!(patch.image_src.as_deref(), Some("./img/new.png"));
        assert!(patch.title.is_none());
        assert!(patch.links.is_none());
    }

    #[test]
    fn test_draft_becomes_full_replacement() {
        let draft = ProjectDraft {
            title: "New".to_string(),
            ..Default::default()
        };
        let mut target = record();

        ProjectPatch::from(draft).apply_to(&mut target);

        assert_eq!(target.title, "New");
        assert!(target.category.is_empty());
        assert_eq!(target.links, Links::default());
        assert_eq!(target.id, RecordId::Local(3));
    }
}
