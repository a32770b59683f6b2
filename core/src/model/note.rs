use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Entity, Placement};

/// Title given to a note whose title and content are both blank.
pub const UNTITLED_NOTE: &str = "Untitled";

/// Ordered tag list without duplicates or blank entries.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trimmed tag. Returns `false` when it is blank or already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.iter().map(String::as_str).collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(id: String, title: String, content: String, tags: TagSet, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            content,
            tags,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagSet>,
    pub is_favorite: Option<bool>,
}

impl NotePatch {
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }
}

impl Entity for Note {
    type Patch = NotePatch;

    const KIND: &'static str = "note";
    const COLLECTION: &'static str = "notes";
    const FILE_NAME: &'static str = "notes-data.json";
    const PLACEMENT: Placement = Placement::Prepend;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Title stored for a note: the trimmed title, else the first non-empty
/// line of the content, else [`UNTITLED_NOTE`].
pub fn derive_title(title: &str, content: &str) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(UNTITLED_NOTE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_insert_rejects_duplicates_and_blanks() {
        let mut tags = TagSet::new();
        assert!(tags.insert("work"));
        assert!(!tags.insert("work"));
        assert!(!tags.insert("  "));
        assert!(tags.insert(" home "));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["work", "home"]);
    }

    #[test]
    fn test_tag_match_is_exact() {
        let mut tags = TagSet::new();
        tags.insert("Work");
        assert!(tags.insert("work"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_deserialize_dedupes_tags() {
        let tags: TagSet = serde_json::from_str(r#"["a", "b", "a"]"#).unwrap();
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("", "Hello\nWorld"), "Hello");
        assert_eq!(derive_title("  ", "\n\n  Second  \nThird"), "Second");
        assert_eq!(derive_title(" Kept ", "Hello"), "Kept");
        assert_eq!(derive_title("", "   \n"), UNTITLED_NOTE);
    }

    #[test]
    fn test_note_uses_camel_case_fields() {
        let note = Note::new(
            "note-1".into(),
            "T".into(),
            "C".into(),
            TagSet::from(vec!["x".to_string()]),
            Utc::now(),
        );
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["isFavorite"], false);
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["tags"][0], "x");
    }
}
