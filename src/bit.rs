//! Core data structures for the addbit application.
//!
//! A [`BitDraft`] is what the language model produces and the user edits;
//! a [`Bit`] is a finalized draft carrying its derived `id` and `date`.
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{BitError, Result};

/// Longest slug kept in a bit id
pub const MAX_SLUG_LEN: usize = 50;

/// A bit before it has been given an identity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BitDraft {
    /// Short descriptive title
    pub title: String,
    /// Link the bit is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Commentary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Lowercase, hyphenated tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Where the link was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    /// Any other keys, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A persisted bit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bit {
    #[serde(flatten)]
    pub draft: BitDraft,
    /// `slug(title)-<unix millis>`
    pub id: String,
    /// Insertion date, `YYYY-MM-DD`
    pub date: String,
}

impl BitDraft {
    /// Parses a draft from JSON text, rejecting a missing or blank title
    pub fn from_json(text: &str) -> Result<Self> {
        let draft: BitDraft = serde_json::from_str(text)?;
        draft.validate()?;
        Ok(draft)
    }

    /// Builds a draft from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let draft: BitDraft = serde_json::from_value(value)?;
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BitError::InvalidFormat {
                message: "title must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Pretty JSON as written to the editor, with a trailing newline
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Drops optional fields that are present but empty
    pub fn strip_empty(&mut self) {
        if self.url.as_deref().is_some_and(str::is_empty) {
            self.url = None;
        }
        if self.content.as_deref().is_some_and(str::is_empty) {
            self.content = None;
        }
        if self.via.as_deref().is_some_and(str::is_empty) {
            self.via = None;
        }
        if self.tags.as_ref().is_some_and(Vec::is_empty) {
            self.tags = None;
        }
    }

    /// Attaches id and date, stamped with the current time
    pub fn finalize(mut self) -> Bit {
        self.strip_empty();
        // Derived keys always win over anything typed in the editor
        self.extra.remove("id");
        self.extra.remove("date");

        let now = Utc::now();
        let id = format!("{}-{}", slugify(&self.title), now.timestamp_millis());
        let date = Local::now().format("%Y-%m-%d").to_string();

        Bit {
            draft: self,
            id,
            date,
        }
    }
}

impl Bit {
    pub fn title(&self) -> &str {
        &self.draft.title
    }
}

/// Converts text to a URL-friendly slug.
///
/// Runs of anything outside `[a-z0-9]` (after lowercasing) collapse into a
/// single hyphen; the result never starts or ends with a hyphen and is at
/// most [`MAX_SLUG_LEN`] characters long.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    // Only ASCII is ever pushed, so byte truncation is safe
    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World!!"), "hello-world");
        assert_eq!(slugify("  --Rust 2024: what's new?--  "), "rust-2024-what-s-new");
    }

    #[test]
    fn slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn slugify_respects_length_and_charset() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn slugify_drops_hyphen_left_by_truncation() {
        // 49 letters then a separator lands the cut right after a hyphen
        let title = format!("{} tail", "a".repeat(49));
        assert_eq!(slugify(&title), "a".repeat(49));
    }

    #[test]
    fn slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Crème"), "caf-cr-me");
    }

    #[test]
    fn draft_requires_title() {
        assert!(BitDraft::from_json(r#"{"url": "http://x"}"#).is_err());
        assert!(matches!(
            BitDraft::from_json(r#"{"title": "   "}"#),
            Err(BitError::InvalidFormat { .. })
        ));
        assert!(BitDraft::from_json("{not json").is_err());
    }

    #[test]
    fn draft_keeps_unknown_keys() {
        let draft = BitDraft::from_json(r#"{"title": "T", "rating": 5}"#).unwrap();
        assert_eq!(draft.extra.get("rating"), Some(&json!(5)));

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, json!({"title": "T", "rating": 5}));
    }

    #[test]
    fn finalize_strips_empty_optionals() {
        let draft = BitDraft::from_value(json!({
            "title": "Example",
            "url": "",
            "content": "",
            "via": "",
            "tags": []
        }))
        .unwrap();

        let value = serde_json::to_value(draft.finalize()).unwrap();
        let object = value.as_object().unwrap();
        for key in ["url", "content", "via", "tags"] {
            assert!(!object.contains_key(key), "{key} should be stripped");
        }
        assert_eq!(object["title"], "Example");
    }

    #[test]
    fn finalize_derives_id_and_date() {
        let bit = BitDraft {
            title: "Example".to_string(),
            url: Some("http://x".to_string()),
            tags: Some(vec!["a".to_string()]),
            ..Default::default()
        }
        .finalize();

        let millis = bit.id.strip_prefix("example-").unwrap();
        assert!(!millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()));

        let parts: Vec<&str> = bit.date.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![4, 2, 2]
        );
        assert_eq!(bit.draft.url.as_deref(), Some("http://x"));
        assert_eq!(bit.draft.tags, Some(vec!["a".to_string()]));
    }

    #[test]
    fn finalize_replaces_typed_id_and_date() {
        let draft =
            BitDraft::from_json(r#"{"title": "Backdated", "id": "mine", "date": "2020-01-01"}"#)
                .unwrap();
        let bit = draft.finalize();

        assert!(bit.draft.extra.is_empty());
        assert!(bit.id.starts_with("backdated-"));
        assert_ne!(bit.date, "2020-01-01");

        let text = serde_json::to_string(&bit).unwrap();
        assert_eq!(text.matches("\"date\"").count(), 1);
        assert_eq!(text.matches("\"id\"").count(), 1);
    }

    #[test]
    fn draft_pretty_json_ends_with_newline() {
        let draft = BitDraft {
            title: "Über".to_string(),
            ..Default::default()
        };
        let text = draft.to_pretty_json().unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("Über"));
        assert!(text.contains("  \"title\""));
    }
}
