//! Classifier - tag-field lookup against the configured known-type set

use std::collections::HashSet;

use contracts::{ChangeRecord, FeedConfig, TypeTag};

/// Assigns one logical type to each record.
///
/// Pure and total: never mutates the record, never fails. A missing tag
/// field, a non-string tag, or a tag outside the known set all map to
/// `TypeTag::Unknown`.
#[derive(Debug, Clone)]
pub struct Classifier {
    tag_field: String,
    known_types: HashSet<String>,
}

impl Classifier {
    /// Build a classifier from the feed configuration.
    pub fn from_feed(feed: &FeedConfig) -> Self {
        Self::new(&feed.tag_field, feed.known_types.iter().cloned())
    }

    pub fn new(tag_field: &str, known_types: impl IntoIterator<Item = String>) -> Self {
        Self {
            tag_field: tag_field.to_string(),
            known_types: known_types.into_iter().collect(),
        }
    }

    /// Classify one record.
    pub fn classify(&self, record: &ChangeRecord) -> TypeTag {
        match record.tag_value(&self.tag_field) {
            Some(tag) if self.known_types.contains(tag) => TypeTag::Known(tag.to_string()),
            _ => TypeTag::Unknown,
        }
    }

    /// Configured tag field name
    pub fn tag_field(&self) -> &str {
        &self.tag_field
    }

    /// Configured known types
    pub fn known_types(&self) -> &HashSet<String> {
        &self.known_types
    }
}
