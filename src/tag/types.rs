//! Resource identity and tag-set helpers.

use super::TagError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A set of tags. Ordered so that joined forms are deterministic.
pub type TagSet = BTreeSet<String>;

/// An addressable item inside a realm, e.g. `wiki:WikiStart`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Resource {
    pub realm: String,
    pub id: String,
}

impl Resource {
    #[must_use]
    pub fn new<R: Into<String>, I: Into<String>>(realm: R, id: I) -> Self {
        Self {
            realm: realm.into(),
            id: id.into(),
        }
    }

    /// The realm as a whole, used for coarse permission checks.
    #[must_use]
    pub fn realm_level<R: Into<String>>(realm: R) -> Self {
        Self {
            realm: realm.into(),
            id: String::new(),
        }
    }

    #[must_use]
    pub fn is_realm_level(&self) -> bool {
        self.id.is_empty()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_realm_level() {
            write!(f, "{}", self.realm)
        } else {
            write!(f, "{}:{}", self.realm, self.id)
        }
    }
}

/// A resource together with its complete live tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedResource {
    pub resource: Resource,
    pub tags: TagSet,
}

/// Identifier prefixes a realm never exposes, e.g. `PageTemplates/` in the wiki.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    excluded_prefixes: Vec<String>,
}

impl ResourceFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn excluding<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::new();
        for prefix in prefixes {
            filter.add_prefix(prefix);
        }
        filter
    }

    pub fn add_prefix<S: Into<String>>(&mut self, prefix: S) {
        let owned: String = prefix.into();
        if !owned.is_empty() && !self.excluded_prefixes.contains(&owned) {
            self.excluded_prefixes.push(owned);
        }
    }

    #[must_use]
    pub fn accepts(&self, id: &str) -> bool {
        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| id.starts_with(prefix.as_str()))
    }

    /// Union of both filters' exclusions.
    #[must_use]
    pub fn merged(&self, other: Option<&Self>) -> Self {
        let mut merged = self.clone();
        if let Some(extra) = other {
            for prefix in &extra.excluded_prefixes {
                merged.add_prefix(prefix.as_str());
            }
        }
        merged
    }

    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.excluded_prefixes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded_prefixes.is_empty()
    }
}

/// Split free text into tags on commas and whitespace.
///
/// Empty fragments are dropped, so `"a,, b  c"` yields `{a, b, c}`.
#[must_use]
pub fn split_into_tags(text: &str) -> TagSet {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Sorted, single-space joined form used in change records.
#[must_use]
pub fn join_tags(tags: &TagSet) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Trim every tag and reject the empty ones.
///
/// # Errors
///
/// Returns [`TagError::InvalidTag`] if a tag is empty after trimming.
pub fn normalize_tags<I, S>(tags: I) -> Result<TagSet, TagError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized = TagSet::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TagError::InvalidTag(
                "tags must not be empty".to_owned(),
            ));
        }
        normalized.insert(trimmed.to_owned());
    }
    Ok(normalized)
}
