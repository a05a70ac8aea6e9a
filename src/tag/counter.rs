//! Frequency counting for tag clouds.

use std::collections::hash_map;
use std::collections::HashMap;
use std::ops::AddAssign;

/// Multiset of tags: each tag maps to the number of resources carrying it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounter {
    counts: HashMap<String, usize>,
}

impl TagCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for `tag`, zero when absent.
    #[must_use]
    pub fn get(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or_default()
    }

    pub fn add<S: Into<String>>(&mut self, tag: S, count: usize) {
        if count == 0 {
            return;
        }
        let entry = self.counts.entry(tag.into()).or_default();
        *entry = entry.saturating_add(count);
    }

    /// The `limit` most frequent tags, highest count first, ties broken by name.
    #[must_use]
    pub fn most_common(&self, limit: Option<usize>) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self
            .counts
            .iter()
            .map(|(tag, count)| (tag.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(n) = limit {
            entries.truncate(n);
        }
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, usize> {
        self.counts.iter()
    }
}

impl AddAssign<&TagCounter> for TagCounter {
    fn add_assign(&mut self, other: &TagCounter) {
        for (tag, count) in &other.counts {
            self.add(tag.as_str(), *count);
        }
    }
}

impl AddAssign for TagCounter {
    fn add_assign(&mut self, other: TagCounter) {
        for (tag, count) in other.counts {
            self.add(tag, count);
        }
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for TagCounter {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut counter = Self::new();
        for (tag, count) in iter {
            counter.add(tag, count);
        }
        counter
    }
}

impl<'counter> IntoIterator for &'counter TagCounter {
    type Item = (&'counter String, &'counter usize);
    type IntoIter = hash_map::Iter<'counter, String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
