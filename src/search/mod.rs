//! Post search and tag filtering
//!
//! [`filter`] is a pure function over the manifest; callers own the query
//! and the [`SelectedTags`] and pass them in on every call.
//! [`controller`] wraps it with debounced, asynchronous query updates.

pub mod controller;

use std::collections::BTreeSet;

use crate::content::PostSummary;

pub use controller::{SearchController, SearchHandle, SearchResults};

/// Tags the reader has picked in the tag filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedTags {
    tags: BTreeSet<String>,
}

impl SelectedTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a tag, or deselect it if already selected. Returns whether it is now selected.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.tags.remove(tag) {
            false
        } else {
            self.tags.insert(tag.to_string());
            true
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectedTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Trimmed, lowercased form of a search query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Posts matching both the text query and the tag selection, in input order.
///
/// An empty query matches every post. The query is matched case-insensitively
/// as a substring of the title, excerpt, description or any tag. With tags
/// selected, a post must carry at least one of them (exact match).
pub fn filter<'a>(
    posts: &'a [PostSummary],
    query: &str,
    selected: &SelectedTags,
) -> Vec<&'a PostSummary> {
    let query = normalize_query(query);

    posts
        .iter()
        .filter(|post| matches_query(post, &query) && matches_tags(post, selected))
        .collect()
}

/// `query` must already be normalized
fn matches_query(post: &PostSummary, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    [&post.title, &post.excerpt, &post.description]
        .into_iter()
        .chain(post.tags.iter())
        .any(|field| field.to_lowercase().contains(query))
}

fn matches_tags(post: &PostSummary, selected: &SelectedTags) -> bool {
    selected.is_empty() || post.tags.iter().any(|tag| selected.contains(tag))
}

/// Every distinct tag across the posts, sorted
pub fn all_tags(posts: &[PostSummary]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|post| post.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
