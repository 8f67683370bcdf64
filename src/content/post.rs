//! Post models

use serde::{Deserialize, Serialize};

use super::FrontMatter;
use crate::helpers::format_date;

/// Title shown for a post whose front-matter has none
pub const UNTITLED: &str = "Untitled";

/// One manifest entry, describing a post for listing and search
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSummary {
    /// Post title
    pub title: String,

    /// File name relative to the pages directory
    pub file: String,

    /// Publication date as written in the manifest
    pub date: String,

    /// Optional category label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Short excerpt shown in the list
    pub excerpt: String,

    /// Longer description, searched but not listed
    pub description: String,

    /// Post tags, in manifest order
    pub tags: Vec<String>,
}

impl PostSummary {
    /// Display date using a strftime format, falling back to the raw value
    pub fn display_date(&self, format: &str) -> String {
        format_date(&self.date, format)
    }
}

/// A post loaded from the pages directory and rendered to HTML
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// File name relative to the pages directory
    pub file: String,

    /// Parsed front-matter
    pub metadata: FrontMatter,

    /// Raw markdown after the front-matter block
    pub body: String,

    /// Rendered HTML content
    pub html: String,
}

impl Post {
    /// Header fields derived from the front-matter
    pub fn header(&self, date_format: &str) -> PostHeader {
        PostHeader::from_metadata(&self.metadata, date_format)
    }
}

/// The fields shown above a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostHeader {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl PostHeader {
    pub fn from_metadata(metadata: &FrontMatter, date_format: &str) -> Self {
        let date = metadata.date().map(str::to_string);
        let display_date = date.as_deref().map(|d| format_date(d, date_format));

        Self {
            title: metadata
                .title()
                .filter(|t| !t.is_empty())
                .unwrap_or(UNTITLED)
                .to_string(),
            date,
            display_date,
            category: metadata
                .category()
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            tags: metadata.tags(),
        }
    }

    /// Browser title for the post page, `Post | Site`
    pub fn page_title(&self, site_title: &str) -> String {
        if site_title.is_empty() {
            return self.title.clone();
        }
        format!("{} | {}", self.title, site_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_defaults_missing_fields() {
        let post: PostSummary =
            serde_json::from_str(r#"{"title": "Only title", "file": "a.md"}"#).unwrap();
        assert_eq!(post.title, "Only title");
        assert_eq!(post.excerpt, "");
        assert_eq!(post.category, None);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_summary_display_date() {
        let post = PostSummary {
            date: "2024-01-15".to_string(),
            ..Default::default()
        };
        assert_eq!(post.display_date("%Y.%m.%d"), "2024.01.15");
    }

    #[test]
    fn test_header_from_metadata() {
        let parsed = FrontMatter::parse(
            "---\ntitle: Hello\ndate: 2024-01-15\ncategory: Dev\ntags: [a, b]\n---\nbody",
        );
        let header = PostHeader::from_metadata(&parsed.metadata, "%Y/%m/%d");
        assert_eq!(header.title, "Hello");
        assert_eq!(header.date.as_deref(), Some("2024-01-15"));
        assert_eq!(header.display_date.as_deref(), Some("2024/01/15"));
        assert_eq!(header.category.as_deref(), Some("Dev"));
        assert_eq!(header.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_header_defaults() {
        let header = PostHeader::from_metadata(&FrontMatter::default(), "%Y");
        assert_eq!(header.title, UNTITLED);
        assert_eq!(header.date, None);
        assert_eq!(header.category, None);
        assert!(header.tags.is_empty());
    }

    #[test]
    fn test_page_title() {
        let header = PostHeader::from_metadata(&FrontMatter::default(), "%Y");
        assert_eq!(header.page_title("hubhand's Blog"), "Untitled | hubhand's Blog");
        assert_eq!(header.page_title(""), "Untitled");
    }
}
