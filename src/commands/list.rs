//! List posts from the manifest, optionally filtered

use anyhow::Result;
use std::fmt::Write as _;

use crate::content::{PostSummary, SiteContent};
use crate::helpers::post_url;
use crate::search::{filter, SelectedTags};
use crate::Blog;

/// Options for `blogview list`
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub query: String,
    pub tags: Vec<String>,
    pub json: bool,
}

/// List posts matching the query and tags
pub fn run(blog: &Blog, options: &ListOptions) -> Result<()> {
    let posts = SiteContent::new(blog).load_manifest()?;
    let selected: SelectedTags = options.tags.iter().cloned().collect();
    let matches = filter(&posts, &options.query, &selected);

    tracing::debug!("{} of {} posts match", matches.len(), posts.len());

    let output = if options.json {
        serde_json::to_string_pretty(&matches)?
    } else {
        format_list(&matches, posts.len(), &blog.config.date_format)
    };
    println!("{}", output);

    Ok(())
}

/// Human-readable listing, one post per line followed by its link
pub fn format_list(posts: &[&PostSummary], total: usize, date_format: &str) -> String {
    let mut out = String::new();

    if posts.is_empty() {
        out.push_str("No posts found.");
        return out;
    }

    let _ = writeln!(out, "Posts ({} of {}):", posts.len(), total);
    for post in posts {
        let _ = write!(out, "  {} - {}", post.display_date(date_format), post.title);
        if let Some(category) = post.category.as_deref().filter(|c| !c.is_empty()) {
            let _ = write!(out, " ({})", category);
        }
        for tag in &post.tags {
            let _ = write!(out, " #{}", tag);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "      {}", post_url(&post.file));
    }

    out.truncate(out.trim_end().len());
    out
}
