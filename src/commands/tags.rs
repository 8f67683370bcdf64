//! List every tag in the manifest

use anyhow::Result;
use std::collections::HashMap;

use crate::content::{PostSummary, SiteContent};
use crate::search::all_tags;
use crate::Blog;

pub fn run(blog: &Blog) -> Result<()> {
    let posts = SiteContent::new(blog).load_manifest()?;
    let counts = tag_counts(&posts);

    println!("Tags ({}):", counts.len());
    for (tag, count) in counts {
        println!("  {} ({})", tag, count);
    }

    Ok(())
}

/// Tags in sorted order with the number of posts carrying each
pub fn tag_counts(posts: &[PostSummary]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        for tag in &post.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    all_tags(posts)
        .into_iter()
        .map(|tag| {
            let count = counts.get(tag.as_str()).copied().unwrap_or(0);
            (tag, count)
        })
        .collect()
}
