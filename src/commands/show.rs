//! Show a single post

use anyhow::Result;

use crate::content::{Post, PostHeader, SiteContent};
use crate::theme::Theme;
use crate::Blog;

/// Print a post's header followed by its markdown, or its rendered HTML
pub fn run(blog: &Blog, file: &str, html: bool, theme: Option<Theme>) -> Result<()> {
    let theme = theme.unwrap_or_else(|| blog.theme());
    let post = SiteContent::new(blog).load_post(file, theme)?;
    let header = post.header(&blog.config.date_format);

    tracing::debug!("Showing {} with the {} theme", file, theme);

    println!("{}", format_header(&header));
    println!();
    println!("{}", body(&post, html));

    Ok(())
}

fn body(post: &Post, html: bool) -> &str {
    if html {
        &post.html
    } else {
        post.body.trim_end()
    }
}

/// Title line, then a `date • category` line and a tag line when present
pub fn format_header(header: &PostHeader) -> String {
    let mut lines = vec![header.title.clone()];

    let meta: Vec<&str> = [header.display_date.as_deref(), header.category.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !meta.is_empty() {
        lines.push(meta.join(" • "));
    }

    if !header.tags.is_empty() {
        let tags: Vec<String> = header.tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(tags.join(" "));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_full_header() {
        let header = PostHeader {
            title: "Hello".to_string(),
            date: Some("2024-01-15".to_string()),
            display_date: Some("January 15, 2024".to_string()),
            category: Some("Dev".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            format_header(&header),
            "Hello\nJanuary 15, 2024 • Dev\n#a #b"
        );
    }

    #[test]
    fn test_format_title_only() {
        let header = PostHeader {
            title: "Untitled".to_string(),
            date: None,
            display_date: None,
            category: None,
            tags: Vec::new(),
        };
        assert_eq!(format_header(&header), "Untitled");
    }
}
