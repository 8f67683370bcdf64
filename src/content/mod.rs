//! Content module - front-matter, posts, and markdown rendering

mod frontmatter;
pub mod manifest;
mod markdown;
mod post;

pub use frontmatter::{FrontMatter, MetaValue, ParsedPost};
pub use manifest::{CheckReport, SiteContent};
pub use markdown::MarkdownRenderer;
pub use post::{Post, PostHeader, PostSummary, UNTITLED};
