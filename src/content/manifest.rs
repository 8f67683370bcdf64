//! Site content - the post manifest and the markdown pages it points to

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, ParsedPost, Post, PostSummary};
use crate::error::ContentError;
use crate::theme::Theme;
use crate::Blog;

/// Loads the manifest and posts of a site directory
pub struct SiteContent {
    manifest_path: PathBuf,
    pages_dir: PathBuf,
    renderer: MarkdownRenderer,
}

/// Consistency report between the manifest and the pages directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of manifest entries
    pub posts: usize,
    /// Manifest entries whose file does not exist
    pub missing: Vec<String>,
    /// Markdown pages not listed in the manifest
    pub unlisted: Vec<String>,
    /// Markdown pages without a front-matter block
    pub without_front_matter: Vec<String>,
    /// Pages that exist but could not be read as UTF-8 text
    pub unreadable: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.problems() == 0
    }

    /// Total number of reported files
    pub fn problems(&self) -> usize {
        self.missing.len()
            + self.unlisted.len()
            + self.without_front_matter.len()
            + self.unreadable.len()
    }
}

impl SiteContent {
    /// Create a loader for a site
    pub fn new(blog: &Blog) -> Self {
        let renderer =
            MarkdownRenderer::with_options(&blog.config.highlight, &blog.config.markdown);
        Self {
            manifest_path: blog.manifest_path.clone(),
            pages_dir: blog.pages_dir.clone(),
            renderer,
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Load every post summary from the manifest
    pub fn load_manifest(&self) -> Result<Vec<PostSummary>, ContentError> {
        let content = fs::read_to_string(&self.manifest_path)
            .map_err(|e| ContentError::io(&self.manifest_path, e))?;
        let posts: Vec<PostSummary> =
            serde_json::from_str(&content).map_err(|source| ContentError::Manifest {
                path: self.manifest_path.clone(),
                source,
            })?;

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), self.manifest_path);
        Ok(posts)
    }

    /// Read a post and split off its front-matter
    pub fn read_post(&self, file: &str) -> Result<ParsedPost, ContentError> {
        let path = self.page_path(file)?;
        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ContentError::NotFound(file.to_string()),
            _ => ContentError::io(&path, e),
        })?;
        Ok(FrontMatter::parse(&raw))
    }

    /// Read a post and render its body
    pub fn load_post(&self, file: &str, theme: Theme) -> Result<Post, ContentError> {
        let ParsedPost { metadata, body } = self.read_post(file)?;
        let html = self.renderer.render(&body, theme);

        Ok(Post {
            file: file.to_string(),
            metadata,
            body,
            html,
        })
    }

    /// Compare the manifest against the markdown files on disk
    pub fn check(&self) -> Result<CheckReport, ContentError> {
        let posts = self.load_manifest()?;
        let listed: HashSet<&str> = posts.iter().map(|p| p.file.as_str()).collect();

        let mut report = CheckReport {
            posts: posts.len(),
            ..Default::default()
        };

        for post in &posts {
            match self.read_post(&post.file) {
                Ok(_) => {}
                Err(ContentError::NotFound(_)) | Err(ContentError::InvalidFileName(_)) => {
                    report.missing.push(post.file.clone());
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    report.unreadable.push(post.file.clone());
                }
            }
        }

        for file in self.markdown_files() {
            match self.read_post(&file) {
                Ok(parsed) if parsed.metadata.is_empty() => {
                    report.without_front_matter.push(file.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("{}", e);
                    if !report.unreadable.contains(&file) {
                        report.unreadable.push(file.clone());
                    }
                }
            }
            if !listed.contains(file.as_str()) {
                report.unlisted.push(file);
            }
        }

        Ok(report)
    }

    /// Markdown files under the pages directory, relative and `/`-separated, sorted
    fn markdown_files(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(&self.pages_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_markdown_file(e.path()))
            .filter_map(|e| {
                let relative = e.path().strip_prefix(&self.pages_dir).ok()?;
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .collect();
        files.sort();
        files
    }

    /// Resolve a manifest file name inside the pages directory
    fn page_path(&self, file: &str) -> Result<PathBuf, ContentError> {
        let relative = Path::new(file);
        let is_plain = !file.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            tracing::warn!("Rejected post file name {:?}", file);
            return Err(ContentError::InvalidFileName(file.to_string()));
        }

        Ok(self.pages_dir.join(relative))
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"[
  {"title": "Intro to Go", "file": "intro-go.md", "date": "2024-01-15", "excerpt": "", "description": "", "tags": ["go", "intro"]},
  {"title": "Gone", "file": "missing.md", "date": "2024-02-01", "excerpt": "", "description": "", "tags": []}
]"#;

    fn site() -> (TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("posts.json"), MANIFEST).unwrap();
        let pages = dir.path().join("pages");
        fs::create_dir_all(pages.join("drafts")).unwrap();
        fs::write(
            pages.join("intro-go.md"),
            "---\ntitle: Intro to Go\ntags: [go, intro]\n---\n# Hello\n",
        )
        .unwrap();
        fs::write(pages.join("drafts").join("idea.md"), "no metadata here\n").unwrap();
        fs::write(pages.join("notes.txt"), "ignored").unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        (dir, blog)
    }

    #[test]
    fn test_load_manifest() {
        let (_dir, blog) = site();
        let content = SiteContent::new(&blog);
        let posts = content.load_manifest().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].tags, vec!["go", "intro"]);
    }

    #[test]
    fn test_invalid_manifest() {
        let (dir, blog) = site();
        fs::write(dir.path().join("posts.json"), "{not json").unwrap();
        let err = SiteContent::new(&blog).load_manifest().unwrap_err();
        assert!(matches!(err, ContentError::Manifest { .. }));
    }

    #[test]
    fn test_missing_manifest() {
        let (dir, blog) = site();
        fs::remove_file(dir.path().join("posts.json")).unwrap();
        let err = SiteContent::new(&blog).load_manifest().unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[test]
    fn test_load_post() {
        let (_dir, blog) = site();
        let post = SiteContent::new(&blog)
            .load_post("intro-go.md", Theme::Light)
            .unwrap();
        assert_eq!(post.metadata.title(), Some("Intro to Go"));
        assert_eq!(post.metadata.tags(), vec!["go", "intro"]);
        assert_eq!(post.body, "# Hello\n");
        assert!(post.html.contains(r#"<h1 id="hello">Hello</h1>"#));
    }

    #[test]
    fn test_load_post_in_subdirectory() {
        let (_dir, blog) = site();
        let parsed = SiteContent::new(&blog).read_post("drafts/idea.md").unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, "no metadata here\n");
    }

    #[test]
    fn test_load_post_not_found() {
        let (_dir, blog) = site();
        let err = SiteContent::new(&blog).read_post("missing.md").unwrap_err();
        assert!(matches!(err, ContentError::NotFound(f) if f == "missing.md"));
    }

    #[test]
    fn test_rejects_escaping_file_names() {
        let (_dir, blog) = site();
        let content = SiteContent::new(&blog);
        for file in ["", "../posts.json", "drafts/../../posts.json", "/etc/passwd", "./intro-go.md"] {
            let err = content.read_post(file).unwrap_err();
            assert!(
                matches!(err, ContentError::InvalidFileName(_)),
                "accepted {:?}",
                file
            );
        }
    }

    #[test]
    fn test_check_report() {
        let (_dir, blog) = site();
        let report = SiteContent::new(&blog).check().unwrap();
        assert_eq!(report.posts, 2);
        assert_eq!(report.missing, vec!["missing.md"]);
        assert_eq!(report.unlisted, vec!["drafts/idea.md"]);
        assert_eq!(report.without_front_matter, vec!["drafts/idea.md"]);
        assert!(report.unreadable.is_empty());
        assert_eq!(report.problems(), 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_check_reports_unreadable_pages() {
        let (dir, blog) = site();
        let pages = dir.path().join("pages");
        fs::write(pages.join("latin1.md"), [b'c', b'a', b'f', 0xe9, b'\n']).unwrap();
        fs::write(
            dir.path().join("posts.json"),
            r#"[{"title": "Intro", "file": "intro-go.md"}, {"title": "Cafe", "file": "latin1.md"}]"#,
        )
        .unwrap();

        let report = SiteContent::new(&blog).check().unwrap();
        assert_eq!(report.posts, 2);
        assert!(report.missing.is_empty());
        assert_eq!(report.unreadable, vec!["latin1.md"]);
        assert_eq!(report.unlisted, vec!["drafts/idea.md"]);
        assert_eq!(report.without_front_matter, vec!["drafts/idea.md"]);
    }
}
