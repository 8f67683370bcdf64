//! blogview: read, search and preview a static markdown blog
//!
//! A site directory holds a `posts.json` manifest of post summaries and a
//! `pages/` directory of markdown posts with optional `---` front-matter.
//! This crate parses the front-matter, filters the manifest by text and
//! tags, renders posts to HTML, and serves it all from a preview server.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod search;
pub mod server;
pub mod theme;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use content::{FrontMatter, MetaValue, ParsedPost, PostSummary};
pub use error::ContentError;
pub use search::{filter, SelectedTags};

/// Name of the optional configuration file in the site directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog site on disk
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Site directory, served as the web root
    pub site_dir: PathBuf,
    /// Post manifest
    pub manifest_path: PathBuf,
    /// Markdown posts directory
    pub pages_dir: PathBuf,
}

impl Blog {
    /// Open a site directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(site_dir: P) -> Result<Self> {
        let site_dir = site_dir.as_ref().to_path_buf();
        let config_path = site_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let manifest_path = site_dir.join(&config.manifest);
        let pages_dir = site_dir.join(&config.pages_dir);

        Ok(Self {
            config,
            site_dir,
            manifest_path,
            pages_dir,
        })
    }

    /// Colour scheme from the configured preference and the terminal
    pub fn theme(&self) -> theme::Theme {
        self.config.theme.resolve(theme::terminal_prefers_dark())
    }
}
