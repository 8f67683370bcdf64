//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::theme::ThemePreference;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    /// Appended to post titles, as in `Post | Site`
    pub title: String,

    // Content
    /// Manifest of post summaries, relative to the site directory
    pub manifest: String,
    /// Directory holding the markdown posts, relative to the site directory
    pub pages_dir: String,
    /// strftime format for displayed dates
    pub date_format: String,

    // Appearance
    pub theme: ThemePreference,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Behaviour
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),

            manifest: "posts.json".to_string(),
            pages_dir: "pages".to_string(),
            date_format: "%Y-%m-%d".to_string(),

            theme: ThemePreference::System,
            highlight: HighlightConfig::default(),
            markdown: MarkdownConfig::default(),

            search: SearchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub line_number: bool,
    /// syntect theme used with the light scheme
    pub light_theme: String,
    /// syntect theme used with the dark scheme
    pub dark_theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            line_number: false,
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Markdown rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Render single newlines as line breaks
    pub breaks: bool,
    /// Add slug ids to headings
    pub header_ids: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            breaks: true,
            header_ids: true,
        }
    }
}

/// Interactive search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Preview server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
