//! Site configuration.
//!
//! Loaded once from a YAML file at build start and threaded as an immutable
//! value through loader, compiler, and emitter. Field layout follows the
//! usual blog-theme configuration: top navigation entries (with optional
//! dropdown items), ordered sidebar groups, search toggles, and free-form
//! metadata consumed opaquely by templates.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::BuildError;

/// One top-navigation entry. `items` nests dropdown children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavEntry {
    pub text: String,
    /// Site path (starting with `/`) or external URL.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub items: Vec<NavEntry>,
}

/// Process-wide site configuration, immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    /// Deployment base path, e.g. `/blog/`. Always prefix-joined onto
    /// emitted links.
    pub base: String,
    /// Ordered top-navigation entries.
    pub nav: Vec<NavEntry>,
    /// Ordered mapping from path prefix to document references. Order within
    /// a group is reading order; `""` refers to the group's own index page.
    pub sidebar: IndexMap<String, Vec<String>>,
    /// Whether to build the client-side search index.
    pub search: bool,
    #[serde(rename = "searchMaxSuggestions")]
    pub search_max_suggestions: usize,
    #[serde(rename = "searchMinTokenLen")]
    pub search_min_token_len: usize,
    /// Footer label for the last-updated stamp; `None` disables it.
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<String>,
    /// Site-wide default for code block line numbering.
    #[serde(rename = "lineNumbers")]
    pub line_numbers: bool,
    /// Free-form metadata (logo, avatar, start year). Opaque.
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            author: None,
            base: "/".to_string(),
            nav: Vec::new(),
            sidebar: IndexMap::new(),
            search: true,
            search_max_suggestions: 10,
            search_min_token_len: 2,
            last_updated: None,
            line_numbers: false,
            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load the configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let load = || -> Result<Self> {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: SiteConfig = serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(config)
        };
        load().map_err(|e| {
            BuildError::Config {
                path: path.to_path_buf(),
                source: e,
            }
            .into()
        })
    }

    /// Join a site-absolute link onto the deployment base path.
    pub fn base_join(&self, link: &str) -> String {
        let base = self.base.trim_end_matches('/');
        format!("{}/{}", base, link.trim_start_matches('/'))
    }
}
