//! Site emitter: bundle serialization with atomic publish.
//!
//! The whole bundle is written to a staging directory next to the publish
//! location and swapped in only on full success. Any failure removes the
//! staging directory, so a previously published bundle is never left half
//! overwritten.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::compiler::Page;
use crate::config::SiteConfig;
use crate::navigation::{page_output_path, SidebarTree};
use crate::renderer::HtmlRenderer;
use crate::search::SearchIndex;

/// Shared client payload: page listing, sidebar tree, search index.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    site: PayloadSite<'a>,
    pages: Vec<PayloadPage<'a>>,
    sidebar: &'a SidebarTree,
    #[serde(rename = "searchIndex", skip_serializing_if = "Option::is_none")]
    search_index: Option<&'a std::collections::BTreeMap<String, Vec<String>>>,
}

/// Site-level settings the client runtime needs at query time.
#[derive(Debug, Serialize)]
struct PayloadSite<'a> {
    title: &'a str,
    base: &'a str,
    #[serde(rename = "searchMaxSuggestions")]
    search_max_suggestions: usize,
}

#[derive(Debug, Serialize)]
struct PayloadPage<'a> {
    id: &'a str,
    title: &'a str,
    path: String,
}

pub struct SiteEmitter {
    renderer: HtmlRenderer,
}

impl Default for SiteEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteEmitter {
    pub fn new() -> Self {
        Self {
            renderer: HtmlRenderer::new(),
        }
    }

    pub fn with_renderer(renderer: HtmlRenderer) -> Self {
        Self { renderer }
    }

    /// Write the bundle to staging and atomically publish it to `output_dir`.
    pub fn emit(
        &self,
        pages: &IndexMap<String, Page>,
        sidebar: &SidebarTree,
        search_index: Option<&SearchIndex>,
        config: &SiteConfig,
        output_dir: &Path,
    ) -> Result<()> {
        let staging = staging_path(output_dir);
        if staging.exists() {
            std::fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to clear stale staging {}", staging.display()))?;
        }
        std::fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create staging {}", staging.display()))?;

        let result = self.write_bundle(pages, sidebar, search_index, config, &staging);

        match result {
            Ok(()) => {
                publish(&staging, output_dir)?;
                info!("Published bundle to {}", output_dir.display());
                Ok(())
            }
            Err(e) => {
                // Leave the previously published bundle untouched.
                let _ = std::fs::remove_dir_all(&staging);
                Err(e)
            }
        }
    }

    fn write_bundle(
        &self,
        pages: &IndexMap<String, Page>,
        sidebar: &SidebarTree,
        search_index: Option<&SearchIndex>,
        config: &SiteConfig,
        staging: &Path,
    ) -> Result<()> {
        pages
            .values()
            .collect::<Vec<_>>()
            .par_iter()
            .try_for_each(|page| self.write_page(page, config, sidebar, staging))?;

        let payload = Payload {
            site: PayloadSite {
                title: &config.title,
                base: &config.base,
                search_max_suggestions: config.search_max_suggestions,
            },
            pages: pages
                .values()
                .map(|page| PayloadPage {
                    id: &page.id,
                    title: &page.title,
                    path: config.base_join(&page_output_path(&page.id)),
                })
                .collect(),
            sidebar,
            search_index: search_index.map(|index| &index.entries),
        };
        let json = serde_json::to_string_pretty(&payload)?;
        let payload_path = staging.join("payload.json");
        std::fs::write(&payload_path, json)
            .with_context(|| format!("Failed to write {}", payload_path.display()))?;

        Ok(())
    }

    fn write_page(
        &self,
        page: &Page,
        config: &SiteConfig,
        sidebar: &SidebarTree,
        staging: &Path,
    ) -> Result<()> {
        let output_path = staging.join(page_output_path(&page.id));
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let html = self.renderer.render_full_page(page, config, sidebar);
        std::fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        debug!("Emitted page: {}", output_path.display());
        Ok(())
    }
}

fn staging_path(output_dir: &Path) -> PathBuf {
    let mut name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "out".to_string());
    name.push_str(".staging");
    output_dir.with_file_name(name)
}

/// Swap the staged bundle into the publish location. The previous bundle is
/// moved aside first and removed only after the swap succeeds.
fn publish(staging: &Path, output_dir: &Path) -> Result<()> {
    let previous = output_dir.with_file_name(format!(
        "{}.old",
        output_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "out".to_string())
    ));

    if previous.exists() {
        std::fs::remove_dir_all(&previous)
            .with_context(|| format!("Failed to remove stale {}", previous.display()))?;
    }

    let had_previous = output_dir.exists();
    if had_previous {
        std::fs::rename(output_dir, &previous).with_context(|| {
            format!("Failed to move previous bundle aside to {}", previous.display())
        })?;
    }

    if let Err(e) = std::fs::rename(staging, output_dir) {
        // Put the previous bundle back before failing.
        if had_previous {
            let _ = std::fs::rename(&previous, output_dir);
        }
        let _ = std::fs::remove_dir_all(staging);
        return Err(anyhow::Error::new(e).context(format!(
            "Failed to publish staged bundle to {}",
            output_dir.display()
        )));
    }

    if had_previous {
        std::fs::remove_dir_all(&previous)
            .with_context(|| format!("Failed to remove {}", previous.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(id: &str, title: &str) -> Page {
        Page {
            id: id.to_string(),
            title: title.to_string(),
            headings: Vec::new(),
            blocks: vec![crate::document::Block::Prose {
                text: format!("content of {}", id),
            }],
            prev: None,
            next: None,
            last_updated: None,
        }
    }

    fn page_map(pages: Vec<Page>) -> IndexMap<String, Page> {
        pages.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    #[test]
    fn test_emit_writes_pages_and_payload() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("dist");
        let pages = page_map(vec![page("index", "Home"), page("docs/theme", "Theme")]);

        SiteEmitter::new()
            .emit(
                &pages,
                &SidebarTree::default(),
                None,
                &SiteConfig::default(),
                &output,
            )
            .unwrap();

        assert!(output.join("index.html").exists());
        assert!(output.join("docs/theme.html").exists());
        let payload: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.join("payload.json")).unwrap())
                .unwrap();
        assert_eq!(payload["pages"].as_array().unwrap().len(), 2);
        assert!(payload.get("searchIndex").is_none());
        // No staging leftovers.
        assert!(!dir.path().join("dist.staging").exists());
    }

    #[test]
    fn test_failed_emit_leaves_previous_bundle_untouched() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("dist");

        // A previously published bundle.
        let first = page_map(vec![page("guide", "Guide")]);
        SiteEmitter::new()
            .emit(
                &first,
                &SidebarTree::default(),
                None,
                &SiteConfig::default(),
                &output,
            )
            .unwrap();
        let before = std::fs::read_to_string(output.join("guide.html")).unwrap();

        // A second build that must fail midway: "guide.html/sub" needs a
        // directory where "guide" already staged a file (or vice versa).
        let second = page_map(vec![page("guide", "Guide v2"), page("guide.html/sub", "Sub")]);
        let err = SiteEmitter::new().emit(
            &second,
            &SidebarTree::default(),
            None,
            &SiteConfig::default(),
            &output,
        );
        assert!(err.is_err());

        // Previous bundle is intact and staging is gone.
        let after = std::fs::read_to_string(output.join("guide.html")).unwrap();
        assert_eq!(before, after);
        assert!(!dir.path().join("dist.staging").exists());
    }
}
