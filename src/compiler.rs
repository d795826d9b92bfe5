//! Page compiler: documents plus configuration in, immutable pages out.
//!
//! Two responsibilities live here: deterministic anchor-slug generation for
//! headings, and sequential prev/next resolution over the configured sidebar
//! groups. Body conversion is delegated to the [`BodyConverter`] collaborator.

use anyhow::Result;
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::converter::{BodyConverter, MarkdownConverter, RawBlock};
use crate::document::{Block, Document, Heading};
use crate::error::BuildError;
use crate::navigation::{self, NavLink};

/// A compiled page, derived 1:1 from a document. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub headings: Vec<Heading>,
    pub blocks: Vec<Block>,
    /// Previous page in the same sidebar group, absent at group boundaries
    /// and for pages outside every group.
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
    /// Formatted source mtime, present when the site enables the
    /// last-updated footer.
    pub last_updated: Option<String>,
}

/// Deterministic slugifier with per-page collision suffixes.
///
/// Heading text is lowercased, non-alphanumeric runs collapse to a single
/// hyphen, and a repeated slug gets `-1`, `-2`, ... in order of first
/// occurrence.
#[derive(Debug, Default)]
pub struct SlugGenerator {
    seen: HashMap<String, usize>,
    issued: std::collections::HashSet<String>,
}

impl SlugGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slugify(text: &str) -> String {
        let mut slug = String::with_capacity(text.len());
        let mut pending_hyphen = false;
        for c in text.chars() {
            if c.is_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                for lower in c.to_lowercase() {
                    slug.push(lower);
                }
            } else {
                pending_hyphen = true;
            }
        }
        if slug.is_empty() {
            slug.push_str("section");
        }
        slug
    }

    /// Produce a slug unique within this generator's lifetime.
    pub fn next(&mut self, text: &str) -> String {
        let base = Self::slugify(text);
        let mut count = self.seen.get(&base).copied().unwrap_or(0);
        let mut slug = if count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        // A heading like "Setup 1" can occupy a suffix another base would
        // generate; skip past anything already issued.
        while self.issued.contains(&slug) {
            count += 1;
            slug = format!("{}-{}", base, count);
        }
        self.seen.insert(base, count + 1);
        self.issued.insert(slug.clone());
        slug
    }
}

pub struct PageCompiler {
    converter: Box<dyn BodyConverter>,
}

impl Default for PageCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCompiler {
    pub fn new() -> Self {
        Self {
            converter: Box::new(MarkdownConverter::new()),
        }
    }

    pub fn with_converter(converter: Box<dyn BodyConverter>) -> Self {
        Self { converter }
    }

    /// Compile every document into a page and resolve sidebar navigation.
    /// The returned map has the same keys as the input, in the same order.
    pub fn compile(
        &self,
        documents: &IndexMap<String, Document>,
        config: &SiteConfig,
    ) -> Result<IndexMap<String, Page>> {
        info!("Compiling {} documents", documents.len());

        let compiled: Vec<Page> = documents
            .values()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|doc| self.compile_one(doc, config))
            .collect::<Result<_>>()?;

        let mut pages: IndexMap<String, Page> = compiled
            .into_iter()
            .map(|page| (page.id.clone(), page))
            .collect();

        self.resolve_navigation(&mut pages, config)?;

        Ok(pages)
    }

    fn compile_one(&self, document: &Document, config: &SiteConfig) -> Result<Page> {
        let raw_blocks = self
            .converter
            .convert(&document.raw_body, &document.front_matter)
            .map_err(|e| BuildError::Conversion {
                id: document.id.clone(),
                source: e,
            })?;

        let line_numbers = document
            .front_matter
            .line_numbers
            .unwrap_or(config.line_numbers);

        let mut slugs = SlugGenerator::new();
        let mut headings = Vec::new();
        let mut blocks = Vec::new();

        for raw in raw_blocks {
            match raw {
                RawBlock::Heading { level, text } => {
                    let slug = slugs.next(&text);
                    headings.push(Heading {
                        level,
                        text,
                        slug,
                        offset: blocks.len(),
                    });
                }
                RawBlock::Prose(text) => blocks.push(Block::Prose { text }),
                RawBlock::Code { language, text } => blocks.push(Block::Code {
                    language,
                    text,
                    line_numbers,
                }),
            }
        }

        let title = document
            .front_matter
            .title
            .clone()
            .or_else(|| {
                headings
                    .iter()
                    .find(|h| h.level == 1)
                    .map(|h| h.text.clone())
            })
            .unwrap_or_else(|| "Untitled".to_string());

        let last_updated = config.last_updated.as_ref().map(|_| {
            DateTime::<Local>::from(document.source_mtime)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        });

        debug!(
            "Compiled page '{}': {} headings, {} blocks",
            document.id,
            headings.len(),
            blocks.len()
        );

        Ok(Page {
            id: document.id.clone(),
            title,
            headings,
            blocks,
            prev: None,
            next: None,
            last_updated,
        })
    }

    /// Flatten each sidebar group and link adjacent pages. A page may belong
    /// to at most one group; pages outside every group keep no prev/next.
    fn resolve_navigation(
        &self,
        pages: &mut IndexMap<String, Page>,
        config: &SiteConfig,
    ) -> Result<()> {
        let groups = navigation::resolved_groups(config);

        let mut owner: HashMap<String, String> = HashMap::new();
        for (prefix, ids) in &groups {
            for id in ids {
                if let Some(first) = owner.get(id) {
                    return Err(BuildError::AmbiguousGroup {
                        id: id.clone(),
                        first: first.clone(),
                        second: prefix.clone(),
                    }
                    .into());
                }
                owner.insert(id.clone(), prefix.clone());
            }
        }

        for (prefix, ids) in &groups {
            for i in 0..ids.len() {
                let prev = if i > 0 {
                    Some(self.nav_link(pages, config, &ids[i - 1]))
                } else {
                    None
                };
                let next = if i + 1 < ids.len() {
                    Some(self.nav_link(pages, config, &ids[i + 1]))
                } else {
                    None
                };
                let Some(page) = pages.get_mut(&ids[i]) else {
                    return Err(BuildError::SourceNotFound {
                        group: prefix.clone(),
                        reference: ids[i].clone(),
                    }
                    .into());
                };
                page.prev = prev;
                page.next = next;
            }
        }

        Ok(())
    }

    fn nav_link(&self, pages: &IndexMap<String, Page>, config: &SiteConfig, id: &str) -> NavLink {
        let title = pages
            .get(id)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| id.to_string());
        NavLink::new(title, config.base_join(&navigation::page_output_path(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn doc(id: &str, body: &str) -> Document {
        Document {
            source_path: PathBuf::from(format!("/src/{}.md", id)),
            id: id.to_string(),
            raw_body: body.to_string(),
            front_matter: Default::default(),
            source_mtime: SystemTime::UNIX_EPOCH,
        }
    }

    fn doc_map(docs: Vec<Document>) -> IndexMap<String, Document> {
        let mut map: IndexMap<String, Document> =
            docs.into_iter().map(|d| (d.id.clone(), d)).collect();
        map.sort_keys();
        map
    }

    #[test]
    fn test_slugify() {
        assert_eq!(SlugGenerator::slugify("Memory Model"), "memory-model");
        assert_eq!(SlugGenerator::slugify("  What's new?  "), "what-s-new");
        assert_eq!(SlugGenerator::slugify("C++ API"), "c-api");
        assert_eq!(SlugGenerator::slugify("!!!"), "section");
    }

    #[test]
    fn test_slug_collision_suffixes() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.next("Setup"), "setup");
        assert_eq!(slugs.next("Setup"), "setup-1");
        assert_eq!(slugs.next("Setup"), "setup-2");
        assert_eq!(slugs.next("Other"), "other");
    }

    #[test]
    fn test_prose_only_document() {
        let docs = doc_map(vec![doc("plain", "Only a paragraph.\n")]);
        let pages = PageCompiler::new()
            .compile(&docs, &SiteConfig::default())
            .unwrap();

        let page = &pages["plain"];
        assert!(page.headings.is_empty());
        assert_eq!(page.blocks.len(), 1);
        assert!(matches!(page.blocks[0], Block::Prose { .. }));
        assert_eq!(page.title, "Untitled");
        assert!(page.prev.is_none() && page.next.is_none());
    }

    #[test]
    fn test_title_precedence() {
        let mut with_fm = doc("a", "# Heading Title\n");
        with_fm.front_matter.title = Some("Front Matter Title".to_string());
        let docs = doc_map(vec![with_fm, doc("b", "# Heading Title\n")]);

        let pages = PageCompiler::new()
            .compile(&docs, &SiteConfig::default())
            .unwrap();
        assert_eq!(pages["a"].title, "Front Matter Title");
        assert_eq!(pages["b"].title, "Heading Title");
    }

    #[test]
    fn test_prev_next_within_group() {
        let yaml = "sidebar:\n  /guide/: [\"\", theme, api]\n";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        let docs = doc_map(vec![
            doc("guide/index", "# Guide\n"),
            doc("guide/theme", "# Theme\n"),
            doc("guide/api", "# Api\n"),
            doc("orphan", "# Orphan\n"),
        ]);

        let pages = PageCompiler::new().compile(&docs, &config).unwrap();

        assert!(pages["guide/index"].prev.is_none());
        assert_eq!(pages["guide/index"].next.as_ref().unwrap().title, "Theme");
        assert_eq!(pages["guide/theme"].prev.as_ref().unwrap().title, "Guide");
        assert_eq!(pages["guide/theme"].next.as_ref().unwrap().title, "Api");
        assert_eq!(
            pages["guide/theme"].next.as_ref().unwrap().link,
            "/guide/api.html"
        );
        assert!(pages["guide/api"].next.is_none());

        // Not in any group: reachable only by direct link, no neighbors.
        assert!(pages["orphan"].prev.is_none() && pages["orphan"].next.is_none());
    }

    #[test]
    fn test_ambiguous_group_is_an_error() {
        let yaml = "sidebar:\n  /guide/: [theme]\n  /other/: [/guide/theme]\n";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        let docs = doc_map(vec![doc("guide/theme", "# Theme\n")]);

        let err = PageCompiler::new().compile(&docs, &config).unwrap_err();
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::AmbiguousGroup { id, .. }) => assert_eq!(id, "guide/theme"),
            other => panic!("expected AmbiguousGroup, got {:?}", other),
        }
    }

    #[test]
    fn test_heading_offsets_track_block_positions() {
        let raw = "# One\n\npara\n\n## Two\n\n```sh\nls\n```\n";
        let docs = doc_map(vec![doc("d", raw)]);
        let pages = PageCompiler::new()
            .compile(&docs, &SiteConfig::default())
            .unwrap();

        let page = &pages["d"];
        assert_eq!(page.headings[0].offset, 0);
        assert_eq!(page.headings[1].offset, 1);
        assert_eq!(page.blocks.len(), 2);
    }
}
