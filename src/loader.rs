//! Content loader: source discovery and document construction.
//!
//! Reads every Markdown source under the root in parallel, splits front
//! matter from the body, and produces an immutable document map keyed by
//! normalized id. Fails fast on id collisions and on sidebar references with
//! no backing file. Body parsing is not done here; that is the compiler's
//! collaborator.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::document::{normalize_doc_id, split_front_matter, Document, FrontMatter};
use crate::error::BuildError;
use crate::matching;
use crate::navigation;
use crate::utils;

pub struct ContentLoader {
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentLoader {
    pub fn new() -> Self {
        Self {
            include_patterns: vec!["**/*.md".to_string(), "**/*.markdown".to_string()],
            exclude_patterns: vec![
                ".*".to_string(),
                ".*/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
        }
    }

    /// Exclude an additional pattern, e.g. an output directory nested inside
    /// the source tree.
    pub fn exclude(&mut self, pattern: impl Into<String>) {
        self.exclude_patterns.push(pattern.into());
    }

    /// Load all documents under `source_dir` and verify sidebar references.
    /// The returned map iterates in sorted-id order.
    pub fn load(
        &self,
        source_dir: &Path,
        config: &SiteConfig,
    ) -> Result<IndexMap<String, Document>> {
        let files = matching::get_matching_files(
            source_dir,
            &self.include_patterns,
            &self.exclude_patterns,
        )?;
        info!("Discovered {} source files", files.len());

        let loaded: Vec<Document> = files
            .par_iter()
            .map(|path| self.load_one(source_dir, path))
            .collect::<Result<_>>()?;

        let mut documents: IndexMap<String, Document> = IndexMap::with_capacity(loaded.len());
        for doc in loaded {
            if let Some(existing) = documents.get(&doc.id) {
                return Err(BuildError::DuplicatePath {
                    id: doc.id.clone(),
                    first: existing.source_path.clone(),
                    second: doc.source_path.clone(),
                }
                .into());
            }
            documents.insert(doc.id.clone(), doc);
        }
        documents.sort_keys();

        self.check_sidebar_references(config, &documents)?;

        Ok(documents)
    }

    fn load_one(&self, source_dir: &Path, path: &PathBuf) -> Result<Document> {
        let relative = path
            .strip_prefix(source_dir)
            .with_context(|| format!("'{}' is not inside the source directory", path.display()))?;
        let id = normalize_doc_id(relative);
        debug!("Loading document: {} -> {}", relative.display(), id);

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        let source_mtime = utils::get_file_mtime(path)?;

        let (yaml, body) = split_front_matter(&raw);
        let front_matter = match yaml {
            Some(yaml) => serde_yaml::from_str::<FrontMatter>(yaml).map_err(|e| {
                BuildError::Conversion {
                    id: id.clone(),
                    source: anyhow::Error::new(e).context("invalid front matter"),
                }
            })?,
            None => FrontMatter::default(),
        };

        Ok(Document {
            source_path: path.clone(),
            id,
            raw_body: body.to_string(),
            front_matter,
            source_mtime,
        })
    }

    /// Every declared sidebar entry must resolve to a loaded document.
    /// Checked in config order so the first offending reference is reported
    /// deterministically.
    fn check_sidebar_references(
        &self,
        config: &SiteConfig,
        documents: &IndexMap<String, Document>,
    ) -> Result<()> {
        for (prefix, ids) in navigation::resolved_groups(config) {
            for id in ids {
                if !documents.contains_key(&id) {
                    return Err(BuildError::SourceNotFound {
                        group: prefix,
                        reference: id,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
