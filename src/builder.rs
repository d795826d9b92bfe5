//! Build orchestration.
//!
//! One forward pass: Unloaded -> Loaded -> Compiled -> Emitted. Any stage
//! failure aborts the whole build; the emitter's staging contract guarantees
//! no partial bundle is ever published.

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::compiler::PageCompiler;
use crate::config::SiteConfig;
use crate::emitter::SiteEmitter;
use crate::loader::ContentLoader;
use crate::navigation::SidebarTree;
use crate::search::SearchIndex;
use crate::utils;

#[derive(Debug, Clone)]
pub struct BuildStats {
    pub documents_loaded: usize,
    pub pages_built: usize,
    pub search_tokens: usize,
    pub build_time: Duration,
    pub output_size_mb: f64,
}

pub struct SiteBuilder {
    config: SiteConfig,
    source_dir: PathBuf,
    output_dir: PathBuf,
    parallel_jobs: usize,
}

impl SiteBuilder {
    pub fn new(config: SiteConfig, source_dir: PathBuf, output_dir: PathBuf) -> Self {
        let parallel_jobs = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            config,
            source_dir,
            output_dir,
            parallel_jobs,
        }
    }

    pub fn set_parallel_jobs(&mut self, jobs: usize) {
        self.parallel_jobs = jobs.max(1);
    }

    /// Remove the published bundle.
    pub fn clean(&self) -> Result<()> {
        if self.output_dir.exists() {
            std::fs::remove_dir_all(&self.output_dir).with_context(|| {
                format!("Failed to remove output directory {}", self.output_dir.display())
            })?;
        }
        Ok(())
    }

    /// Run the full pipeline once.
    pub fn build(&self) -> Result<BuildStats> {
        let start_time = Instant::now();
        info!("Starting build of {}", self.source_dir.display());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallel_jobs)
            .build()
            .context("Failed to build worker pool")?;

        let stats = pool.install(|| -> Result<BuildStats> {
            let mut loader = ContentLoader::new();
            // Don't re-read our own output when it nests inside the source tree.
            if let Ok(relative) = self.output_dir.strip_prefix(&self.source_dir) {
                let prefix = crate::matching::normalize_path(relative);
                if !prefix.is_empty() {
                    loader.exclude(format!("{}/**", prefix));
                }
            }

            let documents = loader.load(&self.source_dir, &self.config)?;
            info!("Loaded {} documents", documents.len());

            let pages = PageCompiler::new().compile(&documents, &self.config)?;

            let sidebar = SidebarTree::build(&self.config, |id| {
                pages
                    .get(id)
                    .map(|p| p.title.clone())
                    .unwrap_or_else(|| id.to_string())
            });

            let search_index = if self.config.search {
                Some(SearchIndex::build(&pages, self.config.search_min_token_len))
            } else {
                None
            };

            SiteEmitter::new().emit(
                &pages,
                &sidebar,
                search_index.as_ref(),
                &self.config,
                &self.output_dir,
            )?;

            Ok(BuildStats {
                documents_loaded: documents.len(),
                pages_built: pages.len(),
                search_tokens: search_index.map(|i| i.token_count()).unwrap_or(0),
                build_time: Duration::default(),
                output_size_mb: 0.0,
            })
        })?;

        let build_time = start_time.elapsed();
        let output_size = utils::calculate_directory_size(&self.output_dir)?;
        info!("Build completed in {:?}", build_time);

        Ok(BuildStats {
            build_time,
            output_size_mb: output_size as f64 / 1024.0 / 1024.0,
            ..stats
        })
    }
}
