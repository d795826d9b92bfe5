//! Client-side search index.
//!
//! Built once per build from every page's title and prose blocks (code
//! blocks are not indexed), read-only afterwards.
//! Tokens map to sorted page-id lists; queries are prefix matches capped at
//! lookup time, never at build time. Per-page token sets are computed in
//! parallel and merged through a concurrent map, then frozen into a sorted
//! structure so identical input always serializes identically.

use dashmap::DashMap;
use indexmap::IndexMap;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::compiler::Page;
use crate::document::Block;

/// Inverted token-to-pages mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    pub min_token_len: usize,
    /// Sorted token -> sorted page ids.
    pub entries: BTreeMap<String, Vec<String>>,
}

/// Lowercase tokens split on non-alphanumeric runs, shorter-than-min dropped.
pub fn tokenize(text: &str, min_token_len: usize) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(move |token| token.chars().count() >= min_token_len)
        .map(|token| token.to_lowercase())
}

impl SearchIndex {
    /// Build the index over every page's prose blocks and title.
    pub fn build(pages: &IndexMap<String, Page>, min_token_len: usize) -> Self {
        let merged: DashMap<String, BTreeSet<String>> = DashMap::new();

        pages
            .values()
            .collect::<Vec<_>>()
            .par_iter()
            .for_each(|page| {
                let mut tokens: BTreeSet<String> =
                    tokenize(&page.title, min_token_len).collect();
                for block in &page.blocks {
                    if let Block::Prose { text } = block {
                        tokens.extend(tokenize(text, min_token_len));
                    }
                }
                for token in tokens {
                    merged.entry(token).or_default().insert(page.id.clone());
                }
            });

        let entries: BTreeMap<String, Vec<String>> = merged
            .into_iter()
            .map(|(token, ids)| (token, ids.into_iter().collect()))
            .collect();

        info!("Search index built: {} tokens", entries.len());
        Self {
            min_token_len,
            entries,
        }
    }

    pub fn token_count(&self) -> usize {
        self.entries.len()
    }

    /// Prefix-match query. Page references are deduplicated, returned in
    /// sorted order, and capped at `max_results`.
    pub fn lookup(&self, prefix: &str, max_results: usize) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        let mut refs: BTreeSet<&str> = BTreeSet::new();
        for (token, ids) in self.entries.range(prefix.clone()..) {
            if !token.starts_with(&prefix) {
                break;
            }
            refs.extend(ids.iter().map(|s| s.as_str()));
        }
        refs.into_iter().take(max_results).collect()
    }
}
