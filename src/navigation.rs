//! Navigation graph: sidebar groups and page-to-page links.
//!
//! Built once from the site configuration plus the compiled pages, read-only
//! afterwards. The tree mirrors the config's sidebar groups and is serialized
//! into the client payload for sidebar rendering.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;

/// A link to another page, used for prev/next and breadcrumbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub link: String,
}

impl NavLink {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// One entry of a sidebar group, resolved to an existing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarItem {
    pub id: String,
    pub title: String,
    pub link: String,
}

/// An ordered section of the site navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarGroup {
    pub prefix: String,
    pub items: Vec<SidebarItem>,
}

/// The full sidebar tree, in configuration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidebarTree {
    pub groups: Vec<SidebarGroup>,
}

/// Resolve a sidebar reference against its group prefix into a document id.
///
/// `""` refers to the group's own index page; a reference starting with `/`
/// is site-absolute. Document ids never carry a leading slash.
pub fn resolve_reference(prefix: &str, reference: &str) -> String {
    if let Some(absolute) = reference.strip_prefix('/') {
        return absolute.trim_end_matches('/').to_string();
    }
    let base = prefix.trim_matches('/');
    if reference.is_empty() {
        if base.is_empty() {
            "index".to_string()
        } else {
            format!("{}/index", base)
        }
    } else if base.is_empty() {
        reference.to_string()
    } else {
        format!("{}/{}", base, reference)
    }
}

/// Emitted output path for a page id, relative to the bundle root.
pub fn page_output_path(id: &str) -> String {
    format!("{}.html", id)
}

impl SidebarTree {
    /// Build the tree from the configured groups, resolving every reference
    /// to a page title via `title_of`. The loader has already guaranteed that
    /// every reference resolves to an existing document.
    pub fn build<F>(config: &SiteConfig, title_of: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let mut groups = Vec::new();
        for (prefix, references) in &config.sidebar {
            let items = references
                .iter()
                .map(|reference| {
                    let id = resolve_reference(prefix, reference);
                    let link = config.base_join(&page_output_path(&id));
                    let title = title_of(&id);
                    SidebarItem { id, title, link }
                })
                .collect();
            groups.push(SidebarGroup {
                prefix: prefix.clone(),
                items,
            });
        }
        Self { groups }
    }

    /// Flatten every group into (group prefix, ordered ids).
    pub fn flattened_groups(&self) -> Vec<(&str, Vec<&str>)> {
        self.groups
            .iter()
            .map(|group| {
                (
                    group.prefix.as_str(),
                    group.items.iter().map(|item| item.id.as_str()).collect(),
                )
            })
            .collect()
    }
}

/// Flatten the configured sidebar groups into (prefix, resolved ids) without
/// needing compiled pages. Used by the loader's existence check and by the
/// compiler's prev/next resolution.
pub fn resolved_groups(config: &SiteConfig) -> IndexMap<String, Vec<String>> {
    let mut groups = IndexMap::new();
    for (prefix, references) in &config.sidebar {
        let ids = references
            .iter()
            .map(|reference| resolve_reference(prefix, reference))
            .collect();
        groups.insert(prefix.clone(), ids);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("/docs/theme-reco/", ""), "docs/theme-reco/index");
        assert_eq!(resolve_reference("/docs/theme-reco/", "theme"), "docs/theme-reco/theme");
        assert_eq!(resolve_reference("/", ""), "index");
        assert_eq!(resolve_reference("/", "about"), "about");
        assert_eq!(resolve_reference("/docs/", "/notes/memory"), "notes/memory");
    }

    #[test]
    fn test_build_tree_keeps_config_order() {
        let yaml = r#"
sidebar:
  /docs/guide/: ["", intro, api]
  /notes/: [memory]
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        let tree = SidebarTree::build(&config, |id| format!("Title of {}", id));

        assert_eq!(tree.groups.len(), 2);
        assert_eq!(tree.groups[0].prefix, "/docs/guide/");
        let ids: Vec<_> = tree.groups[0].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["docs/guide/index", "docs/guide/intro", "docs/guide/api"]);
        assert_eq!(tree.groups[0].items[1].link, "/docs/guide/intro.html");
        assert_eq!(tree.groups[1].items[0].title, "Title of notes/memory");
    }
}
