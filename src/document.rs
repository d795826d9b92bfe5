//! Document, front matter, and content block types.
//!
//! A `Document` is one loaded source file: raw body text plus declared front
//! matter. Documents are created by the content loader and never mutated
//! afterwards; the page compiler derives one `Page` from each.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One loaded source file.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path of the source file.
    pub source_path: PathBuf,
    /// Normalized identifier: source-relative path, forward slashes,
    /// extension stripped. Unique within a load set.
    pub id: String,
    /// Body text with the front matter block removed.
    pub raw_body: String,
    /// Declared attributes from the leading `---` block, if any.
    pub front_matter: FrontMatter,
    /// Source modification time, used for the last-updated stamp.
    pub source_mtime: SystemTime,
}

/// Structured metadata block at the top of a source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Per-page override of the site-wide code line-numbering default.
    #[serde(rename = "lineNumbers")]
    pub line_numbers: Option<bool>,
    /// Anything else declared in the block is carried opaquely.
    #[serde(flatten)]
    pub extra: indexmap::IndexMap<String, serde_yaml::Value>,
}

/// A compiled content block: prose, or code tagged with a language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Prose { text: String },
    Code {
        language: Option<String>,
        text: String,
        line_numbers: bool,
    },
}

/// A heading with its in-page anchor slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u32,
    pub text: String,
    pub slug: String,
    /// Index into the page's block sequence before which this heading
    /// appears, so the renderer can interleave anchors with content.
    pub offset: usize,
}

/// Normalize a source-relative path into a document id.
///
/// Extension is stripped, separators become forward slashes, and a trailing
/// `README` component maps to `index` so that `guide/README.md` and
/// `guide/index.md` address the same page (having both is a duplicate).
pub fn normalize_doc_id(relative_path: &Path) -> String {
    let without_ext = relative_path.with_extension("");
    let mut id = without_ext.to_string_lossy().replace('\\', "/");
    if id == "README" {
        id = "index".to_string();
    } else if let Some(stripped) = id.strip_suffix("/README") {
        id = format!("{}/index", stripped);
    }
    id
}

/// Split a raw source file into its front matter block and body.
///
/// Front matter is a leading `---` line, YAML until the next `---` line.
/// Returns the YAML text (without delimiters) and the remaining body.
pub fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix("---") else {
        return (None, raw);
    };
    // The opening delimiter must be alone on its line.
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (None, raw);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, raw)
}
