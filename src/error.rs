//! Build error taxonomy.
//!
//! Every variant is fatal to the build: a static build is deterministic, so
//! nothing here is retried. The CLI surfaces the error kind together with the
//! offending path or reference.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    /// A sidebar entry references a document that has no backing source file.
    #[error("sidebar group '{group}' references '{reference}', but no source file backs it")]
    SourceNotFound { group: String, reference: String },

    /// Two source files normalize to the same document id.
    #[error("source files '{}' and '{}' both map to document path '{id}'", first.display(), second.display())]
    DuplicatePath {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A document appears in more than one sidebar group, so its reading
    /// order would be undefined.
    #[error("document '{id}' appears in sidebar groups '{first}' and '{second}'")]
    AmbiguousGroup {
        id: String,
        first: String,
        second: String,
    },

    /// The body converter rejected a document. Propagated opaquely.
    #[error("failed to convert document '{id}'")]
    Conversion {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The site configuration could not be read or parsed.
    #[error("invalid site configuration at '{}'", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
