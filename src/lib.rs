//! recopress
//!
//! A static blog/documentation site builder. Markdown sources plus one site
//! configuration go in; out comes a deployable bundle with one HTML page per
//! document and a shared JSON payload carrying the sidebar tree and a
//! client-side search index.

pub mod builder;
pub mod compiler;
pub mod config;
pub mod converter;
pub mod document;
pub mod emitter;
pub mod error;
pub mod loader;
pub mod matching;
pub mod navigation;
pub mod renderer;
pub mod search;
pub mod utils;

pub use builder::{BuildStats, SiteBuilder};
pub use compiler::{Page, PageCompiler, SlugGenerator};
pub use config::{NavEntry, SiteConfig};
pub use converter::{BodyConverter, MarkdownConverter, RawBlock};
pub use document::{Block, Document, FrontMatter, Heading};
pub use emitter::SiteEmitter;
pub use error::BuildError;
pub use loader::ContentLoader;
pub use navigation::{NavLink, SidebarGroup, SidebarItem, SidebarTree};
pub use renderer::HtmlRenderer;
pub use search::SearchIndex;
