//! Page-record-to-HTML renderer.
//!
//! Prose is escaped, code blocks are syntax-highlighted with syntect (with an
//! optional line-number gutter), headings carry their anchor slugs as element
//! ids. The full-page shell (head, top nav, sidebar, prev/next footer) is
//! assembled by hand.

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::compiler::Page;
use crate::config::{NavEntry, SiteConfig};
use crate::document::Block;
use crate::navigation::SidebarTree;

pub struct HtmlRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_external(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "InspiredGitHub".to_string(),
        }
    }

    /// Set the syntax highlighting theme, if it exists in the default set.
    pub fn set_theme(&mut self, theme_name: &str) {
        if self.theme_set.themes.contains_key(theme_name) {
            self.theme_name = theme_name.to_string();
        }
    }

    /// Highlight code, falling back to an escaped plain block if the language
    /// is unknown or highlighting fails.
    fn highlight_code(&self, code: &str, language: Option<&str>) -> String {
        let theme = &self.theme_set.themes[&self.theme_name];
        let syntax = language
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(html) => html,
            Err(_) => {
                let escaped = html_escape::encode_text(code);
                format!("<pre><code>{}</code></pre>", escaped)
            }
        }
    }

    fn render_code_block(&self, text: &str, language: Option<&str>, line_numbers: bool) -> String {
        let highlighted = self.highlight_code(text, language);
        let lang_class = language.unwrap_or("text");
        if !line_numbers {
            return format!(
                "<div class=\"code-block language-{}\">\n{}</div>\n",
                html_escape::encode_double_quoted_attribute(lang_class),
                highlighted
            );
        }

        let count = text.lines().count().max(1);
        let mut gutter = String::from("<div class=\"line-numbers-wrapper\">");
        for n in 1..=count {
            gutter.push_str(&format!("<span class=\"line-number\">{}</span>", n));
        }
        gutter.push_str("</div>");

        format!(
            "<div class=\"code-block language-{} line-numbers-mode\">\n{}{}\n</div>\n",
            html_escape::encode_double_quoted_attribute(lang_class),
            highlighted,
            gutter
        )
    }

    /// Render a page's content: headings interleaved with blocks at their
    /// recorded offsets.
    pub fn render_page_body(&self, page: &Page) -> String {
        let mut html = String::new();
        let mut heading_iter = page.headings.iter().peekable();

        for (index, block) in page.blocks.iter().enumerate() {
            while let Some(h) = heading_iter.next_if(|h| h.offset <= index) {
                html.push_str(&format!(
                    "<h{} id=\"{}\">{}</h{}>\n",
                    h.level,
                    html_escape::encode_double_quoted_attribute(&h.slug),
                    html_escape::encode_text(&h.text),
                    h.level
                ));
            }
            match block {
                Block::Prose { text } => {
                    html.push_str(&format!("<p>{}</p>\n", html_escape::encode_text(text)));
                }
                Block::Code {
                    language,
                    text,
                    line_numbers,
                } => {
                    html.push_str(&self.render_code_block(
                        text,
                        language.as_deref(),
                        *line_numbers,
                    ));
                }
            }
        }
        // Headings after the last block.
        for h in heading_iter {
            html.push_str(&format!(
                "<h{} id=\"{}\">{}</h{}>\n",
                h.level,
                html_escape::encode_double_quoted_attribute(&h.slug),
                html_escape::encode_text(&h.text),
                h.level
            ));
        }
        html
    }

    fn render_nav_entry(&self, entry: &NavEntry, config: &SiteConfig) -> String {
        let text = html_escape::encode_text(&entry.text);
        let mut html = String::from("<li class=\"nav-item\">");
        match &entry.link {
            Some(link) => {
                let href = if is_external(link) {
                    link.clone()
                } else {
                    config.base_join(link)
                };
                html.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    html_escape::encode_double_quoted_attribute(&href),
                    text
                ));
            }
            None => {
                html.push_str(&format!("<span>{}</span>", text));
            }
        }
        if !entry.items.is_empty() {
            html.push_str("<ul class=\"nav-dropdown\">");
            for item in &entry.items {
                html.push_str(&self.render_nav_entry(item, config));
            }
            html.push_str("</ul>");
        }
        html.push_str("</li>");
        html
    }

    fn render_sidebar(&self, sidebar: &SidebarTree, current_id: &str) -> String {
        if sidebar.groups.is_empty() {
            return String::new();
        }
        let mut html = String::from("<aside class=\"sidebar\">\n");
        for group in &sidebar.groups {
            html.push_str("<ul class=\"sidebar-group\">\n");
            for item in &group.items {
                let class = if item.id == current_id {
                    "sidebar-link active"
                } else {
                    "sidebar-link"
                };
                html.push_str(&format!(
                    "<li><a class=\"{}\" href=\"{}\">{}</a></li>\n",
                    class,
                    html_escape::encode_double_quoted_attribute(&item.link),
                    html_escape::encode_text(&item.title)
                ));
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</aside>\n");
        html
    }

    fn render_page_footer(&self, page: &Page, config: &SiteConfig) -> String {
        let mut html = String::new();
        if let (Some(label), Some(stamp)) = (&config.last_updated, &page.last_updated) {
            html.push_str(&format!(
                "<div class=\"last-updated\">{}: {}</div>\n",
                html_escape::encode_text(label),
                html_escape::encode_text(stamp)
            ));
        }
        if page.prev.is_some() || page.next.is_some() {
            html.push_str("<nav class=\"page-nav\">");
            if let Some(prev) = &page.prev {
                html.push_str(&format!(
                    "<a class=\"prev\" href=\"{}\">← {}</a>",
                    html_escape::encode_double_quoted_attribute(&prev.link),
                    html_escape::encode_text(&prev.title)
                ));
            }
            if let Some(next) = &page.next {
                html.push_str(&format!(
                    "<a class=\"next\" href=\"{}\">{} →</a>",
                    html_escape::encode_double_quoted_attribute(&next.link),
                    html_escape::encode_text(&next.title)
                ));
            }
            html.push_str("</nav>\n");
        }
        html
    }

    /// Render the full HTML document for one page.
    pub fn render_full_page(
        &self,
        page: &Page,
        config: &SiteConfig,
        sidebar: &SidebarTree,
    ) -> String {
        let page_title = if config.title.is_empty() {
            page.title.clone()
        } else {
            format!("{} | {}", page.title, config.title)
        };

        let mut nav_html = String::new();
        if !config.nav.is_empty() {
            nav_html.push_str("<nav class=\"top-nav\"><ul>");
            for entry in &config.nav {
                nav_html.push_str(&self.render_nav_entry(entry, config));
            }
            nav_html.push_str("</ul></nav>");
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <meta name="description" content="{}" />
    <title>{}</title>
</head>
<body>
    {}
    {}
    <main class="page">
{}{}    </main>
</body>
</html>"#,
            html_escape::encode_double_quoted_attribute(&config.description),
            html_escape::encode_text(&page_title),
            nav_html,
            self.render_sidebar(sidebar, &page.id),
            self.render_page_body(page),
            self.render_page_footer(page, config),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Heading;
    use crate::navigation::NavLink;

    fn page_with(headings: Vec<Heading>, blocks: Vec<Block>) -> Page {
        Page {
            id: "docs/sample".to_string(),
            title: "Sample".to_string(),
            headings,
            blocks,
            prev: None,
            next: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_prose_is_escaped() {
        let page = page_with(
            Vec::new(),
            vec![Block::Prose {
                text: "a < b && c".to_string(),
            }],
        );
        let html = HtmlRenderer::new().render_page_body(&page);
        assert!(html.contains("a &lt; b &amp;&amp; c"));
    }

    #[test]
    fn test_headings_render_with_anchor_ids() {
        let page = page_with(
            vec![Heading {
                level: 2,
                text: "Memory Model".to_string(),
                slug: "memory-model".to_string(),
                offset: 0,
            }],
            vec![Block::Prose {
                text: "body".to_string(),
            }],
        );
        let html = HtmlRenderer::new().render_page_body(&page);
        assert!(html.contains("<h2 id=\"memory-model\">Memory Model</h2>"));
        // Heading comes before the prose block it precedes.
        assert!(html.find("memory-model").unwrap() < html.find("<p>body</p>").unwrap());
    }

    #[test]
    fn test_line_number_gutter() {
        let page = page_with(
            Vec::new(),
            vec![Block::Code {
                language: Some("sh".to_string()),
                text: "ls\npwd\nwhoami".to_string(),
                line_numbers: true,
            }],
        );
        let html = HtmlRenderer::new().render_page_body(&page);
        assert!(html.contains("line-numbers-mode"));
        assert!(html.contains("<span class=\"line-number\">3</span>"));
        assert!(!html.contains("<span class=\"line-number\">4</span>"));
    }

    #[test]
    fn test_full_page_shell() {
        let yaml = r#"
title: leisiji-blog
base: /leisiji-blog/
nav:
  - { text: Home, link: /, icon: reco-home }
  - { text: GitHub, link: "https://github.com/leisiji" }
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        let mut page = page_with(Vec::new(), Vec::new());
        page.next = Some(NavLink::new("Theme", "/leisiji-blog/docs/theme.html"));

        let html = HtmlRenderer::new().render_full_page(&page, &config, &SidebarTree::default());
        assert!(html.contains("<title>Sample | leisiji-blog</title>"));
        // Internal links get the base prefix, external ones do not.
        assert!(html.contains("href=\"/leisiji-blog/\""));
        assert!(html.contains("href=\"https://github.com/leisiji\""));
        assert!(html.contains("Theme →"));
    }
}
