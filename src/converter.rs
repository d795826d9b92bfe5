//! Body conversion: the external Markdown collaborator.
//!
//! The pipeline treats Markdown parsing as a capability behind the
//! [`BodyConverter`] trait: raw text plus declared front matter in, an
//! ordered sequence of raw blocks out, no side effects. The default
//! implementation drives pulldown-cmark.

use anyhow::Result;
use pulldown_cmark::{CodeBlockKind, Event, Parser as MarkdownParser, Tag, TagEnd};

use crate::document::FrontMatter;

/// Converter output: headings, prose runs, and fenced code blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBlock {
    Heading { level: u32, text: String },
    Prose(String),
    Code {
        language: Option<String>,
        text: String,
    },
}

/// Converts a raw document body into an ordered block sequence.
/// Implementations must be pure: same input, same output, no side effects.
pub trait BodyConverter: Send + Sync {
    fn convert(&self, raw: &str, front_matter: &FrontMatter) -> Result<Vec<RawBlock>>;
}

/// Default converter over pulldown-cmark.
#[derive(Debug, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }
}

impl BodyConverter for MarkdownConverter {
    fn convert(&self, raw: &str, _front_matter: &FrontMatter) -> Result<Vec<RawBlock>> {
        let mut blocks = Vec::new();
        let mut heading: Option<(u32, String)> = None;
        let mut code: Option<(Option<String>, String)> = None;
        let mut prose = String::new();

        let flush_prose = |prose: &mut String, blocks: &mut Vec<RawBlock>| {
            let text = prose.trim().to_string();
            if !text.is_empty() {
                blocks.push(RawBlock::Prose(text));
            }
            prose.clear();
        };

        for event in MarkdownParser::new(raw) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    flush_prose(&mut prose, &mut blocks);
                    heading = Some((level as u32, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = heading.take() {
                        blocks.push(RawBlock::Heading {
                            level,
                            text: text.trim().to_string(),
                        });
                    }
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    flush_prose(&mut prose, &mut blocks);
                    let language = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            Some(lang.to_string())
                        }
                        _ => None,
                    };
                    code = Some((language, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, text)) = code.take() {
                        blocks.push(RawBlock::Code {
                            language,
                            text: text.trim_end_matches('\n').to_string(),
                        });
                    }
                }
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                    flush_prose(&mut prose, &mut blocks);
                }
                Event::Text(text) => {
                    if let Some((_, buf)) = heading.as_mut() {
                        buf.push_str(&text);
                    } else if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                    } else {
                        prose.push_str(&text);
                    }
                }
                Event::Code(text) => {
                    if let Some((_, buf)) = heading.as_mut() {
                        buf.push_str(&text);
                    } else {
                        prose.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some((_, buf)) = heading.as_mut() {
                        buf.push(' ');
                    } else {
                        prose.push(' ');
                    }
                }
                _ => {}
            }
        }

        flush_prose(&mut prose, &mut blocks);
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(raw: &str) -> Vec<RawBlock> {
        MarkdownConverter::new()
            .convert(raw, &FrontMatter::default())
            .unwrap()
    }

    #[test]
    fn test_prose_only_yields_one_block() {
        let blocks = convert("Just a single paragraph of text.\n");
        assert_eq!(
            blocks,
            vec![RawBlock::Prose("Just a single paragraph of text.".to_string())]
        );
    }

    #[test]
    fn test_headings_and_code() {
        let raw = "# Memory Model\n\nSome prose here.\n\n```c\nint main(void) { return 0; }\n```\n";
        let blocks = convert(raw);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            RawBlock::Heading {
                level: 1,
                text: "Memory Model".to_string()
            }
        );
        assert_eq!(blocks[1], RawBlock::Prose("Some prose here.".to_string()));
        assert_eq!(
            blocks[2],
            RawBlock::Code {
                language: Some("c".to_string()),
                text: "int main(void) { return 0; }".to_string()
            }
        );
    }

    #[test]
    fn test_unfenced_code_has_no_language() {
        let raw = "para\n\n    indented code\n";
        let blocks = convert(raw);
        assert!(matches!(
            blocks[1],
            RawBlock::Code { language: None, .. }
        ));
    }

    #[test]
    fn test_inline_code_stays_in_prose() {
        let blocks = convert("Call `kmalloc` to allocate.\n");
        assert_eq!(
            blocks,
            vec![RawBlock::Prose("Call kmalloc to allocate.".to_string())]
        );
    }

    #[test]
    fn test_list_items_flatten_to_prose() {
        let blocks = convert("- first point\n- second point\n");
        assert_eq!(
            blocks,
            vec![
                RawBlock::Prose("first point".to_string()),
                RawBlock::Prose("second point".to_string()),
            ]
        );
    }
}
