//! Markdown-subset renderer for blog and service content
//!
//! A single pass over the lines, first matching rule wins:
//! `# `, `## `, `### ` headings, a line wrapped in `**` as a bold
//! paragraph, runs of `- ` lines as one list, blank lines as spacers, and
//! everything else as a paragraph with inline `**strong**`.
//!
//! All text is HTML-escaped before inline markup is applied.

use std::sync::LazyLock;

use regex::Regex;

use crate::format::escape_html;

/// Inline strong: `**text**` where text has no `*`
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));

/// One rendered unit of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    /// Whole line wrapped in `**`, markers removed
    BoldParagraph(String),
    List(Vec<String>),
    Spacer,
    /// Raw line; inline strong is applied at render time
    Paragraph(String),
}

/// Split content into blocks
pub fn parse(content: &str) -> Vec<Block> {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(text) = line.strip_prefix("# ") {
            blocks.push(Block::Heading {
                level: 1,
                text: text.to_string(),
            });
        } else if let Some(text) = line.strip_prefix("## ") {
            blocks.push(Block::Heading {
                level: 2,
                text: text.to_string(),
            });
        } else if let Some(text) = line.strip_prefix("### ") {
            blocks.push(Block::Heading {
                level: 3,
                text: text.to_string(),
            });
        } else if line.starts_with("**") && line.ends_with("**") {
            blocks.push(Block::BoldParagraph(line.replace("**", "")));
        } else if line.starts_with("- ") {
            let mut items = Vec::new();
            while let Some(item) = lines.get(i).and_then(|l| l.strip_prefix("- ")) {
                items.push(item.to_string());
                i += 1;
            }
            blocks.push(Block::List(items));
            continue;
        } else if line.trim().is_empty() {
            blocks.push(Block::Spacer);
        } else {
            blocks.push(Block::Paragraph(line.to_string()));
        }
        i += 1;
    }
    blocks
}

/// Escape, then turn `**x**` into `<strong>x</strong>`
fn inline(text: &str) -> String {
    STRONG_RE
        .replace_all(&escape_html(text), "<strong>$1</strong>")
        .into_owned()
}

/// Render parsed blocks as HTML
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                html.push_str(&format!("<h{level}>{}</h{level}>\n", escape_html(text)));
            }
            Block::BoldParagraph(text) => {
                html.push_str(&format!(
                    "<p class=\"md-bold\"><strong>{}</strong></p>\n",
                    escape_html(text)
                ));
            }
            Block::List(items) => {
                html.push_str("<ul>\n");
                for item in items {
                    html.push_str(&format!("<li>{}</li>\n", escape_html(item)));
                }
                html.push_str("</ul>\n");
            }
            Block::Spacer => html.push_str("<div class=\"md-spacer\"></div>\n"),
            Block::Paragraph(text) => {
                html.push_str(&format!("<p>{}</p>\n", inline(text)));
            }
        }
    }
    html
}

/// Parse and render in one go
pub fn to_html(content: &str) -> String {
    blocks_to_html(&parse(content))
}
