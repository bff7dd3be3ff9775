// src/report/markdown.rs
//! Line-oriented markdown subset → HTML.
//!
//! `classify_line` maps one input line to at most one `Block` and holds no
//! state; only blank lines map to `None`. `render_blocks` then groups runs of
//! list items into `<ul>`/`<ol>` wrappers without changing the blocks.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+(.*)$").expect("ordered regex"));
static RE_STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("strong regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level 1..=3.
    Heading { level: u8, text: String },
    ListItem { ordered: bool, text: String },
    Paragraph(String),
}

pub fn classify_line(line: &str) -> Option<Block> {
    let t = line.trim();
    if t.is_empty() {
        return None;
    }

    let hashes = t.chars().take_while(|&c| c == '#').count();
    if (1..=3).contains(&hashes) {
        let rest = &t[hashes..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some(Block::Heading {
                level: hashes as u8,
                text: rest.trim().to_string(),
            });
        }
    }

    if let Some(rest) = t.strip_prefix("- ").or_else(|| t.strip_prefix("* ")) {
        return Some(Block::ListItem {
            ordered: false,
            text: rest.trim().to_string(),
        });
    }
    if let Some(c) = RE_ORDERED.captures(t) {
        return Some(Block::ListItem {
            ordered: true,
            text: c[1].trim().to_string(),
        });
    }

    Some(Block::Paragraph(t.to_string()))
}

/// Escape, then turn `**x**` spans into `<strong>x</strong>`.
pub fn render_inline(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    RE_STRONG
        .replace_all(&escaped, "<strong>$1</strong>")
        .into_owned()
}

pub fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, text } => {
            format!("<h{level}>{}</h{level}>", render_inline(text))
        }
        Block::ListItem { text, .. } => format!("<li>{}</li>", render_inline(text)),
        Block::Paragraph(text) => format!("<p>{}</p>", render_inline(text)),
    }
}

pub fn parse(text: &str) -> Vec<Block> {
    text.lines().filter_map(classify_line).collect()
}

pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<bool> = None;

    for block in blocks {
        let list_kind = match block {
            Block::ListItem { ordered, .. } => Some(*ordered),
            _ => None,
        };
        if open_list != list_kind {
            if let Some(ordered) = open_list {
                out.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            if let Some(ordered) = list_kind {
                out.push_str(if ordered { "<ol>\n" } else { "<ul>\n" });
            }
            open_list = list_kind;
        }
        out.push_str(&render_block(block));
        out.push('\n');
    }
    if let Some(ordered) = open_list {
        out.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
    }
    out
}

pub fn render_markdown(text: &str) -> String {
    render_blocks(&parse(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_by_hash_count() {
        assert_eq!(
            classify_line("# 📊 Executive Summary"),
            Some(Block::Heading {
                level: 1,
                text: "📊 Executive Summary".into()
            })
        );
        assert_eq!(
            classify_line("## Risk"),
            Some(Block::Heading {
                level: 2,
                text: "Risk".into()
            })
        );
        assert_eq!(
            classify_line("  ### Deep  "),
            Some(Block::Heading {
                level: 3,
                text: "Deep".into()
            })
        );
    }

    #[test]
    fn unrecognized_hash_lines_are_paragraphs() {
        assert_eq!(
            classify_line("#### four"),
            Some(Block::Paragraph("#### four".into()))
        );
        assert_eq!(
            classify_line("#hashtag"),
            Some(Block::Paragraph("#hashtag".into()))
        );
    }

    #[test]
    fn list_items() {
        assert_eq!(
            classify_line("- Buy BTC"),
            Some(Block::ListItem {
                ordered: false,
                text: "Buy BTC".into()
            })
        );
        assert_eq!(
            classify_line("* Hedge"),
            Some(Block::ListItem {
                ordered: false,
                text: "Hedge".into()
            })
        );
        assert_eq!(
            classify_line("12. Trim ETH"),
            Some(Block::ListItem {
                ordered: true,
                text: "Trim ETH".into()
            })
        );
        // Bold at line start is not a bullet.
        assert_eq!(
            classify_line("**Base Case:**"),
            Some(Block::Paragraph("**Base Case:**".into()))
        );
    }

    #[test]
    fn blank_lines_drop() {
        assert_eq!(classify_line(""), None);
        assert_eq!(classify_line(" \t "), None);
    }

    #[test]
    fn inline_strong_and_escaping() {
        assert_eq!(
            render_block(&Block::Paragraph("BTC held **98000** <today>".into())),
            "<p>BTC held <strong>98000</strong> &lt;today&gt;</p>"
        );
    }

    #[test]
    fn lists_are_grouped_by_kind() {
        let html = render_markdown("- a\n- b\n1. c\n\ntext");
        assert_eq!(
            html,
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n<ol>\n<li>c</li>\n</ol>\n<p>text</p>\n"
        );
    }

    #[test]
    fn every_non_blank_line_yields_one_block() {
        let input = "# A\n\n## B\n- c\n* d\n3. e\n**f**\nplain\n   \n---\n{ \"k\": 1 }";
        let non_blank = input.lines().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(parse(input).len(), non_blank);
    }
}
