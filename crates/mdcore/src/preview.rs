//! A styled, line-oriented rendering of a buffer for terminal preview panes.
//!
//! The buffer is parsed with the same options as [`crate::to_html`] and the
//! AST is flattened into [`PreviewLine`]s. Anything the preview does not know
//! how to style falls back to its children's text.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena};

use crate::markdown::options;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub superscript: bool,
    pub marker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSpan {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Paragraph,
    Heading(u8),
    ListItem,
    CodeBlock,
    Html,
    Rule,
    TableRow { header: bool },
    Footnote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub kind: LineKind,
    /// Nesting depth of block quotes around the line.
    pub quote_depth: usize,
    /// Indentation in list levels.
    pub indent: usize,
    pub spans: Vec<PreviewSpan>,
}

impl PreviewLine {
    /// The line's text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

pub fn preview(src: &str) -> Vec<PreviewLine> {
    let arena = Arena::new();
    let opt = options();
    let root = parse_document(&arena, src, &opt);

    let mut flattener = Flattener::default();
    for (i, child) in root.children().enumerate() {
        if i > 0 {
            flattener.blank();
        }
        flattener.block(child, 0);
    }
    flattener.lines
}

#[derive(Default)]
struct Flattener {
    lines: Vec<PreviewLine>,
    quote_depth: usize,
    footnote_refs: usize,
    footnote_defs: usize,
}

impl Flattener {
    fn blank(&mut self) {
        self.lines.push(PreviewLine {
            kind: LineKind::Blank,
            quote_depth: self.quote_depth,
            indent: 0,
            spans: Vec::new(),
        });
    }

    fn push(&mut self, kind: LineKind, indent: usize, spans: Vec<PreviewSpan>) {
        self.lines.push(PreviewLine {
            kind,
            quote_depth: self.quote_depth,
            indent,
            spans,
        });
    }

    fn push_inline<'a>(&mut self, kind: LineKind, indent: usize, node: &'a AstNode<'a>) {
        let mut lines = vec![Vec::new()];
        for child in node.children() {
            self.inline(child, SpanStyle::default(), &mut lines);
        }
        for spans in lines {
            self.push(kind, indent, spans);
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, indent: usize) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Paragraph => self.push_inline(LineKind::Paragraph, indent, node),
            NodeValue::Heading(heading) => {
                self.push_inline(LineKind::Heading(heading.level), indent, node)
            }
            NodeValue::ThematicBreak => self.push(LineKind::Rule, indent, Vec::new()),
            NodeValue::CodeBlock(block) => {
                let style = SpanStyle {
                    code: true,
                    ..SpanStyle::default()
                };
                for line in block.literal.trim_end_matches('\n').split('\n') {
                    self.push(LineKind::CodeBlock, indent, vec![span(line, style)]);
                }
            }
            NodeValue::HtmlBlock(html) => {
                for line in html.literal.trim_end_matches('\n').split('\n') {
                    self.push(LineKind::Html, indent, vec![span(line, SpanStyle::default())]);
                }
            }
            NodeValue::BlockQuote => {
                self.quote_depth += 1;
                for child in node.children() {
                    self.block(child, indent);
                }
                self.quote_depth -= 1;
            }
            NodeValue::List(list) => {
                for (i, item) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => format!("{}. ", list.start + i),
                    };
                    self.item(item, indent, marker);
                }
            }
            NodeValue::Table(_) => {
                for row in node.children() {
                    let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                    let mut spans = Vec::new();
                    for (i, cell) in row.children().enumerate() {
                        if i > 0 {
                            spans.push(marker(" │ "));
                        }
                        let mut cell_lines = vec![Vec::new()];
                        let style = SpanStyle {
                            strong: header,
                            ..SpanStyle::default()
                        };
                        for child in cell.children() {
                            self.inline(child, style, &mut cell_lines);
                        }
                        spans.extend(cell_lines.into_iter().flatten());
                    }
                    self.push(LineKind::TableRow { header }, indent, spans);
                }
            }
            NodeValue::FootnoteDefinition(_) => {
                self.footnote_defs += 1;
                let first = self.lines.len();
                for child in node.children() {
                    self.block(child, indent);
                }
                let label = marker(&format!("[{}]: ", self.footnote_defs));
                self.prefix_first(first, LineKind::Footnote, indent, label);
            }
            _ => {
                for child in node.children() {
                    self.block(child, indent);
                }
            }
        }
    }

    fn item<'a>(&mut self, item: &'a AstNode<'a>, indent: usize, bullet: String) {
        let bullet = match item.data.borrow().value {
            NodeValue::TaskItem(Some(_)) => "[x] ".to_string(),
            NodeValue::TaskItem(None) => "[ ] ".to_string(),
            _ => bullet,
        };

        let first = self.lines.len();
        for child in item.children() {
            self.block(child, indent + 1);
        }
        self.prefix_first(first, LineKind::ListItem, indent, marker(&bullet));
    }

    // Put `label` in front of the first line produced since `first`, or on a
    // line of its own if nothing was produced.
    fn prefix_first(&mut self, first: usize, kind: LineKind, indent: usize, label: PreviewSpan) {
        match self.lines.get_mut(first) {
            Some(line) => {
                line.kind = kind;
                line.indent = indent;
                line.spans.insert(0, label);
            }
            None => self.push(kind, indent, vec![label]),
        }
    }

    fn inline<'a>(&mut self, node: &'a AstNode<'a>, style: SpanStyle, lines: &mut Vec<Vec<PreviewSpan>>) {
        let value = node.data.borrow().value.clone();
        let current = |lines: &mut Vec<Vec<PreviewSpan>>| {
            if lines.is_empty() {
                lines.push(Vec::new());
            }
            lines.len() - 1
        };

        match value {
            NodeValue::Text(text) => {
                let i = current(lines);
                lines[i].push(span(&text, style));
            }
            NodeValue::Code(code) => {
                let i = current(lines);
                let style = SpanStyle { code: true, ..style };
                lines[i].push(span(&code.literal, style));
            }
            NodeValue::HtmlInline(html) => {
                let i = current(lines);
                lines[i].push(span(&html, style));
            }
            NodeValue::SoftBreak => {
                let i = current(lines);
                lines[i].push(span(" ", style));
            }
            NodeValue::LineBreak => lines.push(Vec::new()),
            NodeValue::FootnoteReference(_) => {
                self.footnote_refs += 1;
                let i = current(lines);
                let style = SpanStyle { superscript: true, ..style };
                lines[i].push(span(&format!("[{}]", self.footnote_refs), style));
            }
            NodeValue::Image(_) => {
                let i = current(lines);
                lines[i].push(marker("[image: "));
                self.inline_children(node, SpanStyle { link: true, ..style }, lines);
                let i = current(lines);
                lines[i].push(marker("]"));
            }
            NodeValue::Strong => self.inline_children(node, SpanStyle { strong: true, ..style }, lines),
            NodeValue::Emph => self.inline_children(node, SpanStyle { emphasis: true, ..style }, lines),
            NodeValue::Strikethrough => {
                self.inline_children(node, SpanStyle { strikethrough: true, ..style }, lines)
            }
            NodeValue::Superscript => {
                self.inline_children(node, SpanStyle { superscript: true, ..style }, lines)
            }
            NodeValue::Link(_) => self.inline_children(node, SpanStyle { link: true, ..style }, lines),
            _ => self.inline_children(node, style, lines),
        }
    }

    fn inline_children<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        style: SpanStyle,
        lines: &mut Vec<Vec<PreviewSpan>>,
    ) {
        for child in node.children() {
            self.inline(child, style, lines);
        }
    }
}

fn span(text: &str, style: SpanStyle) -> PreviewSpan {
    PreviewSpan {
        text: text.to_string(),
        style,
    }
}

fn marker(text: &str) -> PreviewSpan {
    span(
        text,
        SpanStyle {
            marker: true,
            ..SpanStyle::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[PreviewLine]) -> Vec<String> {
        lines.iter().map(PreviewLine::text).collect()
    }

    #[test]
    fn test_heading_and_paragraph() {
        let lines = preview("# Title\n\nSome **bold** text");
        assert_eq!(lines[0].kind, LineKind::Heading(1));
        assert_eq!(lines[0].text(), "Title");
        assert_eq!(lines[1].kind, LineKind::Blank);
        assert_eq!(lines[2].text(), "Some bold text");
        assert!(lines[2].spans.iter().any(|s| s.style.strong && s.text == "bold"));
    }

    #[test]
    fn test_lists_and_tasks() {
        let lines = preview("- one\n- two\n\n3. three\n4. four\n\n- [ ] open\n- [x] done");
        let texts = texts(&lines);
        assert!(texts.contains(&"• one".to_string()));
        assert!(texts.contains(&"3. three".to_string()));
        assert!(texts.contains(&"4. four".to_string()));
        assert!(texts.contains(&"[ ] open".to_string()));
        assert!(texts.contains(&"[x] done".to_string()));
    }

    #[test]
    fn test_quote_depth() {
        let lines = preview("> outer\n>\n> > inner");
        let inner = lines.iter().find(|l| l.text() == "inner").unwrap();
        assert_eq!(inner.quote_depth, 2);
        let outer = lines.iter().find(|l| l.text() == "outer").unwrap();
        assert_eq!(outer.quote_depth, 1);
    }

    #[test]
    fn test_table_rows() {
        let lines = preview("| a | b |\n| - | - |\n| 1 | 2 |");
        assert_eq!(lines[0].kind, LineKind::TableRow { header: true });
        assert_eq!(lines[0].text(), "a │ b");
        assert_eq!(lines[1].kind, LineKind::TableRow { header: false });
        assert_eq!(lines[1].text(), "1 │ 2");
    }

    #[test]
    fn test_code_block_and_rule() {
        let lines = preview("```\nlet x = 1;\nlet y = 2;\n```\n\n---");
        assert_eq!(lines[0].kind, LineKind::CodeBlock);
        assert_eq!(lines[1].text(), "let y = 2;");
        assert_eq!(lines.last().unwrap().kind, LineKind::Rule);
    }

    #[test]
    fn test_hard_break_splits_lines() {
        let lines = preview("first  \nsecond");
        assert_eq!(texts(&lines), vec!["first", "second"]);
    }

    #[test]
    fn test_footnotes_are_numbered() {
        let lines = preview("Text[^n]\n\n[^n]: Note");
        assert_eq!(lines[0].text(), "Text[1]");
        assert!(texts(&lines).contains(&"[1]: Note".to_string()));
    }

    #[test]
    fn test_malformed_input_still_renders() {
        let lines = preview("**unclosed [link](\n| table |\n");
        assert!(!lines.is_empty());
        assert!(preview("").is_empty());
    }
}
