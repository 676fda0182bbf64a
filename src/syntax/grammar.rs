use tree_sitter::Node;

use crate::error::{Result, TomlDocError};
use crate::syntax::{split_dotted, LineHint, LineSpan, RawItem, RawItemKind, StructuralParser, SyntaxView};

/// Tree-sitter backed TOML parser.
///
/// Comments are kept by the grammar as `comment` nodes, so the view can tell
/// a `#:` line apart from the same characters inside a multi-line string.
/// Documents that tree-sitter accepts are additionally checked with the
/// `toml` crate, which rejects duplicate keys and redefined tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlGrammar;

impl TomlGrammar {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        "toml"
    }

    pub fn file_extensions(&self) -> &[&'static str] {
        &["toml"]
    }

    pub fn language(&self) -> tree_sitter::Language {
        tree_sitter_toml_ng::LANGUAGE.into()
    }

    fn parse_tree(&self, source: &str) -> Result<tree_sitter::Tree> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language())
            .map_err(|e| TomlDocError::Grammar(e.to_string()))?;

        parser
            .parse(source, None)
            .ok_or_else(|| TomlDocError::Grammar("Failed to parse source".to_string()))
    }
}

impl StructuralParser for TomlGrammar {
    fn parse(&self, source: &str) -> Result<SyntaxView> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(first_error(root, source));
        }
        check_semantics(source)?;

        let lines: Vec<&str> = source
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        let line_count = if source.ends_with('\n') {
            lines.len() - 1
        } else {
            lines.len()
        };

        let mut view = SyntaxView {
            hints: vec![LineHint::Free; line_count],
            items: Vec::new(),
        };

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "pair" => {
                    let item = entry_item(node, source, &lines)?;
                    mark(&mut view.hints, item.span, LineHint::Content);
                    view.items.push(item);
                }
                "table" | "table_array_element" => {
                    collect_table(node, source, &lines, &mut view)?;
                }
                _ => {}
            }
        }

        mark_comments(root, &lines, &mut view.hints);

        Ok(view)
    }
}

fn collect_table(node: Node, source: &str, lines: &[&str], view: &mut SyntaxView) -> Result<()> {
    let kind = if node.kind() == "table_array_element" {
        RawItemKind::ArrayHeader
    } else {
        RawItemKind::Header
    };
    let key_node = key_child(node)?;
    let header_line = key_node.start_position().row + 1;
    mark(&mut view.hints, LineSpan::single(header_line), LineHint::Content);

    let header_index = view.items.len();
    view.items.push(RawItem {
        kind,
        key: key_segments(key_node, source),
        span: LineSpan::single(header_line),
    });

    let mut body_end = header_line;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "pair" {
            let item = entry_item(child, source, lines)?;
            mark(&mut view.hints, item.span, LineHint::Content);
            body_end = body_end.max(item.span.end);
            view.items.push(item);
        }
    }

    view.items[header_index].span = LineSpan::new(header_line, body_end);
    Ok(())
}

fn entry_item(node: Node, source: &str, lines: &[&str]) -> Result<RawItem> {
    let key_node = key_child(node)?;
    let start = node.start_position().row;
    let end = node.end_position();

    // The grammar folds the line ending into the pair.
    let mut end_row = if end.column == 0 && end.row > start {
        end.row - 1
    } else {
        end.row
    };
    while end_row > start && lines.get(end_row).is_none_or(|l| l.trim().is_empty()) {
        end_row -= 1;
    }

    Ok(RawItem {
        kind: RawItemKind::Entry,
        key: key_segments(key_node, source),
        span: LineSpan::new(start + 1, end_row + 1),
    })
}

fn key_child(node: Node) -> Result<Node> {
    let mut cursor = node.walk();
    let key = node
        .named_children(&mut cursor)
        .find(|child| matches!(child.kind(), "bare_key" | "quoted_key" | "dotted_key"));

    key.ok_or_else(|| {
        let pos = node.start_position();
        TomlDocError::syntax_at(pos.row, pos.column, format!("{} without a key", node.kind()))
    })
}

fn key_segments(node: Node, source: &str) -> Vec<String> {
    let text = node.utf8_text(source.as_bytes()).unwrap_or("");
    split_dotted(text).into_iter().map(|part| part.name).collect()
}

fn mark(hints: &mut [LineHint], span: LineSpan, hint: LineHint) {
    for line in span.start..=span.end {
        if let Some(slot) = hints.get_mut(line - 1) {
            *slot = hint;
        }
    }
}

fn mark_comments(root: Node, lines: &[&str], hints: &mut [LineHint]) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "comment" {
            let pos = node.start_position();
            let leads_line = lines
                .get(pos.row)
                .and_then(|line| line.get(..pos.column))
                .is_some_and(|prefix| prefix.trim().is_empty());
            if leads_line {
                mark(hints, LineSpan::single(pos.row + 1), LineHint::Comment);
            }
            continue;
        }

        let mut cursor = node.walk();
        stack.extend(node.children(&mut cursor));
    }
}

fn first_error(root: Node, source: &str) -> TomlDocError {
    let mut found: Option<Node> = None;
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            if found.is_none_or(|f| node.start_byte() < f.start_byte()) {
                found = Some(node);
            }
            continue;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }
    }

    match found {
        Some(node) if node.is_missing() => {
            let pos = node.start_position();
            TomlDocError::syntax_at(pos.row, pos.column, format!("missing `{}`", node.kind()))
        }
        Some(node) => {
            let pos = node.start_position();
            let text = node.utf8_text(source.as_bytes()).unwrap_or("");
            let snippet: String = text.lines().next().unwrap_or("").chars().take(24).collect();
            TomlDocError::syntax_at(pos.row, pos.column, format!("unexpected `{}`", snippet))
        }
        None => TomlDocError::syntax_at(0, 0, "malformed document"),
    }
}

fn check_semantics(source: &str) -> Result<()> {
    match source.parse::<toml::Table>() {
        Ok(_) => Ok(()),
        Err(e) => {
            let offset = e.span().map(|s| s.start).unwrap_or(0).min(source.len());
            let before = &source.as_bytes()[..offset];
            let row = before.iter().filter(|b| **b == b'\n').count();
            let line_start = before
                .iter()
                .rposition(|b| *b == b'\n')
                .map(|i| i + 1)
                .unwrap_or(0);
            Err(TomlDocError::syntax_at(
                row,
                offset - line_start,
                e.message().to_string(),
            ))
        }
    }
}
