//! Hierarchical path resolution.
//!
//! Items are walked in document order with an explicit table context:
//! headers replace the context, entries inherit it. Each array-of-tables
//! header gets a zero-based occurrence index, counted per fully resolved
//! parent path, so `[[a.b]]` under the second `[[a]]` restarts at `#0`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::syntax::keys::{is_bare, split_dotted};
use crate::syntax::{LineSpan, RawItem, RawItemKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) if is_bare(key) => f.write_str(key),
            PathSegment::Key(key) => {
                let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\"", escaped)
            }
            PathSegment::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Dotted path of a structural item; the document root is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TomlPath {
    segments: Vec<PathSegment>,
}

impl TomlPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: keys.into_iter().map(|k| PathSegment::Key(k.into())).collect(),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn join(&self, keys: &[String]) -> Self {
        let mut path = self.clone();
        for key in keys {
            path.push_key(key.clone());
        }
        path
    }

    pub fn starts_with(&self, prefix: &TomlPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Number of key segments; occurrence indices do not count.
    pub fn key_depth(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Key(_)))
            .count()
    }

    /// Last key segment, if any.
    pub fn name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            PathSegment::Key(key) => Some(key.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// Path with occurrence indices dropped, as used in TOML headers.
    pub fn header_form(&self) -> String {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Key(_)))
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn parse(text: &str) -> Self {
        let segments = split_dotted(text)
            .into_iter()
            .map(|part| {
                let index = part
                    .name
                    .strip_prefix('#')
                    .filter(|_| !part.quoted)
                    .and_then(|digits| digits.parse::<usize>().ok());
                match index {
                    Some(index) => PathSegment::Index(index),
                    None => PathSegment::Key(part.name),
                }
            })
            .collect();
        Self { segments }
    }
}

impl fmt::Display for TomlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for TomlPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for TomlPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Table,
    ArrayTableElement(usize),
    KeyValue,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Table => "table",
            ItemKind::ArrayTableElement(_) => "array_table",
            ItemKind::KeyValue => "key_value",
        }
    }

    pub fn is_table(&self) -> bool {
        !matches!(self, ItemKind::KeyValue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub path: TomlPath,
    pub kind: ItemKind,
    pub span: LineSpan,
}

/// The table entries currently belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableContext {
    path: TomlPath,
}

impl TableContext {
    pub fn path(&self) -> &TomlPath {
        &self.path
    }
}

/// How many elements each array of tables has seen so far.
#[derive(Debug, Clone, Default)]
pub struct Occurrences {
    counts: HashMap<TomlPath, usize>,
}

impl Occurrences {
    fn current(&self, path: &TomlPath) -> Option<usize> {
        self.counts.get(path).map(|count| count - 1)
    }

    fn next(mut self, path: &TomlPath) -> (Self, usize) {
        let count = self.counts.entry(path.clone()).or_insert(0);
        *count += 1;
        let index = *count - 1;
        (self, index)
    }
}

pub fn resolve_paths(items: &[RawItem]) -> Vec<ResolvedItem> {
    let mut resolved = Vec::with_capacity(items.len());
    items.iter().fold(
        (TableContext::default(), Occurrences::default()),
        |(context, occurrences), item| {
            let (context, occurrences, item) = resolve_item(context, occurrences, item);
            resolved.push(item);
            (context, occurrences)
        },
    );
    resolved
}

pub fn resolve_item(
    context: TableContext,
    occurrences: Occurrences,
    item: &RawItem,
) -> (TableContext, Occurrences, ResolvedItem) {
    match item.kind {
        RawItemKind::Entry => {
            let resolved = ResolvedItem {
                path: context.path.join(&item.key),
                kind: ItemKind::KeyValue,
                span: item.span,
            };
            (context, occurrences, resolved)
        }
        RawItemKind::Header => {
            let path = header_prefix(&occurrences, &item.key);
            let resolved = ResolvedItem {
                path: path.clone(),
                kind: ItemKind::Table,
                span: item.span,
            };
            (TableContext { path }, occurrences, resolved)
        }
        RawItemKind::ArrayHeader => {
            let mut path = header_prefix(&occurrences, &item.key);
            let (occurrences, index) = occurrences.next(&path);
            path.push_index(index);
            let resolved = ResolvedItem {
                path: path.clone(),
                kind: ItemKind::ArrayTableElement(index),
                span: item.span,
            };
            (TableContext { path }, occurrences, resolved)
        }
    }
}

/// Resolves header keys, descending into the current element of every
/// array of tables named along the way. The final key is never indexed
/// here; array headers add their own index.
fn header_prefix(occurrences: &Occurrences, keys: &[String]) -> TomlPath {
    let mut path = TomlPath::root();
    for (i, key) in keys.iter().enumerate() {
        path.push_key(key.clone());
        let is_last = i + 1 == keys.len();
        if !is_last {
            if let Some(index) = occurrences.current(&path) {
                path.push_index(index);
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: RawItemKind, key: &str, line: usize) -> RawItem {
        RawItem {
            kind,
            key: split_dotted(key).into_iter().map(|p| p.name).collect(),
            span: LineSpan::single(line),
        }
    }

    fn paths(items: &[RawItem]) -> Vec<String> {
        resolve_paths(items)
            .into_iter()
            .map(|r| r.path.to_string())
            .collect()
    }

    #[test]
    fn test_root_entries() {
        let items = vec![raw(RawItemKind::Entry, "name", 1), raw(RawItemKind::Entry, "a.b", 2)];
        assert_eq!(paths(&items), vec!["name", "a.b"]);
    }

    #[test]
    fn test_table_context_inherited() {
        let items = vec![
            raw(RawItemKind::Header, "project.dependencies", 1),
            raw(RawItemKind::Entry, "requests", 2),
            raw(RawItemKind::Header, "tool", 3),
            raw(RawItemKind::Entry, "x", 4),
        ];
        assert_eq!(
            paths(&items),
            vec![
                "project.dependencies",
                "project.dependencies.requests",
                "tool",
                "tool.x"
            ]
        );
    }

    #[test]
    fn test_array_tables_indexed() {
        let items = vec![
            raw(RawItemKind::ArrayHeader, "servers", 1),
            raw(RawItemKind::Entry, "host", 2),
            raw(RawItemKind::ArrayHeader, "servers", 3),
            raw(RawItemKind::Entry, "host", 4),
        ];
        let resolved = resolve_paths(&items);

        assert_eq!(resolved[0].path.to_string(), "servers.#0");
        assert_eq!(resolved[0].kind, ItemKind::ArrayTableElement(0));
        assert_eq!(resolved[1].path.to_string(), "servers.#0.host");
        assert_eq!(resolved[2].path.to_string(), "servers.#1");
        assert_eq!(resolved[2].kind, ItemKind::ArrayTableElement(1));
        assert_eq!(resolved[3].path.to_string(), "servers.#1.host");
    }

    #[test]
    fn test_nested_array_tables_restart_per_parent() {
        let items = vec![
            raw(RawItemKind::ArrayHeader, "fruits", 1),
            raw(RawItemKind::ArrayHeader, "fruits.varieties", 2),
            raw(RawItemKind::ArrayHeader, "fruits.varieties", 3),
            raw(RawItemKind::Header, "fruits.physical", 4),
            raw(RawItemKind::ArrayHeader, "fruits", 5),
            raw(RawItemKind::ArrayHeader, "fruits.varieties", 6),
        ];
        assert_eq!(
            paths(&items),
            vec![
                "fruits.#0",
                "fruits.#0.varieties.#0",
                "fruits.#0.varieties.#1",
                "fruits.#0.physical",
                "fruits.#1",
                "fruits.#1.varieties.#0",
            ]
        );
    }

    #[test]
    fn test_separate_arrays_count_independently() {
        let items = vec![
            raw(RawItemKind::ArrayHeader, "a", 1),
            raw(RawItemKind::ArrayHeader, "b", 2),
            raw(RawItemKind::ArrayHeader, "a", 3),
        ];
        assert_eq!(paths(&items), vec!["a.#0", "b.#0", "a.#1"]);
    }

    #[test]
    fn test_context_threading_is_explicit() {
        let header = raw(RawItemKind::Header, "hatch", 1);
        let entry = raw(RawItemKind::Entry, "foo", 2);

        let (context, occurrences, _) =
            resolve_item(TableContext::default(), Occurrences::default(), &header);
        assert_eq!(context.path().to_string(), "hatch");

        let (next, _, resolved) = resolve_item(context.clone(), occurrences, &entry);
        assert_eq!(next, context);
        assert_eq!(resolved.path.to_string(), "hatch.foo");
    }

    #[test]
    fn test_path_display_quotes_keys() {
        let path = TomlPath::from_keys(["site", "google.com"]);
        assert_eq!(path.to_string(), "site.\"google.com\"");
        assert_eq!(TomlPath::parse("site.\"google.com\""), path);
    }

    #[test]
    fn test_path_parse_indices() {
        let path = TomlPath::parse("servers.#1.host");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("servers".into()),
                PathSegment::Index(1),
                PathSegment::Key("host".into()),
            ]
        );
        assert_eq!(path.key_depth(), 2);
        assert_eq!(path.name(), Some("host"));
        assert_eq!(path.header_form(), "servers.host");

        let quoted = TomlPath::parse("\"#1\"");
        assert_eq!(quoted.segments(), &[PathSegment::Key("#1".into())]);
    }

    #[test]
    fn test_path_root() {
        let root = TomlPath::parse("");
        assert!(root.is_root());
        assert_eq!(root.to_string(), "");
        assert_eq!(root.name(), None);
        assert!(TomlPath::parse("a.b").starts_with(&root));
    }

    #[test]
    fn test_path_starts_with() {
        let parent = TomlPath::parse("tool.hatch");
        assert!(TomlPath::parse("tool.hatch.build").starts_with(&parent));
        assert!(!TomlPath::parse("tool.hatchling").starts_with(&parent));
    }

    #[test]
    fn test_path_serializes_as_string() {
        let json = serde_json::to_string(&TomlPath::parse("a.#0.b")).unwrap();
        assert_eq!(json, "\"a.#0.b\"");
    }
}
