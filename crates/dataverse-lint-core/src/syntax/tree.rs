//! Immutable tree snapshots.

use super::green::{GreenElement, GreenNode};
use super::kind::SyntaxKind;
use super::node::{SyntaxNode, TextRange};
use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// Byte offset where the problem was noticed.
    pub offset: usize,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error.
    #[must_use]
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Line start table for offset to line/column conversion.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the table for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// 1-indexed line and column of `offset`. Columns count characters.
    #[must_use]
    pub fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(text.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.starts[line];
        let column = text
            .get(start..offset)
            .map_or(offset - start, |s| s.chars().count());
        (line + 1, column + 1)
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// One parsed file: root node, path, source text and parse errors.
///
/// Snapshots are immutable. Rewrites return a new snapshot that shares every
/// unchanged subtree with this one.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    path: PathBuf,
    root: Arc<GreenNode>,
    source: Arc<str>,
    lines: Arc<LineIndex>,
    errors: Arc<[ParseError]>,
}

impl SyntaxTree {
    /// Creates a snapshot from a parsed root.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, root: GreenNode, errors: Vec<ParseError>) -> Self {
        Self::from_green(path.into(), Arc::new(root), errors.into())
    }

    fn from_green(path: PathBuf, root: Arc<GreenNode>, errors: Arc<[ParseError]>) -> Self {
        let source: Arc<str> = root.render().into();
        let lines = Arc::new(LineIndex::new(&source));
        Self {
            path,
            root,
            source,
            lines,
            errors,
        }
    }

    /// Path of the file this tree was parsed from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Positioned root node.
    #[must_use]
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(Arc::clone(&self.root))
    }

    /// Shared root green node.
    #[must_use]
    pub fn green_root(&self) -> &Arc<GreenNode> {
        &self.root
    }

    /// Full source text, reproduced from the tree.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.source
    }

    /// Shared source text.
    #[must_use]
    pub fn source(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    /// Parse errors recorded for this file.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// True when the root is a compilation unit.
    #[must_use]
    pub fn is_compilation_unit(&self) -> bool {
        self.root.kind() == SyntaxKind::CompilationUnit
    }

    /// 1-indexed line and column of `offset`.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        self.lines.line_col(&self.source, offset)
    }

    /// Builds a diagnostic location for `range`.
    #[must_use]
    pub fn location(&self, range: TextRange) -> Location {
        let (line, column) = self.line_col(range.start);
        Location::new(self.path.clone(), line, column).with_span(range.start, range.len())
    }

    /// Returns a new snapshot in which `target` is replaced by `replacement`.
    ///
    /// Only the ancestors of `target` are rebuilt. Returns `None` when
    /// `target` does not belong to this snapshot.
    #[must_use]
    pub fn replace(&self, target: &SyntaxNode, replacement: GreenNode) -> Option<Self> {
        let new_root = replace_in(&self.root, 0, target, Arc::new(replacement))?;
        Some(Self::from_green(
            self.path.clone(),
            new_root,
            Arc::clone(&self.errors),
        ))
    }
}

fn replace_in(
    green: &Arc<GreenNode>,
    offset: usize,
    target: &SyntaxNode,
    replacement: Arc<GreenNode>,
) -> Option<Arc<GreenNode>> {
    if offset == target.offset() && Arc::ptr_eq(green, target.green()) {
        return Some(replacement);
    }

    let target_end = target.offset() + target.green().full_len();
    let mut child_offset = offset;
    for (i, child) in green.children().iter().enumerate() {
        let child_end = child_offset + child.full_len();
        if let GreenElement::Node(node) = child {
            if child_offset <= target.offset() && target_end <= child_end {
                if let Some(new_child) =
                    replace_in(node, child_offset, target, Arc::clone(&replacement))
                {
                    let mut children = green.children().to_vec();
                    children[i] = GreenElement::Node(new_child);
                    return Some(Arc::new(GreenNode::new(green.kind(), children)));
                }
            }
        }
        if child_offset > target.offset() {
            break;
        }
        child_offset = child_end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::green::{GreenToken, Trivia};
    use crate::syntax::kind::{TokenKind, TriviaKind};

    fn statement(kw: &str) -> GreenNode {
        GreenNode::new(
            SyntaxKind::ExpressionStatement,
            vec![
                GreenNode::new(
                    SyntaxKind::IdentifierName,
                    vec![GreenToken::new(TokenKind::Identifier, kw).into()],
                )
                .into(),
                GreenToken::new(TokenKind::Punct, ";")
                    .with_trailing(vec![Trivia::new(TriviaKind::EndOfLine, "\n")])
                    .into(),
            ],
        )
    }

    fn tree() -> SyntaxTree {
        let root = GreenNode::new(
            SyntaxKind::CompilationUnit,
            vec![
                statement("a").into(),
                statement("b").into(),
                GreenToken::new(TokenKind::EndOfFile, "").into(),
            ],
        );
        SyntaxTree::new("test.cs", root, Vec::new())
    }

    #[test]
    fn line_col_is_one_indexed() {
        let t = tree();
        assert_eq!(t.text(), "a;\nb;\n");
        assert_eq!(t.line_col(0), (1, 1));
        assert_eq!(t.line_col(3), (2, 1));
        assert_eq!(t.line_col(4), (2, 2));
    }

    #[test]
    fn location_carries_span() {
        let t = tree();
        let loc = t.location(TextRange::new(3, 5));
        assert_eq!(loc.line, 2);
        assert_eq!(loc.offset, 3);
        assert_eq!(loc.length, 2);
    }

    #[test]
    fn replace_rebuilds_only_ancestors() {
        let t = tree();
        let root = t.root();
        let second = root.child_nodes().nth(1).unwrap();
        let first_green = Arc::clone(root.child_nodes().next().unwrap().green());

        let replaced = t.replace(&second, statement("c")).unwrap();
        assert_eq!(replaced.text(), "a;\nc;\n");
        assert_eq!(t.text(), "a;\nb;\n");

        let new_first = replaced.root().child_nodes().next().unwrap();
        assert!(Arc::ptr_eq(new_first.green(), &first_green));
    }

    #[test]
    fn replace_rejects_foreign_node() {
        let t = tree();
        let other = tree();
        let foreign = other.root().child_nodes().next().unwrap();
        assert!(t.replace(&foreign, statement("c")).is_none());
    }
}
