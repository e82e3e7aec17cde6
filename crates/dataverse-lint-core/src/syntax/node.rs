//! Positioned views over green elements.

use super::green::{trivia_len, GreenElement, GreenNode, GreenToken, Trivia};
use super::kind::{SyntaxKind, TokenKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Half-open byte range `[start, end)` into a file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TextRange {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl TextRange {
    /// Creates a range.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a range from start and length.
    #[must_use]
    pub fn at(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    /// Byte length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the range covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains_range(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the two ranges share at least one byte.
    #[must_use]
    pub fn overlaps(&self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A green node paired with its absolute offset.
///
/// Cheap to clone. Offsets are computed while descending, so a view is only
/// meaningful relative to the tree it was obtained from.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    green: Arc<GreenNode>,
    offset: usize,
}

/// A green token paired with its absolute offset (of its leading trivia).
#[derive(Debug, Clone)]
pub struct SyntaxToken {
    green: Arc<GreenToken>,
    offset: usize,
}

/// A positioned child: either a node or a token.
#[derive(Debug, Clone)]
pub enum SyntaxElement {
    /// Interior node.
    Node(SyntaxNode),
    /// Leaf token.
    Token(SyntaxToken),
}

impl SyntaxElement {
    /// Returns the node, if this is one.
    #[must_use]
    pub fn into_node(self) -> Option<SyntaxNode> {
        match self {
            Self::Node(n) => Some(n),
            Self::Token(_) => None,
        }
    }

    /// Returns the token, if this is one.
    #[must_use]
    pub fn into_token(self) -> Option<SyntaxToken> {
        match self {
            Self::Token(t) => Some(t),
            Self::Node(_) => None,
        }
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && Arc::ptr_eq(&self.green, &other.green)
    }
}

impl Eq for SyntaxNode {}

impl SyntaxNode {
    /// Positions `green` at `offset`.
    #[must_use]
    pub fn new_root(green: Arc<GreenNode>) -> Self {
        Self { green, offset: 0 }
    }

    pub(crate) fn at(green: Arc<GreenNode>, offset: usize) -> Self {
        Self { green, offset }
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    /// Underlying green node.
    #[must_use]
    pub fn green(&self) -> &Arc<GreenNode> {
        &self.green
    }

    /// Offset of the node's first byte, leading trivia included.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Range including outer trivia.
    #[must_use]
    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.offset, self.green.full_len())
    }

    /// Range excluding outer leading and trailing trivia.
    #[must_use]
    pub fn span(&self) -> TextRange {
        let full = self.full_span();
        match (self.green.first_token(), self.green.last_token()) {
            (Some(first), Some(last)) => TextRange::new(
                full.start + trivia_len(first.leading()),
                full.end - trivia_len(last.trailing()),
            ),
            _ => TextRange::at(full.start, 0),
        }
    }

    /// Positioned children in order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxElement> + '_ {
        let mut offset = self.offset;
        self.green.children().iter().map(move |child| {
            let at = offset;
            offset += child.full_len();
            match child {
                GreenElement::Node(n) => SyntaxElement::Node(SyntaxNode::at(Arc::clone(n), at)),
                GreenElement::Token(t) => SyntaxElement::Token(SyntaxToken {
                    green: Arc::clone(t),
                    offset: at,
                }),
            }
        })
    }

    /// Child nodes, skipping tokens.
    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.children().filter_map(SyntaxElement::into_node)
    }

    /// Child tokens, skipping nodes.
    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.children().filter_map(SyntaxElement::into_token)
    }

    /// First child node of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.child_nodes().find(|n| n.kind() == kind)
    }

    /// All child nodes of the given kind.
    #[must_use]
    pub fn children_of_kind(&self, kind: SyntaxKind) -> Vec<SyntaxNode> {
        self.child_nodes().filter(|n| n.kind() == kind).collect()
    }

    /// First child node satisfying `pred`.
    #[must_use]
    pub fn find_child(&self, pred: impl Fn(SyntaxKind) -> bool) -> Option<SyntaxNode> {
        self.child_nodes().find(|n| pred(n.kind()))
    }

    /// First direct child token whose text is `text`.
    #[must_use]
    pub fn token(&self, text: &str) -> Option<SyntaxToken> {
        self.child_tokens().find(|t| t.text() == text)
    }

    /// True if a direct child token has the given text.
    #[must_use]
    pub fn has_token(&self, text: &str) -> bool {
        self.green.children().iter().any(|c| match c {
            GreenElement::Token(t) => t.text() == text,
            GreenElement::Node(_) => false,
        })
    }

    /// First direct identifier token.
    #[must_use]
    pub fn identifier(&self) -> Option<SyntaxToken> {
        self.child_tokens()
            .find(|t| t.kind() == TokenKind::Identifier)
    }

    /// First token in document order.
    #[must_use]
    pub fn first_token(&self) -> Option<SyntaxToken> {
        let green = self.green.first_token()?;
        Some(SyntaxToken {
            green: Arc::clone(green),
            offset: self.offset,
        })
    }

    /// Last token in document order.
    #[must_use]
    pub fn last_token(&self) -> Option<SyntaxToken> {
        let green = self.green.last_token()?;
        Some(SyntaxToken {
            offset: self.offset + self.green.full_len() - green.full_len(),
            green: Arc::clone(green),
        })
    }

    /// Leading trivia of the first token.
    #[must_use]
    pub fn leading_trivia(&self) -> &[Trivia] {
        match self.green.first_token() {
            Some(t) => t.leading(),
            None => &[],
        }
    }

    /// Trailing trivia of the last token.
    #[must_use]
    pub fn trailing_trivia(&self) -> &[Trivia] {
        match self.green.last_token() {
            Some(t) => t.trailing(),
            None => &[],
        }
    }

    /// Source text without outer trivia.
    #[must_use]
    pub fn text(&self) -> String {
        self.green.without_outer_trivia().render()
    }

    /// Source text including outer trivia.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.green.render()
    }

    /// Pre-order traversal of this node and every node below it.
    #[must_use]
    pub fn descendants(&self) -> Descendants {
        Descendants {
            stack: vec![self.clone()],
        }
    }

    /// Deepest-first search for the outermost node whose span equals `range`
    /// and whose kind satisfies `pred`.
    #[must_use]
    pub fn find_node(
        &self,
        range: TextRange,
        pred: impl Fn(&SyntaxNode) -> bool,
    ) -> Option<SyntaxNode> {
        let mut current = self.clone();
        loop {
            if current.span() == range && pred(&current) {
                return Some(current);
            }
            let next = current
                .child_nodes()
                .find(|c| c.full_span().contains_range(range) && !c.full_span().is_empty())?;
            current = next;
        }
    }
}

/// Pre-order node iterator backed by an explicit stack.
#[derive(Debug)]
pub struct Descendants {
    stack: Vec<SyntaxNode>,
}

impl Iterator for Descendants {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<SyntaxNode> = node.child_nodes().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

impl SyntaxToken {
    /// Token kind.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.green.kind()
    }

    /// Token text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.green.text()
    }

    /// Underlying green token.
    #[must_use]
    pub fn green(&self) -> &Arc<GreenToken> {
        &self.green
    }

    /// Leading trivia.
    #[must_use]
    pub fn leading(&self) -> &[Trivia] {
        self.green.leading()
    }

    /// Trailing trivia.
    #[must_use]
    pub fn trailing(&self) -> &[Trivia] {
        self.green.trailing()
    }

    /// Range of the token text only.
    #[must_use]
    pub fn span(&self) -> TextRange {
        TextRange::at(
            self.offset + trivia_len(self.green.leading()),
            self.green.text().len(),
        )
    }

    /// Range including trivia.
    #[must_use]
    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.offset, self.green.full_len())
    }
}
