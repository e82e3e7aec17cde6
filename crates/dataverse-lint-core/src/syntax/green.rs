//! Immutable, position-free tree storage.
//!
//! Green elements know their kind, text and width but not where they sit in
//! a file. They are shared behind `Arc`, so a rewritten snapshot reuses every
//! subtree it did not touch.

use super::kind::{SyntaxKind, TokenKind, TriviaKind};
use std::sync::Arc;

/// A piece of non-semantic source text attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    /// What this piece is.
    pub kind: TriviaKind,
    /// Exact source text.
    pub text: String,
}

impl Trivia {
    /// Creates a trivia piece.
    #[must_use]
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates a single space.
    #[must_use]
    pub fn space() -> Self {
        Self::new(TriviaKind::Whitespace, " ")
    }

    /// Returns true for comments of any flavour.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::LineComment | TriviaKind::BlockComment | TriviaKind::DocComment
        )
    }
}

/// Total byte length of a trivia list.
#[must_use]
pub fn trivia_len(trivia: &[Trivia]) -> usize {
    trivia.iter().map(|t| t.text.len()).sum()
}

/// A leaf: one lexical token with its surrounding trivia.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GreenToken {
    kind: TokenKind,
    text: String,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
}

impl GreenToken {
    /// Creates a token without trivia.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// Replaces the leading trivia.
    #[must_use]
    pub fn with_leading(mut self, leading: Vec<Trivia>) -> Self {
        self.leading = leading;
        self
    }

    /// Replaces the trailing trivia.
    #[must_use]
    pub fn with_trailing(mut self, trailing: Vec<Trivia>) -> Self {
        self.trailing = trailing;
        self
    }

    /// Token kind.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Token text without trivia.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Trivia before the token.
    #[must_use]
    pub fn leading(&self) -> &[Trivia] {
        &self.leading
    }

    /// Trivia after the token, up to and including the first line break.
    #[must_use]
    pub fn trailing(&self) -> &[Trivia] {
        &self.trailing
    }

    /// Width including trivia.
    #[must_use]
    pub fn full_len(&self) -> usize {
        trivia_len(&self.leading) + self.text.len() + trivia_len(&self.trailing)
    }

    fn render_into(&self, out: &mut String) {
        for t in &self.leading {
            out.push_str(&t.text);
        }
        out.push_str(&self.text);
        for t in &self.trailing {
            out.push_str(&t.text);
        }
    }
}

/// A child slot of a green node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GreenElement {
    /// Interior node.
    Node(Arc<GreenNode>),
    /// Leaf token.
    Token(Arc<GreenToken>),
}

impl GreenElement {
    /// Width including trivia.
    #[must_use]
    pub fn full_len(&self) -> usize {
        match self {
            Self::Node(n) => n.full_len(),
            Self::Token(t) => t.full_len(),
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        Self::Node(Arc::new(node))
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        Self::Token(Arc::new(token))
    }
}

/// An interior node: kind plus ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GreenNode {
    kind: SyntaxKind,
    children: Vec<GreenElement>,
    full_len: usize,
}

impl GreenNode {
    /// Creates a node, caching its width.
    #[must_use]
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        let full_len = children.iter().map(GreenElement::full_len).sum();
        Self {
            kind,
            children,
            full_len,
        }
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[GreenElement] {
        &self.children
    }

    /// Width including all trivia.
    #[must_use]
    pub fn full_len(&self) -> usize {
        self.full_len
    }

    /// First token in document order.
    #[must_use]
    pub fn first_token(&self) -> Option<&Arc<GreenToken>> {
        self.children.iter().find_map(|c| match c {
            GreenElement::Token(t) => Some(t),
            GreenElement::Node(n) => n.first_token(),
        })
    }

    /// Last token in document order.
    #[must_use]
    pub fn last_token(&self) -> Option<&Arc<GreenToken>> {
        self.children.iter().rev().find_map(|c| match c {
            GreenElement::Token(t) => Some(t),
            GreenElement::Node(n) => n.last_token(),
        })
    }

    /// Returns a copy whose first token carries `leading` and whose last token
    /// carries `trailing`. Nodes without tokens are returned unchanged.
    #[must_use]
    pub fn with_outer_trivia(&self, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> Self {
        let with_leading = self.map_first_token(&|t| t.clone().with_leading(leading.clone()));
        with_leading.map_last_token(&|t| t.clone().with_trailing(trailing.clone()))
    }

    /// Returns a copy with the outer leading and trailing trivia removed.
    #[must_use]
    pub fn without_outer_trivia(&self) -> Self {
        self.with_outer_trivia(Vec::new(), Vec::new())
    }

    fn map_first_token(&self, f: &dyn Fn(&GreenToken) -> GreenToken) -> Self {
        let mut children = self.children.clone();
        for child in &mut children {
            match child {
                GreenElement::Token(t) => {
                    *child = GreenElement::Token(Arc::new(f(t)));
                    return Self::new(self.kind, children);
                }
                GreenElement::Node(n) if n.first_token().is_some() => {
                    *child = GreenElement::Node(Arc::new(n.map_first_token(f)));
                    return Self::new(self.kind, children);
                }
                GreenElement::Node(_) => {}
            }
        }
        self.clone()
    }

    fn map_last_token(&self, f: &dyn Fn(&GreenToken) -> GreenToken) -> Self {
        let mut children = self.children.clone();
        for child in children.iter_mut().rev() {
            match child {
                GreenElement::Token(t) => {
                    *child = GreenElement::Token(Arc::new(f(t)));
                    return Self::new(self.kind, children);
                }
                GreenElement::Node(n) if n.last_token().is_some() => {
                    *child = GreenElement::Node(Arc::new(n.map_last_token(f)));
                    return Self::new(self.kind, children);
                }
                GreenElement::Node(_) => {}
            }
        }
        self.clone()
    }

    /// Renders the full text, trivia included.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.full_len);
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        for child in &self.children {
            match child {
                GreenElement::Node(n) => n.render_into(out),
                GreenElement::Token(t) => t.render_into(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> GreenToken {
        GreenToken::new(TokenKind::Identifier, text)
    }

    #[test]
    fn full_len_counts_trivia() {
        let tok = ident("x")
            .with_leading(vec![Trivia::new(TriviaKind::Whitespace, "  ")])
            .with_trailing(vec![Trivia::new(TriviaKind::EndOfLine, "\n")]);
        assert_eq!(tok.full_len(), 4);

        let node = GreenNode::new(SyntaxKind::IdentifierName, vec![tok.into()]);
        assert_eq!(node.full_len(), 4);
        assert_eq!(node.render(), "  x\n");
    }

    #[test]
    fn with_outer_trivia_touches_only_edge_tokens() {
        let node = GreenNode::new(
            SyntaxKind::ReturnStatement,
            vec![
                ident("return")
                    .with_leading(vec![Trivia::new(TriviaKind::Whitespace, "    ")])
                    .into(),
                GreenToken::new(TokenKind::Punct, ";")
                    .with_trailing(vec![Trivia::new(TriviaKind::EndOfLine, "\n")])
                    .into(),
            ],
        );

        let stripped = node.without_outer_trivia();
        assert_eq!(stripped.render(), "return;");

        let moved = stripped.with_outer_trivia(
            vec![Trivia::new(TriviaKind::Whitespace, "\t")],
            vec![Trivia::space()],
        );
        assert_eq!(moved.render(), "\treturn; ");
    }
}
