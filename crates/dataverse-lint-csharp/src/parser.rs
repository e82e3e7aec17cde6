//! Error-tolerant recursive-descent parser for C#.
//!
//! The parser never fails: malformed input produces [`ParseError`]s plus
//! `Error` nodes wrapping the tokens it could not place, so the tree still
//! reproduces the source byte for byte. Ambiguities (casts, generics, local
//! declarations) are settled with index-based lookahead over the token
//! buffer before anything is consumed.

mod declarations;
mod expressions;
mod statements;
mod types;

use crate::lexer;
use dataverse_lint_core::syntax::{
    trivia_len, GreenElement, GreenNode, GreenToken, ParseError, SyntaxKind, SyntaxTree,
    TokenKind,
};
use std::path::Path;
use std::sync::Arc;

type Children = Vec<GreenElement>;

/// Parses `source` into a syntax tree for `path`.
#[must_use]
pub fn parse(path: &Path, source: &str) -> SyntaxTree {
    let mut parser = Parser::new(lexer::tokenize(source));
    let root = parser.compilation_unit();
    tracing::trace!(
        path = %path.display(),
        errors = parser.errors.len(),
        "Parsed file"
    );
    SyntaxTree::new(path, root, parser.errors)
}

pub(crate) struct Parser {
    tokens: Vec<Arc<GreenToken>>,
    pos: usize,
    /// Full offset (leading trivia included) of `tokens[pos]`.
    offset: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(tokens: Vec<GreenToken>) -> Self {
        let mut tokens: Vec<Arc<GreenToken>> = tokens.into_iter().map(Arc::new).collect();
        if tokens
            .last()
            .map_or(true, |t| t.kind() != TokenKind::EndOfFile)
        {
            tokens.push(Arc::new(GreenToken::new(TokenKind::EndOfFile, "")));
        }
        Self {
            tokens,
            pos: 0,
            offset: 0,
            errors: Vec::new(),
        }
    }

    fn token_at(&self, index: usize) -> &GreenToken {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.token_at(index).kind()
    }

    fn text_at(&self, index: usize) -> &str {
        self.token_at(index).text()
    }

    fn nth_text(&self, n: usize) -> &str {
        self.text_at(self.pos + n)
    }

    fn current(&self) -> Arc<GreenToken> {
        Arc::clone(&self.tokens[self.pos])
    }

    fn current_kind(&self) -> TokenKind {
        self.kind_at(self.pos)
    }

    fn at(&self, text: &str) -> bool {
        self.text_at(self.pos) == text
    }

    fn at_identifier(&self) -> bool {
        self.current_kind() == TokenKind::Identifier
    }

    /// True when the identifier `word` is current (contextual keywords).
    fn at_word(&self, word: &str) -> bool {
        self.at_identifier() && self.at(word)
    }

    fn at_eof(&self) -> bool {
        self.current_kind() == TokenKind::EndOfFile
    }

    /// True when tokens `index` and `index + 1` touch with no trivia between.
    fn joined(&self, index: usize) -> bool {
        self.token_at(index).trailing().is_empty() && self.token_at(index + 1).leading().is_empty()
    }

    /// Consumes the current token. The end-of-file token is never consumed
    /// past, so callers must check before bumping it.
    fn bump(&mut self) -> GreenElement {
        let token = self.current();
        if token.kind() != TokenKind::EndOfFile {
            self.pos += 1;
            self.offset += token.full_len();
        }
        GreenElement::Token(token)
    }

    fn push(&mut self, children: &mut Children) {
        let token = self.bump();
        children.push(token);
    }

    /// Consumes the current token as a keyword. Contextual keywords lex as
    /// identifiers; retagging them here keeps `identifier()` on declarations
    /// pointing at the declared name.
    fn push_keyword(&mut self, children: &mut Children) {
        let token = self.current();
        if token.kind() != TokenKind::Identifier {
            self.push(children);
            return;
        }
        let keyword = GreenToken::new(TokenKind::Keyword, token.text())
            .with_leading(token.leading().to_vec())
            .with_trailing(token.trailing().to_vec());
        self.pos += 1;
        self.offset += token.full_len();
        children.push(keyword.into());
    }

    fn eat(&mut self, text: &str, children: &mut Children) -> bool {
        if self.at(text) && !self.at_eof() {
            self.push(children);
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str, children: &mut Children) -> bool {
        if self.eat(text, children) {
            return true;
        }
        self.error(format!("expected `{text}`"));
        false
    }

    fn expect_identifier(&mut self, children: &mut Children) -> bool {
        if self.at_identifier() {
            self.push(children);
            return true;
        }
        self.error("expected identifier");
        false
    }

    fn error(&mut self, message: impl Into<String>) {
        let offset = self.offset + trivia_len(self.tokens[self.pos].leading());
        if self.errors.last().is_some_and(|e| e.offset == offset) {
            return;
        }
        self.errors.push(ParseError::new(offset, message));
    }

    /// Records an error and wraps the current token in an `Error` node so
    /// loops always make progress.
    fn skip_token(&mut self, message: &str, children: &mut Children) {
        self.error(message);
        if !self.at_eof() {
            let token = self.bump();
            children.push(GreenNode::new(SyntaxKind::Error, vec![token]).into());
        }
    }

    /// Index just past the `close` matching the `open` at `index`.
    fn skip_balanced(&self, index: usize, open: &str, close: &str) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = index;
        loop {
            if self.kind_at(i) == TokenKind::EndOfFile {
                return None;
            }
            let text = self.text_at(i);
            if text == open {
                depth += 1;
            } else if text == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            i += 1;
        }
    }

    fn compilation_unit(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.namespace_body(&mut children, false);
        children.push(self.bump());
        GreenNode::new(SyntaxKind::CompilationUnit, children)
    }
}

fn node(kind: SyntaxKind, children: Children) -> GreenNode {
    GreenNode::new(kind, children)
}
