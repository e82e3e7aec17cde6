//! Full-fidelity syntax tree.
//!
//! The tree is split the usual way: immutable green storage ([`GreenNode`],
//! [`GreenToken`]) shared behind `Arc`, and cheap positioned views
//! ([`SyntaxNode`], [`SyntaxToken`]) that compute absolute offsets while
//! descending. Every byte of the source lives in some token or trivia piece,
//! so rendering the root reproduces the input exactly.

mod green;
mod kind;
mod node;
mod tree;

pub use green::{trivia_len, GreenElement, GreenNode, GreenToken, Trivia};
pub use kind::{SyntaxKind, TokenKind, TriviaKind};
pub use node::{Descendants, SyntaxElement, SyntaxNode, SyntaxToken, TextRange};
pub use tree::{LineIndex, ParseError, SyntaxTree};
