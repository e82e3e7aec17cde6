//! # dataverse-lint-csharp
//!
//! C# front-end for dataverse-lint.
//!
//! - [`tokenize`]: lossless lexer; every byte lands in a token or its trivia
//! - [`parse`]: error-tolerant parser producing a full-fidelity [`SyntaxTree`]
//! - [`bind`]: cross-file binder answering [`SemanticModel`] queries
//! - [`CSharpFrontend`]: the three wired together as an analyzer [`Frontend`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
mod lexer;
mod parser;

pub use binder::{bind, Compilation, FileModel};
pub use lexer::{is_keyword, tokenize};
pub use parser::parse;

use dataverse_lint_core::semantic::SemanticModel;
use dataverse_lint_core::syntax::SyntaxTree;
use dataverse_lint_core::Frontend;
use std::path::Path;

/// Front-end for `.cs` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpFrontend;

impl Frontend for CSharpFrontend {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn parse(&self, path: &Path, source: &str) -> SyntaxTree {
        parser::parse(path, source)
    }

    fn bind(&self, trees: &[SyntaxTree]) -> Vec<Box<dyn SemanticModel>> {
        binder::bind(trees)
    }
}
