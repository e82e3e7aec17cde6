//! Context handed to rules.

use crate::rule::{format_message, Rule};
use crate::semantic::{Resolver, SemanticModel};
use crate::syntax::{SyntaxTree, TextRange};
use crate::types::{Diagnostic, Suggestion};
use std::path::Path;

/// Everything a rule may consult while checking one node.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    tree: &'a SyntaxTree,
    resolver: Resolver<'a>,
}

impl<'a> RuleContext<'a> {
    /// Creates a context over one tree and its semantic model.
    #[must_use]
    pub fn new(tree: &'a SyntaxTree, model: &'a dyn SemanticModel) -> Self {
        Self {
            tree,
            resolver: Resolver::new(model),
        }
    }

    /// The tree being analyzed.
    #[must_use]
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// Path of the file being analyzed.
    #[must_use]
    pub fn path(&self) -> &'a Path {
        self.tree.path()
    }

    /// Semantic queries for this tree.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'a> {
        self.resolver
    }

    /// Builds a diagnostic for `rule` at `range`, formatting the rule's
    /// message with `args` and attaching its fix, if it has one.
    #[must_use]
    pub fn diagnostic(&self, rule: &dyn Rule, range: TextRange, args: &[&str]) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(
            rule.code(),
            rule.name(),
            rule.default_severity(),
            self.tree.location(range),
            format_message(rule.message_format(), args),
        )
        .with_args(args.iter().map(ToString::to_string).collect());
        if let Some(fix) = rule.fix() {
            diagnostic = diagnostic.with_suggestion(Suggestion::with_fix(fix));
        }
        diagnostic
    }
}
