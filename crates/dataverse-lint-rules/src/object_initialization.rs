//! Rule against empty parentheses before an object initializer.
//!
//! `new Entity() { ... }` and `new Entity { ... }` are the same call; the
//! empty argument list is noise. Anonymous objects and target-typed
//! `new() { ... }` are out of scope because they have no written type.

use dataverse_lint_core::chain::{argument_expressions, argument_list};
use dataverse_lint_core::{Category, Diagnostic, Rule, RuleContext, SyntaxKind, SyntaxNode};

/// Rule code for object-initialization.
pub const CODE: &str = "CT0003";

/// Rule name for object-initialization.
pub const NAME: &str = "object-initialization";

/// Flags `new T() { ... }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectInitialization;

impl ObjectInitialization {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for ObjectInitialization {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Object creations with an initializer should omit an empty argument list"
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn message_format(&self) -> &'static str {
        "Remove the empty parentheses from the creation of '{0}'"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::ObjectCreationExpression]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        if node.child_of_kind(SyntaxKind::InitializerExpression).is_none() {
            return Vec::new();
        }
        let Some(arguments) = argument_list(node) else {
            return Vec::new();
        };
        if !argument_expressions(&arguments).is_empty() {
            return Vec::new();
        }
        let type_name = node
            .find_child(SyntaxKind::is_type)
            .map_or_else(|| "object".to_string(), |ty| ty.text());
        vec![ctx.diagnostic(self, arguments.span(), &[&type_name])]
    }
}
