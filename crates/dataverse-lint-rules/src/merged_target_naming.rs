//! Rule on the name of the local holding `GetTargetMergedWithPreImage`.

use crate::target_naming::check_naming;
use dataverse_lint_core::{Category, Diagnostic, Rule, RuleContext, SyntaxKind, SyntaxNode};

/// Rule code for merged-target-naming.
pub const CODE: &str = "CT0012";

/// Rule name for merged-target-naming.
pub const NAME: &str = "merged-target-naming";

/// Requires `GetTargetMergedWithPreImage` results to be stored in `merged`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergedTargetNaming;

impl MergedTargetNaming {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for MergedTargetNaming {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "The result of GetTargetMergedWithPreImage should be named 'merged'"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn message_format(&self) -> &'static str {
        "Rename '{0}' to 'merged'"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::LocalDeclarationStatement]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        check_naming(self, ctx, node, "GetTargetMergedWithPreImage", "merged")
    }
}
