//! Rule on the name of the local holding `GetTarget`.

use crate::target_naming::check_naming;
use dataverse_lint_core::{Category, Diagnostic, Rule, RuleContext, SyntaxKind, SyntaxNode};

/// Rule code for get-target-naming.
pub const CODE: &str = "CT0011";

/// Rule name for get-target-naming.
pub const NAME: &str = "get-target-naming";

/// Requires `GetTarget` results to be stored in `target`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTargetNaming;

impl GetTargetNaming {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for GetTargetNaming {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "The result of GetTarget should be named 'target'"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn message_format(&self) -> &'static str {
        "Rename '{0}' to 'target'"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::LocalDeclarationStatement]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        check_naming(self, ctx, node, "GetTarget", "target")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn test_target_passes() {
        let source = "class P\n{\n    void M(IPluginExecutionContext context)\n    {\n        var target = context.GetTarget<Account>();\n    }\n}\n";
        assert!(check(GetTargetNaming::new(), source).is_empty());
        assert_eq!(GetTargetNaming::new().code(), CODE);
    }
}
