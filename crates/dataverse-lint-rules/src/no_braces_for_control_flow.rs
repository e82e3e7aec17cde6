//! Rule against braces around a lone jump statement.
//!
//! The counterpart of `braces-for-control-flow`: `if (x) { return; }` reads
//! better as `if (x) return;`. Only `if` and `else` bodies are checked;
//! loops keep their braces.

use crate::control_flow;
use dataverse_lint_core::rewrite::single_statement;
use dataverse_lint_core::{
    Category, Diagnostic, FixKind, Rule, RuleContext, Severity, SyntaxKind, SyntaxNode,
};

/// Rule code for no-braces-for-control-flow.
pub const CODE: &str = "CT0004";

/// Rule name for no-braces-for-control-flow.
pub const NAME: &str = "no-braces-for-control-flow";

/// Flags `if`/`else` blocks whose only statement is a jump.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBracesForControlFlow;

impl NoBracesForControlFlow {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NoBracesForControlFlow {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "A block holding a single return, throw, break, continue or yield break should be unbraced"
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn message_format(&self) -> &'static str {
        "Remove the braces around the single '{0}' statement"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::IfStatement, SyntaxKind::ElseClause]
    }

    fn fix(&self) -> Option<FixKind> {
        Some(FixKind::RemoveBraces)
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let Some(block) = control_flow::checked_body(node) else {
            return Vec::new();
        };
        let Some(statement) = single_statement(&block) else {
            return Vec::new();
        };
        let Some(jump) = control_flow::jump_name(statement.kind()) else {
            return Vec::new();
        };
        vec![ctx.diagnostic(self, block.span(), &[jump])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, flagged};

    fn method(body: &str) -> String {
        format!("class C\n{{\n    int M(bool cond)\n    {{\n{body}\n        return 0;\n    }}\n}}\n")
    }

    #[test]
    fn test_reports_block_around_return() {
        let source = method("        if (cond) { return 1; }");
        let diagnostics = check(NoBracesForControlFlow::new(), &source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(&source, &diagnostics[0]), "{ return 1; }");
        assert_eq!(diagnostics[0].fix(), Some(FixKind::RemoveBraces));
        insta::assert_snapshot!(diagnostics[0].message, @"Remove the braces around the single 'return' statement");
    }

    #[test]
    fn test_ignores_blocks_with_other_statements() {
        for body in [
            "if (cond) { work(); }",
            "if (cond) { work(); return 1; }",
            "if (cond) { }",
            "if (cond) { yield return 1; }",
        ] {
            let source = method(&format!("        {body}"));
            assert!(check(NoBracesForControlFlow::new(), &source).is_empty(), "{body}");
        }
    }

    #[test]
    fn test_checks_terminal_else_not_else_if() {
        let source = method(
            "        if (cond) work();\n        else if (!cond) { throw new Exception(); }\n        else { break; }",
        );
        let spans: Vec<&str> = check(NoBracesForControlFlow::new(), &source)
            .iter()
            .map(|d| flagged(&source, d))
            .collect();
        assert_eq!(spans, vec!["{ throw new Exception(); }", "{ break; }"]);
    }

    #[test]
    fn test_loops_keep_their_braces() {
        let source = method("        while (cond) { break; }");
        assert!(check(NoBracesForControlFlow::new(), &source).is_empty());
    }
}
