//! Rule requiring braces around control-flow bodies.
//!
//! # Rationale
//!
//! A bare statement under `if`, `else` or a loop invites the classic
//! "added a second line, forgot the braces" bug. Jump statements (`return`,
//! `throw`, `break`, `continue`, `yield break`) are exempt: they end the
//! branch, so nothing can be appended after them by mistake.
//!
//! # Fix
//!
//! Wraps the statement in `{ ... }` on the line it already occupies.

use crate::control_flow;
use dataverse_lint_core::{
    Category, Diagnostic, FixKind, Rule, RuleContext, Severity, SyntaxKind, SyntaxNode,
};

/// Rule code for braces-for-control-flow.
pub const CODE: &str = "CT0001";

/// Rule name for braces-for-control-flow.
pub const NAME: &str = "braces-for-control-flow";

/// Requires a block around non-jump control-flow bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracesForControlFlow;

impl BracesForControlFlow {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BracesForControlFlow {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Control-flow bodies other than a single jump statement must be blocks"
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn message_format(&self) -> &'static str {
        "Use braces around the body of this '{0}'"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[
            SyntaxKind::IfStatement,
            SyntaxKind::ElseClause,
            SyntaxKind::ForStatement,
            SyntaxKind::ForEachStatement,
            SyntaxKind::WhileStatement,
            SyntaxKind::DoStatement,
        ]
    }

    fn fix(&self) -> Option<FixKind> {
        Some(FixKind::AddBraces)
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let Some(body) = control_flow::checked_body(node) else {
            return Vec::new();
        };
        if body.kind() == SyntaxKind::Block || control_flow::is_jump(body.kind()) {
            return Vec::new();
        }
        let keyword = control_flow::keyword(node);
        vec![ctx.diagnostic(self, body.span(), &[&keyword])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, flagged};

    fn method(body: &str) -> String {
        format!("class C\n{{\n    void M(bool cond, int[] items)\n    {{\n{body}\n    }}\n}}\n")
    }

    #[test]
    fn test_reports_bare_call_under_if() {
        let source = method("        if (cond) doWork();");
        let diagnostics = check(BracesForControlFlow::new(), &source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, CODE);
        assert_eq!(flagged(&source, &diagnostics[0]), "doWork();");
        assert_eq!(diagnostics[0].fix(), Some(FixKind::AddBraces));
        assert_eq!(diagnostics[0].message, "Use braces around the body of this 'if'");
    }

    #[test]
    fn test_allows_jump_statements() {
        for jump in ["return;", "throw new Exception();", "continue;", "break;", "yield break;"] {
            let source = method(&format!("        if (cond) {jump}"));
            assert!(
                check(BracesForControlFlow::new(), &source).is_empty(),
                "{jump} should be allowed"
            );
        }
    }

    #[test]
    fn test_yield_return_is_not_a_jump() {
        let source = method("        if (cond) yield return 1;");
        let diagnostics = check(BracesForControlFlow::new(), &source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(&source, &diagnostics[0]), "yield return 1;");
    }

    #[test]
    fn test_else_if_chain_checks_only_terminal_else() {
        let source = method(
            "        if (cond) { a(); }\n        else if (!cond) { b(); }\n        else c();",
        );
        let diagnostics = check(BracesForControlFlow::new(), &source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(&source, &diagnostics[0]), "c();");
        assert_eq!(diagnostics[0].args, vec!["else".to_string()]);
    }

    #[test]
    fn test_reports_loop_bodies() {
        let source = method(
            "        for (var i = 0; i < 3; i++) a();\n        while (cond) b();\n        do c(); while (cond);\n        foreach (var x in items) d(x);",
        );
        let keywords: Vec<String> = check(BracesForControlFlow::new(), &source)
            .into_iter()
            .flat_map(|d| d.args)
            .collect();
        assert_eq!(keywords, vec!["for", "while", "do", "foreach"]);
    }

    #[test]
    fn test_blocks_are_fine() {
        let source = method("        if (cond) { doWork(); } else { other(); }");
        assert!(check(BracesForControlFlow::new(), &source).is_empty());
    }
}
