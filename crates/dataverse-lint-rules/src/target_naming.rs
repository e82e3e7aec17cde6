//! Shared matching for the plugin target naming rules.
//!
//! `var target = context.GetTarget<Account>();` and
//! `var merged = context.GetTargetMergedWithPreImage<Account>();` keep the
//! two views of the record apart when reading a plugin. Initializers are
//! looked at through one `await`, casts and parentheses.

use dataverse_lint_core::chain::{invocation_callee, invoked_name, unwrap_value_expression};
use dataverse_lint_core::{Diagnostic, Rule, RuleContext, SyntaxKind, SyntaxNode};

/// `(variable identifier, method name)` for each initialized declarator
/// whose value is a member invocation.
fn target_declarators(statement: &SyntaxNode) -> Vec<(SyntaxNode, String)> {
    let Some(declaration) = statement.child_of_kind(SyntaxKind::VariableDeclaration) else {
        return Vec::new();
    };
    declaration
        .children_of_kind(SyntaxKind::VariableDeclarator)
        .into_iter()
        .filter_map(|declarator| {
            let value = declarator
                .child_of_kind(SyntaxKind::EqualsValueClause)?
                .child_nodes()
                .next()?;
            let invocation = unwrap_value_expression(&value);
            if invocation_callee(&invocation)?.kind() != SyntaxKind::SimpleMemberAccessExpression {
                return None;
            }
            Some((declarator, invoked_name(&invocation)?))
        })
        .collect()
}

/// Reports declarators initialized by `method` whose name is not `expected`.
pub(crate) fn check_naming(
    rule: &dyn Rule,
    ctx: &RuleContext<'_>,
    statement: &SyntaxNode,
    method: &str,
    expected: &str,
) -> Vec<Diagnostic> {
    target_declarators(statement)
        .into_iter()
        .filter(|(_, name)| name == method)
        .filter_map(|(declarator, _)| declarator.identifier())
        .filter(|identifier| identifier.text() != expected)
        .map(|identifier| ctx.diagnostic(rule, identifier.span(), &[identifier.text()]))
        .collect()
}
