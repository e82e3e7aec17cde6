//! Embedded statements of control-flow constructs.

use dataverse_lint_core::{SyntaxKind, SyntaxNode};

/// Statement kinds that may stand alone as a control-flow body.
///
/// `yield return` produces a value and continues, so it is not a jump.
pub(crate) fn is_jump(kind: SyntaxKind) -> bool {
    jump_name(kind).is_some()
}

/// Source spelling of a jump statement kind.
pub(crate) fn jump_name(kind: SyntaxKind) -> Option<&'static str> {
    match kind {
        SyntaxKind::ReturnStatement => Some("return"),
        SyntaxKind::ThrowStatement => Some("throw"),
        SyntaxKind::ContinueStatement => Some("continue"),
        SyntaxKind::BreakStatement => Some("break"),
        SyntaxKind::YieldBreakStatement => Some("yield break"),
        _ => None,
    }
}

/// The body of an `if`, `else`, loop or `do` node.
///
/// The `else` of an `if` is not part of the `if` body; it is reached
/// through its own `ElseClause` node.
pub(crate) fn body(node: &SyntaxNode) -> Option<SyntaxNode> {
    match node.kind() {
        SyntaxKind::IfStatement
        | SyntaxKind::ElseClause
        | SyntaxKind::ForStatement
        | SyntaxKind::ForEachStatement
        | SyntaxKind::WhileStatement
        | SyntaxKind::DoStatement => node.child_nodes().find(|n| n.kind().is_statement()),
        _ => None,
    }
}

/// Body of `node` unless it is the `if` of an `else if` chain.
pub(crate) fn checked_body(node: &SyntaxNode) -> Option<SyntaxNode> {
    let body = body(node)?;
    if node.kind() == SyntaxKind::ElseClause && body.kind() == SyntaxKind::IfStatement {
        return None;
    }
    Some(body)
}

/// Keyword that introduces `node` (`if`, `else`, `foreach`, ...).
pub(crate) fn keyword(node: &SyntaxNode) -> String {
    node.child_tokens()
        .find(|t| t.text() != "await")
        .map(|t| t.text().to_string())
        .unwrap_or_default()
}
