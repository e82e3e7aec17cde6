//! Backward traversal of fluent invocation chains.
//!
//! Given `a.First(x).Second(y).Third(z)`, the walker starts at the outermost
//! call and moves leftwards through receivers, so a rule looking at `Third`
//! can recover the arguments of `First` however many links back it is.

use crate::syntax::{SyntaxKind, SyntaxNode};

/// Strips one outer `await`, then any casts, then any parentheses.
///
/// The order is fixed: a cast inside parentheses is not removed.
#[must_use]
pub fn unwrap_value_expression(expr: &SyntaxNode) -> SyntaxNode {
    let mut current = expr.clone();
    if current.kind() == SyntaxKind::AwaitExpression {
        if let Some(inner) = operand(&current) {
            current = inner;
        }
    }
    while current.kind() == SyntaxKind::CastExpression {
        match operand(&current) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    while current.kind() == SyntaxKind::ParenthesizedExpression {
        match operand(&current) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// The wrapped expression of an await, cast or parenthesized expression.
fn operand(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.child_nodes()
        .filter(|n| n.kind().is_expression())
        .last()
}

/// The callee expression of an invocation (`a.B` in `a.B(c)`).
#[must_use]
pub fn invocation_callee(invocation: &SyntaxNode) -> Option<SyntaxNode> {
    if invocation.kind() != SyntaxKind::InvocationExpression {
        return None;
    }
    invocation.child_nodes().next().filter(|n| n.kind().is_expression())
}

/// Argument list of an invocation or object creation.
#[must_use]
pub fn argument_list(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.child_of_kind(SyntaxKind::ArgumentList)
}

/// Identifier text of a simple name (`Foo` or `Foo<T>`).
#[must_use]
pub fn simple_name_text(name: &SyntaxNode) -> Option<String> {
    if !name.kind().is_simple_name() {
        return None;
    }
    name.identifier().map(|t| t.text().to_string())
}

/// Right-hand name of a member access (`B` in `a.B` or `a?.B`).
#[must_use]
pub fn member_name(member_access: &SyntaxNode) -> Option<SyntaxNode> {
    match member_access.kind() {
        SyntaxKind::SimpleMemberAccessExpression | SyntaxKind::ConditionalAccessExpression => {
            member_access
                .child_nodes()
                .skip(1)
                .find(|n| n.kind().is_simple_name())
        }
        _ => None,
    }
}

/// Left-hand expression of a member access (`a` in `a.B`).
#[must_use]
pub fn member_receiver(member_access: &SyntaxNode) -> Option<SyntaxNode> {
    match member_access.kind() {
        SyntaxKind::SimpleMemberAccessExpression | SyntaxKind::ConditionalAccessExpression => {
            member_access.child_nodes().next()
        }
        _ => None,
    }
}

/// Name of the method an invocation calls, generic arguments dropped.
#[must_use]
pub fn invoked_name(invocation: &SyntaxNode) -> Option<String> {
    let callee = invocation_callee(invocation)?;
    if callee.kind().is_simple_name() {
        return simple_name_text(&callee);
    }
    simple_name_text(&member_name(&callee)?)
}

/// True when the invocation's callee is a member access (`x.Method()`).
#[must_use]
pub fn is_member_invocation(invocation: &SyntaxNode) -> bool {
    invocation_callee(invocation).is_some_and(|c| {
        matches!(
            c.kind(),
            SyntaxKind::SimpleMemberAccessExpression | SyntaxKind::ConditionalAccessExpression
        )
    })
}

/// Receiver of a member invocation (`a` in `a.B(c)`).
#[must_use]
pub fn invocation_receiver(invocation: &SyntaxNode) -> Option<SyntaxNode> {
    member_receiver(&invocation_callee(invocation)?)
}

/// Iterator over the invocations of a chain, outermost first.
///
/// Member accesses without a call are stepped through without yielding.
/// Iteration stops at the first shape that is neither. A conditional access
/// (`a?.B()`) ends the chain: neither the `?.` call nor anything to its left
/// is yielded.
#[derive(Debug)]
pub struct ChainLinks {
    next: Option<SyntaxNode>,
}

impl Iterator for ChainLinks {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next.take()?;
            match current.kind() {
                SyntaxKind::InvocationExpression => {
                    let callee = invocation_callee(&current)?;
                    if callee.kind() == SyntaxKind::ConditionalAccessExpression {
                        return None;
                    }
                    self.next = Some(callee);
                    return Some(current);
                }
                SyntaxKind::SimpleMemberAccessExpression => {
                    self.next = member_receiver(&current);
                }
                _ => return None,
            }
        }
    }
}

/// Walks `expr` leftwards through its fluent chain.
#[must_use]
pub fn chain_links(expr: &SyntaxNode) -> ChainLinks {
    ChainLinks {
        next: Some(expr.clone()),
    }
}

/// Finds the call named `anchor` in `expr`'s chain and returns its argument
/// list. `expr` itself is considered first.
#[must_use]
pub fn find_anchor(expr: &SyntaxNode, anchor: &str) -> Option<SyntaxNode> {
    chain_links(expr)
        .find(|inv| invoked_name(inv).as_deref() == Some(anchor))
        .and_then(|inv| argument_list(&inv))
}

/// Expressions of the arguments in an argument list, in order.
#[must_use]
pub fn argument_expressions(argument_list: &SyntaxNode) -> Vec<SyntaxNode> {
    argument_list
        .children_of_kind(SyntaxKind::Argument)
        .iter()
        .filter_map(|arg| {
            arg.child_nodes()
                .filter(|n| n.kind() != SyntaxKind::NameColon)
                .last()
        })
        .collect()
}

/// Source text of each argument expression, in order.
#[must_use]
pub fn argument_texts(argument_list: &SyntaxNode) -> Vec<String> {
    argument_expressions(argument_list)
        .iter()
        .map(SyntaxNode::text)
        .collect()
}

/// Textual containment scan: the first keyword contained in `text`, trying
/// keywords in the given order.
#[must_use]
pub fn first_contained<'k>(text: &str, keywords: &[&'k str]) -> Option<&'k str> {
    keywords.iter().copied().find(|k| text.contains(k))
}

/// Scans arguments in order; within each, keywords in order. Returns the
/// first keyword whose text occurs in an argument's source text.
#[must_use]
pub fn scan_arguments<'k>(argument_list: &SyntaxNode, keywords: &[&'k str]) -> Option<&'k str> {
    argument_texts(argument_list)
        .iter()
        .find_map(|text| first_contained(text, keywords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{GreenElement, GreenNode, GreenToken, TokenKind};

    // Small hand-built trees; parser-level coverage lives with the front-end.

    fn tok(text: &str) -> GreenElement {
        let kind = if text.chars().all(|c| c.is_alphanumeric() || c == '_') {
            TokenKind::Identifier
        } else {
            TokenKind::Punct
        };
        GreenToken::new(kind, text).into()
    }

    fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenElement {
        GreenNode::new(kind, children).into()
    }

    fn name(text: &str) -> GreenElement {
        node(SyntaxKind::IdentifierName, vec![tok(text)])
    }

    fn args(items: &[&str]) -> GreenElement {
        let mut children = vec![tok("(")];
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                children.push(tok(","));
            }
            children.push(node(SyntaxKind::Argument, vec![name(item)]));
        }
        children.push(tok(")"));
        node(SyntaxKind::ArgumentList, children)
    }

    fn call(receiver: GreenElement, method: &str, arguments: &[&str]) -> GreenElement {
        let access = node(
            SyntaxKind::SimpleMemberAccessExpression,
            vec![receiver, tok("."), name(method)],
        );
        node(SyntaxKind::InvocationExpression, vec![access, args(arguments)])
    }

    fn root(expr: GreenElement) -> SyntaxNode {
        let GreenElement::Node(green) = expr else {
            unreachable!()
        };
        SyntaxNode::new_root(green)
    }

    /// `ctx.RegisterPluginStep(Create).WithMode(Sync).AddImage(PreImage)`
    fn chain() -> SyntaxNode {
        let register = call(name("ctx"), "RegisterPluginStep", &["EventOperation_Create"]);
        let mode = call(register, "WithMode", &["Sync"]);
        root(call(mode, "AddImage", &["ImageType_PreImage"]))
    }

    #[test]
    fn find_anchor_walks_several_links_back() {
        let expr = chain();
        let anchor = find_anchor(&expr, "RegisterPluginStep").unwrap();
        assert_eq!(argument_texts(&anchor), vec!["EventOperation_Create"]);
        assert!(find_anchor(&expr, "Missing").is_none());
    }

    #[test]
    fn find_anchor_considers_the_starting_call() {
        let expr = chain();
        let own = find_anchor(&expr, "AddImage").unwrap();
        assert_eq!(argument_texts(&own), vec!["ImageType_PreImage"]);
    }

    #[test]
    fn chain_links_are_outermost_first() {
        let names: Vec<String> = chain_links(&chain())
            .filter_map(|inv| invoked_name(&inv))
            .collect();
        assert_eq!(names, vec!["AddImage", "WithMode", "RegisterPluginStep"]);
    }

    #[test]
    fn conditional_access_ends_the_chain() {
        // builder?.RegisterPluginStep(Create).AddImage(PreImage)
        let access = node(
            SyntaxKind::ConditionalAccessExpression,
            vec![name("builder"), tok("?."), name("RegisterPluginStep")],
        );
        let register = node(
            SyntaxKind::InvocationExpression,
            vec![access, args(&["EventOperation_Create"])],
        );
        let expr = root(call(register, "AddImage", &["ImageType_PreImage"]));

        let names: Vec<String> = chain_links(&expr)
            .filter_map(|inv| invoked_name(&inv))
            .collect();
        assert_eq!(names, vec!["AddImage"]);
        assert!(find_anchor(&expr, "RegisterPluginStep").is_none());
    }

    #[test]
    fn receiver_of_member_invocation() {
        let expr = chain();
        assert!(is_member_invocation(&expr));
        let receiver = invocation_receiver(&expr).unwrap();
        assert_eq!(invoked_name(&receiver).as_deref(), Some("WithMode"));
    }

    #[test]
    fn scan_prefers_argument_order_then_keyword_order() {
        let list = root(args(&["UpdateOrDelete", "Create"]));
        assert_eq!(
            scan_arguments(&list, &["Create", "Delete", "Update"]),
            Some("Delete")
        );
        assert_eq!(first_contained("Recreate", &["Create", "Update"]), None);
        assert_eq!(first_contained("ReCreate", &["Create", "Update"]), Some("Create"));
    }

    #[test]
    fn unwrap_strips_await_casts_then_parens() {
        // await (Entity)(ctx.GetTarget())
        let inner = call(name("ctx"), "GetTarget", &[]);
        let paren = node(
            SyntaxKind::ParenthesizedExpression,
            vec![tok("("), inner, tok(")")],
        );
        let cast = node(
            SyntaxKind::CastExpression,
            vec![tok("("), name("Entity"), tok(")"), paren],
        );
        let awaited = root(node(SyntaxKind::AwaitExpression, vec![tok("await"), cast]));
        let unwrapped = unwrap_value_expression(&awaited);
        assert_eq!(unwrapped.kind(), SyntaxKind::InvocationExpression);
        assert_eq!(invoked_name(&unwrapped).as_deref(), Some("GetTarget"));
    }

    #[test]
    fn unwrap_keeps_cast_inside_parens() {
        let inner = call(name("ctx"), "GetTarget", &[]);
        let cast = node(
            SyntaxKind::CastExpression,
            vec![tok("("), name("Entity"), tok(")"), inner],
        );
        let paren = root(node(
            SyntaxKind::ParenthesizedExpression,
            vec![tok("("), cast, tok(")")],
        ));
        assert_eq!(
            unwrap_value_expression(&paren).kind(),
            SyntaxKind::CastExpression
        );
    }
}
