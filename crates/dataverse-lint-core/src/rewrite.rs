//! Trivia-preserving structural rewrites.
//!
//! Both transforms are pure: they take a snapshot and a node in it and
//! return a new snapshot. The replaced node's outer trivia always ends up on
//! the replacement, so text outside the node's span never changes.

use crate::cancellation::CancellationToken;
use crate::syntax::{
    GreenNode, GreenToken, SyntaxKind, SyntaxNode, SyntaxTree, TextRange, TokenKind, Trivia,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The automatic fixes the engine knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixKind {
    /// Wrap an embedded statement in a block.
    AddBraces,
    /// Replace a single-statement block with its statement.
    RemoveBraces,
}

impl FixKind {
    /// Short title shown to users.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::AddBraces => "Add braces",
            Self::RemoveBraces => "Remove braces",
        }
    }

    fn accepts(self, node: &SyntaxNode) -> bool {
        match self {
            Self::AddBraces => node.kind().is_statement() && node.kind() != SyntaxKind::Block,
            Self::RemoveBraces => node.kind() == SyntaxKind::Block,
        }
    }
}

impl std::fmt::Display for FixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Errors from a single rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// No node with the expected shape has exactly this span.
    #[error("no matching node at {0}")]
    NodeNotFound(TextRange),

    /// The node is not an embedded statement.
    #[error("node at {0} is not a statement")]
    NotAStatement(TextRange),

    /// The block holds zero or several statements.
    #[error("block at {0} does not contain exactly one statement")]
    NotSingleStatement(TextRange),

    /// Unwrapping would drop comments between the braces and the statement.
    #[error("block at {0} has comments that unwrapping would drop")]
    CommentsInside(TextRange),

    /// Cancellation was requested.
    #[error("rewrite cancelled")]
    Cancelled,
}

/// Wraps `statement` in a block, `{ statement }`, in place.
///
/// The statement's leading trivia moves before `{` and its trailing trivia
/// after `}`.
///
/// # Errors
///
/// Fails when `statement` is not a non-block statement of `tree`.
pub fn wrap_in_block(tree: &SyntaxTree, statement: &SyntaxNode) -> Result<SyntaxTree, RewriteError> {
    let span = statement.span();
    if !FixKind::AddBraces.accepts(statement) {
        return Err(RewriteError::NotAStatement(span));
    }
    let block = wrap_green(statement);
    tree.replace(statement, block)
        .ok_or(RewriteError::NodeNotFound(span))
}

fn wrap_green(statement: &SyntaxNode) -> GreenNode {
    let leading = statement.leading_trivia().to_vec();
    let trailing = statement.trailing_trivia().to_vec();
    let open = GreenToken::new(TokenKind::Punct, "{")
        .with_leading(leading)
        .with_trailing(vec![Trivia::space()]);
    let close = GreenToken::new(TokenKind::Punct, "}")
        .with_leading(vec![Trivia::space()])
        .with_trailing(trailing);
    GreenNode::new(
        SyntaxKind::Block,
        vec![
            open.into(),
            statement.green().without_outer_trivia().into(),
            close.into(),
        ],
    )
}

/// Replaces a single-statement `block` with its statement.
///
/// The statement takes the block's leading trivia (before `{`) and trailing
/// trivia (after `}`).
///
/// # Errors
///
/// Fails when `block` is not a block of `tree`, does not hold exactly one
/// statement, or has comments between the braces and the statement.
pub fn unwrap_block(tree: &SyntaxTree, block: &SyntaxNode) -> Result<SyntaxTree, RewriteError> {
    let span = block.span();
    let replacement = unwrap_green(block)?;
    tree.replace(block, replacement)
        .ok_or(RewriteError::NodeNotFound(span))
}

fn unwrap_green(block: &SyntaxNode) -> Result<GreenNode, RewriteError> {
    let span = block.span();
    if block.kind() != SyntaxKind::Block {
        return Err(RewriteError::NodeNotFound(span));
    }
    let Some(statement) = single_statement(block) else {
        return Err(RewriteError::NotSingleStatement(span));
    };
    let statement = &statement;

    let open = block.token("{");
    let close = block.token("}");
    let inner_trivia = open
        .iter()
        .flat_map(|t| t.trailing())
        .chain(statement.leading_trivia())
        .chain(statement.trailing_trivia())
        .chain(close.iter().flat_map(|t| t.leading()));
    if inner_trivia.into_iter().any(Trivia::is_comment) {
        return Err(RewriteError::CommentsInside(span));
    }

    Ok(statement.green().with_outer_trivia(
        block.leading_trivia().to_vec(),
        block.trailing_trivia().to_vec(),
    ))
}

/// The only child of `block`, when it has exactly one and that child is a
/// statement. Blocks holding recovered `Error` nodes never qualify.
#[must_use]
pub fn single_statement(block: &SyntaxNode) -> Option<SyntaxNode> {
    if block.kind() != SyntaxKind::Block {
        return None;
    }
    let mut children = block.child_nodes();
    let statement = children.next()?;
    (children.next().is_none() && statement.kind().is_statement()).then_some(statement)
}

/// Applies `fix` to the outermost node whose span is exactly `span`.
///
/// # Errors
///
/// Fails when cancelled, when no node of the right shape has that span, or
/// when the transform itself rejects the node.
pub fn apply_fix(
    tree: &SyntaxTree,
    span: TextRange,
    fix: FixKind,
    cancel: &CancellationToken,
) -> Result<SyntaxTree, RewriteError> {
    if cancel.is_cancelled() {
        return Err(RewriteError::Cancelled);
    }
    let node = locate(tree, span, fix)?;
    if cancel.is_cancelled() {
        return Err(RewriteError::Cancelled);
    }
    match fix {
        FixKind::AddBraces => wrap_in_block(tree, &node),
        FixKind::RemoveBraces => unwrap_block(tree, &node),
    }
}

fn locate(tree: &SyntaxTree, span: TextRange, fix: FixKind) -> Result<SyntaxNode, RewriteError> {
    tree.root()
        .find_node(span, |n| fix.accepts(n))
        .ok_or(RewriteError::NodeNotFound(span))
}

/// One requested edit in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewriteEdit {
    /// Span of the node to rewrite.
    pub span: TextRange,
    /// Transform to apply.
    pub fix: FixKind,
}

impl RewriteEdit {
    /// Creates an edit.
    #[must_use]
    pub fn new(span: TextRange, fix: FixKind) -> Self {
        Self { span, fix }
    }
}

/// Why a batch edit was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Overlaps an edit accepted earlier in source order.
    Overlap {
        /// The accepted edit it collides with.
        with: TextRange,
    },
    /// No node of the expected shape has the edit's span.
    NotFound,
    /// The node was found but the transform rejected it.
    Invalid {
        /// Rejection message.
        reason: String,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overlap { with } => write!(f, "overlaps edit at {with}"),
            Self::NotFound => f.write_str("node not found"),
            Self::Invalid { reason } => f.write_str(reason),
        }
    }
}

/// A batch edit that was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEdit {
    /// The edit as requested.
    pub edit: RewriteEdit,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of a batch application.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Snapshot with every applied edit.
    pub tree: SyntaxTree,
    /// Edits that were applied, in source order.
    pub applied: Vec<RewriteEdit>,
    /// Edits that were not applied.
    pub skipped: Vec<SkippedEdit>,
}

/// Applies several edits to one snapshot.
///
/// Edits are taken in source order (stable by span start). An edit that
/// overlaps an already accepted one is skipped. Every accepted edit is
/// resolved against the original snapshot before anything is applied, and
/// edits are applied from the highest offset down so lower offsets stay
/// valid. An edit is applied whole or not at all.
///
/// # Errors
///
/// Returns [`RewriteError::Cancelled`] if cancellation is requested; the
/// input snapshot is untouched.
pub fn apply_batch(
    tree: &SyntaxTree,
    edits: &[RewriteEdit],
    cancel: &CancellationToken,
) -> Result<BatchOutcome, RewriteError> {
    let mut ordered: Vec<RewriteEdit> = edits.to_vec();
    ordered.sort_by_key(|e| e.span.start);

    let mut skipped = Vec::new();
    let mut accepted: Vec<(RewriteEdit, GreenNode)> = Vec::new();
    for edit in ordered {
        if cancel.is_cancelled() {
            return Err(RewriteError::Cancelled);
        }
        if let Some((prior, _)) = accepted.iter().find(|(a, _)| a.span.overlaps(edit.span)) {
            skipped.push(SkippedEdit {
                edit,
                reason: SkipReason::Overlap { with: prior.span },
            });
            continue;
        }
        let node = match locate(tree, edit.span, edit.fix) {
            Ok(node) => node,
            Err(_) => {
                skipped.push(SkippedEdit {
                    edit,
                    reason: SkipReason::NotFound,
                });
                continue;
            }
        };
        let replacement = match edit.fix {
            FixKind::AddBraces => Ok(wrap_green(&node)),
            FixKind::RemoveBraces => unwrap_green(&node),
        };
        match replacement {
            Ok(green) => accepted.push((edit, green)),
            Err(e) => skipped.push(SkippedEdit {
                edit,
                reason: SkipReason::Invalid {
                    reason: e.to_string(),
                },
            }),
        }
    }

    let mut current = tree.clone();
    let mut applied = Vec::with_capacity(accepted.len());
    for (edit, green) in accepted.into_iter().rev() {
        if cancel.is_cancelled() {
            return Err(RewriteError::Cancelled);
        }
        let next = locate(&current, edit.span, edit.fix)
            .ok()
            .and_then(|node| current.replace(&node, green));
        match next {
            Some(next) => {
                current = next;
                applied.push(edit);
            }
            None => skipped.push(SkippedEdit {
                edit,
                reason: SkipReason::NotFound,
            }),
        }
    }
    applied.reverse();
    debug!(
        applied = applied.len(),
        skipped = skipped.len(),
        "Applied rewrite batch to {}",
        tree.path().display()
    );

    Ok(BatchOutcome {
        tree: current,
        applied,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TriviaKind;

    fn tok(text: &str) -> GreenToken {
        GreenToken::new(TokenKind::Punct, text)
    }

    fn ws(text: &str) -> Vec<Trivia> {
        vec![Trivia::new(TriviaKind::Whitespace, text)]
    }

    fn eol() -> Vec<Trivia> {
        vec![Trivia::new(TriviaKind::EndOfLine, "\n")]
    }

    fn stmt(keyword: &str, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> GreenNode {
        let kind = match keyword {
            "return" => SyntaxKind::ReturnStatement,
            "break" => SyntaxKind::BreakStatement,
            _ => SyntaxKind::ExpressionStatement,
        };
        GreenNode::new(
            kind,
            vec![
                GreenToken::new(TokenKind::Keyword, keyword)
                    .with_leading(leading)
                    .into(),
                tok(";").with_trailing(trailing).into(),
            ],
        )
    }

    fn block(inner: GreenNode, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> GreenNode {
        GreenNode::new(
            SyntaxKind::Block,
            vec![
                tok("{").with_leading(leading).with_trailing(ws(" ")).into(),
                inner.into(),
                tok("}").with_leading(ws(" ")).with_trailing(trailing).into(),
            ],
        )
    }

    fn unit(children: Vec<crate::syntax::GreenElement>) -> SyntaxTree {
        let mut children = children;
        children.push(GreenToken::new(TokenKind::EndOfFile, "").into());
        SyntaxTree::new("test.cs", GreenNode::new(SyntaxKind::CompilationUnit, children), vec![])
    }

    fn first(tree: &SyntaxTree) -> SyntaxNode {
        tree.root().child_nodes().next().unwrap()
    }

    #[test]
    fn wrap_moves_outer_trivia_outside_braces() {
        let tree = unit(vec![stmt("work", ws("    "), eol()).into()]);
        let wrapped = wrap_in_block(&tree, &first(&tree)).unwrap();
        assert_eq!(wrapped.text(), "    { work; }\n");
        assert_eq!(tree.text(), "    work;\n");
    }

    #[test]
    fn unwrap_takes_block_trivia() {
        let tree = unit(vec![block(stmt("return", vec![], vec![]), ws("  "), eol()).into()]);
        assert_eq!(tree.text(), "  { return; }\n");
        let unwrapped = unwrap_block(&tree, &first(&tree)).unwrap();
        assert_eq!(unwrapped.text(), "  return;\n");
    }

    #[test]
    fn wrap_then_unwrap_round_trips() {
        let tree = unit(vec![stmt("return", ws(" "), eol()).into()]);
        let wrapped = wrap_in_block(&tree, &first(&tree)).unwrap();
        let back = unwrap_block(&wrapped, &first(&wrapped)).unwrap();
        assert_eq!(back.text(), tree.text());
    }

    #[test]
    fn unwrap_rejects_multi_statement_block() {
        let two = GreenNode::new(
            SyntaxKind::Block,
            vec![
                tok("{").into(),
                stmt("work", vec![], vec![]).into(),
                stmt("return", ws(" "), vec![]).into(),
                tok("}").into(),
            ],
        );
        let tree = unit(vec![two.into()]);
        assert!(matches!(
            unwrap_block(&tree, &first(&tree)),
            Err(RewriteError::NotSingleStatement(_))
        ));
    }

    #[test]
    fn unwrap_refuses_to_drop_comments() {
        let inner = GreenNode::new(
            SyntaxKind::ReturnStatement,
            vec![
                GreenToken::new(TokenKind::Keyword, "return").into(),
                tok(";")
                    .with_trailing(vec![
                        Trivia::space(),
                        Trivia::new(TriviaKind::LineComment, "// done"),
                    ])
                    .into(),
            ],
        );
        let tree = unit(vec![block(inner, vec![], eol()).into()]);
        assert!(matches!(
            unwrap_block(&tree, &first(&tree)),
            Err(RewriteError::CommentsInside(_))
        ));
    }

    #[test]
    fn apply_fix_locates_by_span() {
        let tree = unit(vec![stmt("work", vec![], eol()).into()]);
        let span = first(&tree).span();
        let fixed = apply_fix(&tree, span, FixKind::AddBraces, &CancellationToken::new()).unwrap();
        assert_eq!(fixed.text(), "{ work; }\n");

        let missing = apply_fix(&tree, span, FixKind::RemoveBraces, &CancellationToken::new());
        assert_eq!(missing.unwrap_err(), RewriteError::NodeNotFound(span));
    }

    #[test]
    fn apply_fix_honours_cancellation() {
        let tree = unit(vec![stmt("work", vec![], eol()).into()]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = apply_fix(&tree, first(&tree).span(), FixKind::AddBraces, &cancel);
        assert_eq!(result.unwrap_err(), RewriteError::Cancelled);
    }

    #[test]
    fn batch_applies_disjoint_edits_and_skips_overlaps() {
        let tree = unit(vec![
            stmt("a", vec![], eol()).into(),
            block(stmt("return", vec![], ws(" ")), vec![], eol()).into(),
        ]);
        let nodes: Vec<SyntaxNode> = tree.root().child_nodes().collect();
        let inner = nodes[1].child_nodes().next().unwrap();
        let edits = [
            RewriteEdit::new(inner.span(), FixKind::AddBraces),
            RewriteEdit::new(nodes[1].span(), FixKind::RemoveBraces),
            RewriteEdit::new(nodes[0].span(), FixKind::AddBraces),
        ];

        let outcome = apply_batch(&tree, &edits, &CancellationToken::new()).unwrap();
        assert_eq!(outcome.tree.text(), "{ a; }\nreturn;\n");
        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].edit.fix, FixKind::AddBraces);
        assert!(matches!(outcome.skipped[0].reason, SkipReason::Overlap { .. }));
    }

    #[test]
    fn batch_reports_edits_that_do_not_resolve() {
        let tree = unit(vec![stmt("a", vec![], eol()).into()]);
        let edits = [RewriteEdit::new(TextRange::new(0, 1), FixKind::AddBraces)];
        let outcome = apply_batch(&tree, &edits, &CancellationToken::new()).unwrap();
        assert_eq!(outcome.tree.text(), tree.text());
        assert_eq!(outcome.skipped[0].reason, SkipReason::NotFound);
    }
}
