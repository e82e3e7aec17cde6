//! Batch rewrite properties over hand-built statement lists.

use dataverse_lint_core::rewrite::{apply_batch, FixKind, RewriteEdit};
use dataverse_lint_core::syntax::{
    GreenElement, GreenNode, GreenToken, SyntaxKind, SyntaxTree, TokenKind, Trivia, TriviaKind,
};
use dataverse_lint_core::CancellationToken;
use proptest::prelude::*;

const KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("return", SyntaxKind::ReturnStatement),
    ("break", SyntaxKind::BreakStatement),
    ("continue", SyntaxKind::ContinueStatement),
    ("work", SyntaxKind::ExpressionStatement),
];

fn statement(keyword: usize, indent: usize) -> GreenElement {
    let (text, kind) = KEYWORDS[keyword];
    let mut leading = Vec::new();
    if indent > 0 {
        leading.push(Trivia::new(TriviaKind::Whitespace, " ".repeat(indent)));
    }
    GreenNode::new(
        kind,
        vec![
            GreenToken::new(TokenKind::Identifier, text)
                .with_leading(leading)
                .into(),
            GreenToken::new(TokenKind::Punct, ";")
                .with_trailing(vec![Trivia::new(TriviaKind::EndOfLine, "\n")])
                .into(),
        ],
    )
    .into()
}

fn unit(statements: &[(usize, usize)]) -> SyntaxTree {
    let mut children: Vec<GreenElement> = statements
        .iter()
        .map(|&(keyword, indent)| statement(keyword, indent))
        .collect();
    children.push(GreenToken::new(TokenKind::EndOfFile, "").into());
    SyntaxTree::new(
        "Generated.cs",
        GreenNode::new(SyntaxKind::CompilationUnit, children),
        vec![],
    )
}

fn edits_for(tree: &SyntaxTree, fix: FixKind) -> Vec<RewriteEdit> {
    tree.root()
        .child_nodes()
        .map(|n| RewriteEdit::new(n.span(), fix))
        .collect()
}

proptest! {
    #[test]
    fn add_then_remove_braces_restores_source(
        statements in prop::collection::vec((0..KEYWORDS.len(), 0usize..8), 1..12)
    ) {
        let cancel = CancellationToken::new();
        let tree = unit(&statements);

        let braced = apply_batch(&tree, &edits_for(&tree, FixKind::AddBraces), &cancel).unwrap();
        prop_assert!(braced.skipped.is_empty());
        prop_assert_eq!(braced.applied.len(), statements.len());
        prop_assert!(braced.tree.root().child_nodes().all(|n| n.kind() == SyntaxKind::Block));

        let edits = edits_for(&braced.tree, FixKind::RemoveBraces);
        let restored = apply_batch(&braced.tree, &edits, &cancel).unwrap();
        prop_assert!(restored.skipped.is_empty());
        prop_assert_eq!(restored.tree.text(), tree.text());
    }

    #[test]
    fn edits_given_in_any_order_apply_in_source_order(
        statements in prop::collection::vec((0..KEYWORDS.len(), 0usize..4), 2..8),
        seed in any::<u64>()
    ) {
        let cancel = CancellationToken::new();
        let tree = unit(&statements);
        let mut edits = edits_for(&tree, FixKind::AddBraces);
        let forward = apply_batch(&tree, &edits, &cancel).unwrap();

        let len = edits.len();
        edits.rotate_left(usize::try_from(seed % len as u64).unwrap());
        let rotated = apply_batch(&tree, &edits, &cancel).unwrap();

        prop_assert_eq!(forward.tree.text(), rotated.tree.text());
        prop_assert_eq!(forward.applied, rotated.applied);
    }
}

#[test]
fn cancelled_batch_leaves_input_untouched() {
    let tree = unit(&[(0, 0), (3, 4)]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = apply_batch(&tree, &edits_for(&tree, FixKind::AddBraces), &cancel);
    assert!(result.is_err());
    assert_eq!(tree.text(), "return;\n    work;\n");
}

#[test]
fn rendered_rewrite_snapshot() {
    let tree = unit(&[(3, 0), (0, 0)]);
    let outcome = apply_batch(
        &tree,
        &edits_for(&tree, FixKind::AddBraces),
        &CancellationToken::new(),
    )
    .unwrap();
    insta::assert_snapshot!(outcome.tree.text(), @r"
    { work; }
    { return; }
    ");
}
