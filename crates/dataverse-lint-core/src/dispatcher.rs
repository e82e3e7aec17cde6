//! Single-pass traversal that routes nodes to rules.

use crate::cancellation::CancellationToken;
use crate::catalog::RuleCatalog;
use crate::context::RuleContext;
use crate::rule::Rule;
use crate::semantic::SemanticModel;
use crate::syntax::{SyntaxNode, SyntaxTree};
use crate::types::{Diagnostic, RuleFailure};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that stop a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Cancellation was requested between node visits.
    #[error("analysis cancelled")]
    Cancelled,
}

/// Append-only, thread-safe diagnostic collector.
///
/// No ordering is guaranteed between diagnostics appended from different
/// threads.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }

    /// Appends several diagnostics under one lock.
    pub fn extend(&self, diagnostics: Vec<Diagnostic>) {
        if !diagnostics.is_empty() {
            self.diagnostics.lock().extend(diagnostics);
        }
    }

    /// Number of diagnostics collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    /// True when nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the diagnostics collected so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Consumes the sink.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}

/// Counters and failures from one traversal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Nodes visited.
    pub nodes_visited: usize,
    /// Rule evaluations performed.
    pub evaluations: usize,
    /// Evaluations that panicked.
    pub failures: Vec<RuleFailure>,
}

/// Walks a tree once, evaluating every triggered rule on every node.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'c> {
    catalog: &'c RuleCatalog,
}

impl<'c> Dispatcher<'c> {
    /// Creates a dispatcher over `catalog`.
    #[must_use]
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self { catalog }
    }

    /// Sequential pre-order traversal.
    ///
    /// Each `(node, rule)` evaluation is isolated: a panicking rule loses
    /// only its own diagnostics for that node and is recorded as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Cancelled`] when `cancel` fires; diagnostics
    /// already in `sink` stay there and nothing further is appended.
    ///
    /// # Panics
    ///
    /// Panics if the tree's root is not a compilation unit.
    pub fn run(
        &self,
        tree: &SyntaxTree,
        model: &dyn SemanticModel,
        sink: &DiagnosticSink,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, DispatchError> {
        assert_root(tree);
        let ctx = RuleContext::new(tree, model);
        let mut report = DispatchReport::default();
        let mut stack = vec![tree.root()];

        while let Some(node) = stack.pop() {
            if cancel.is_cancelled() {
                debug!("Dispatch cancelled in {}", tree.path().display());
                return Err(DispatchError::Cancelled);
            }
            report.nodes_visited += 1;
            for &index in self.catalog.rules_for(node.kind()) {
                let Some(rule) = self.catalog.rule(index) else {
                    continue;
                };
                report.evaluations += 1;
                match evaluate(rule, &ctx, &node) {
                    Ok(diagnostics) => sink.extend(diagnostics),
                    Err(failure) => report.failures.push(failure),
                }
            }
            let children: Vec<SyntaxNode> = node.child_nodes().collect();
            stack.extend(children.into_iter().rev());
        }

        Ok(report)
    }

    /// Same evaluations as [`Dispatcher::run`], spread over the rayon pool.
    ///
    /// The diagnostic set equals the sequential one; the order does not.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Cancelled`] when `cancel` fires.
    ///
    /// # Panics
    ///
    /// Panics if the tree's root is not a compilation unit.
    pub fn run_parallel(
        &self,
        tree: &SyntaxTree,
        model: &dyn SemanticModel,
        sink: &DiagnosticSink,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, DispatchError> {
        assert_root(tree);
        let ctx = RuleContext::new(tree, model);

        let mut nodes = Vec::new();
        let mut visited = 0;
        for node in tree.root().descendants() {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }
            visited += 1;
            if !self.catalog.rules_for(node.kind()).is_empty() {
                nodes.push(node);
            }
        }
        let evaluations = AtomicUsize::new(0);
        let failures = Mutex::new(Vec::new());

        nodes.par_iter().try_for_each(|node| {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }
            for &index in self.catalog.rules_for(node.kind()) {
                let Some(rule) = self.catalog.rule(index) else {
                    continue;
                };
                evaluations.fetch_add(1, Ordering::Relaxed);
                match evaluate(rule, &ctx, node) {
                    Ok(diagnostics) => sink.extend(diagnostics),
                    Err(failure) => failures.lock().push(failure),
                }
            }
            Ok(())
        })?;

        Ok(DispatchReport {
            nodes_visited: visited,
            evaluations: evaluations.into_inner(),
            failures: failures.into_inner(),
        })
    }
}

fn assert_root(tree: &SyntaxTree) {
    assert!(
        tree.is_compilation_unit(),
        "dispatch requires a compilation unit root, got {} for {}",
        tree.root().kind(),
        tree.path().display()
    );
}

fn evaluate(
    rule: &dyn Rule,
    ctx: &RuleContext<'_>,
    node: &SyntaxNode,
) -> Result<Vec<Diagnostic>, RuleFailure> {
    catch_unwind(AssertUnwindSafe(|| rule.check(ctx, node))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "rule panicked".to_string());
        let location = ctx.tree().location(node.span());
        warn!(
            rule = rule.code(),
            "Rule panicked at {}:{}:{}: {}",
            location.file.display(),
            location.line,
            location.column,
            message
        );
        RuleFailure {
            code: rule.code().to_string(),
            location,
            message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleBox;
    use crate::semantic::EmptyModel;
    use crate::syntax::{GreenElement, GreenNode, GreenToken, SyntaxKind, TokenKind};
    use crate::types::Category;
    use std::collections::HashSet;

    struct Flag {
        code: &'static str,
        kind: &'static [SyntaxKind],
        panic_on_second: bool,
    }

    impl Rule for Flag {
        fn code(&self) -> &'static str {
            self.code
        }
        fn name(&self) -> &'static str {
            "flag"
        }
        fn category(&self) -> Category {
            Category::Style
        }
        fn message_format(&self) -> &'static str {
            "flagged {0}"
        }
        fn triggers(&self) -> &'static [SyntaxKind] {
            self.kind
        }
        fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
            let text = node.text();
            assert!(!(self.panic_on_second && text == "b;"), "boom");
            vec![ctx.diagnostic(self, node.span(), &[text.as_str()])]
        }
    }

    fn statement(name: &str) -> GreenElement {
        GreenNode::new(
            SyntaxKind::ExpressionStatement,
            vec![
                GreenToken::new(TokenKind::Identifier, name).into(),
                GreenToken::new(TokenKind::Punct, ";").into(),
            ],
        )
        .into()
    }

    fn tree(kind: SyntaxKind) -> SyntaxTree {
        let mut children: Vec<GreenElement> = ["a", "b", "c"].iter().map(|n| statement(n)).collect();
        children.push(GreenToken::new(TokenKind::EndOfFile, "").into());
        SyntaxTree::new("t.cs", GreenNode::new(kind, children), vec![])
    }

    fn catalog(panic_on_second: bool) -> RuleCatalog {
        let rules: Vec<RuleBox> = vec![
            Box::new(Flag {
                code: "T1",
                kind: &[SyntaxKind::ExpressionStatement],
                panic_on_second,
            }),
            Box::new(Flag {
                code: "T2",
                kind: &[SyntaxKind::CompilationUnit],
                panic_on_second: false,
            }),
        ];
        RuleCatalog::new(rules).unwrap()
    }

    fn messages(diagnostics: &[Diagnostic]) -> HashSet<String> {
        diagnostics
            .iter()
            .map(|d| format!("{} {}", d.code, d.message))
            .collect()
    }

    #[test]
    fn each_triggered_rule_runs_once_per_node() {
        let catalog = catalog(false);
        let sink = DiagnosticSink::new();
        let report = Dispatcher::new(&catalog)
            .run(&tree(SyntaxKind::CompilationUnit), &EmptyModel, &sink, &CancellationToken::new())
            .unwrap();
        assert_eq!(report.nodes_visited, 4);
        assert_eq!(report.evaluations, 4);
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn panicking_rule_is_isolated() {
        let catalog = catalog(true);
        let sink = DiagnosticSink::new();
        let report = Dispatcher::new(&catalog)
            .run(&tree(SyntaxKind::CompilationUnit), &EmptyModel, &sink, &CancellationToken::new())
            .unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].code, "T1");
        assert_eq!(report.failures[0].message, "boom");
        let got = messages(&sink.into_vec());
        assert!(got.contains("T1 flagged a;"));
        assert!(got.contains("T1 flagged c;"));
        assert!(!got.iter().any(|m| m.ends_with("b;") && m.starts_with("T1")));
    }

    #[test]
    fn parallel_matches_sequential() {
        let catalog = catalog(false);
        let t = tree(SyntaxKind::CompilationUnit);
        let seq = DiagnosticSink::new();
        let par = DiagnosticSink::new();
        let dispatcher = Dispatcher::new(&catalog);
        dispatcher
            .run(&t, &EmptyModel, &seq, &CancellationToken::new())
            .unwrap();
        let report = dispatcher
            .run_parallel(&t, &EmptyModel, &par, &CancellationToken::new())
            .unwrap();
        assert_eq!(report.evaluations, 4);
        assert_eq!(messages(&seq.into_vec()), messages(&par.into_vec()));
    }

    #[test]
    fn cancelled_run_appends_nothing() {
        let catalog = catalog(false);
        let sink = DiagnosticSink::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let dispatcher = Dispatcher::new(&catalog);
        let t = tree(SyntaxKind::CompilationUnit);
        assert_eq!(
            dispatcher.run(&t, &EmptyModel, &sink, &cancel),
            Err(DispatchError::Cancelled)
        );
        assert_eq!(
            dispatcher.run_parallel(&t, &EmptyModel, &sink, &cancel),
            Err(DispatchError::Cancelled)
        );
        assert!(sink.is_empty());

        let retry = dispatcher.run(&t, &EmptyModel, &sink, &CancellationToken::new());
        assert!(retry.is_ok());
        assert_eq!(sink.len(), 4);
    }

    #[test]
    #[should_panic(expected = "compilation unit")]
    fn non_unit_root_is_a_contract_violation() {
        let catalog = catalog(false);
        let _ = Dispatcher::new(&catalog).run(
            &tree(SyntaxKind::Block),
            &EmptyModel,
            &DiagnosticSink::new(),
            &CancellationToken::new(),
        );
    }
}
