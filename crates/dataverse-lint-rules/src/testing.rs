//! Shared helpers for rule unit tests.

use dataverse_lint_core::{
    CancellationToken, Diagnostic, DiagnosticSink, Dispatcher, Frontend, Rule, RuleCatalog,
};
use dataverse_lint_csharp::CSharpFrontend;
use std::path::Path;
use std::sync::Arc;

/// Runs one rule over `files`, all bound together, and returns every
/// diagnostic ordered by position.
pub(crate) fn check_files<R: Rule + 'static>(rule: R, files: &[(&str, &str)]) -> Vec<Diagnostic> {
    let frontend = CSharpFrontend;
    let trees: Vec<_> = files
        .iter()
        .map(|(path, source)| frontend.parse(Path::new(path), source))
        .collect();
    let models = frontend.bind(&trees);
    let shared: Arc<dyn Rule> = Arc::new(rule);
    let catalog = RuleCatalog::from_shared(vec![shared]).unwrap();
    let dispatcher = Dispatcher::new(&catalog);
    let sink = DiagnosticSink::new();
    let cancel = CancellationToken::new();
    for (tree, model) in trees.iter().zip(&models) {
        let report = dispatcher.run(tree, model.as_ref(), &sink, &cancel).unwrap();
        assert!(report.failures.is_empty(), "{:?}", report.failures);
    }
    let mut diagnostics = sink.into_vec();
    diagnostics.sort_by_key(|d| (d.location.file.clone(), d.location.offset));
    diagnostics
}

/// Runs one rule over a single file.
pub(crate) fn check<R: Rule + 'static>(rule: R, source: &str) -> Vec<Diagnostic> {
    check_files(rule, &[("Test.cs", source)])
}

/// Source text under a diagnostic's span.
pub(crate) fn flagged<'a>(source: &'a str, diagnostic: &Diagnostic) -> &'a str {
    let range = diagnostic.location.range();
    &source[range.start..range.end]
}
