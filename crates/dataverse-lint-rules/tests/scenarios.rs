//! End-to-end checks: C# source through the default catalog, and fixes
//! applied back to the tree.

use dataverse_lint_core::{
    apply_batch, apply_fix, CancellationToken, Category, Diagnostic, DiagnosticSink,
    DispatchError, Dispatcher, FixKind, Frontend, Rule, RuleCatalog, RuleContext, RewriteEdit,
    SemanticModel, Severity, SkipReason, SyntaxKind, SyntaxNode, SyntaxTree,
};
use dataverse_lint_csharp::CSharpFrontend;
use dataverse_lint_rules::default_catalog;
use std::path::Path;
use std::sync::Arc;

fn parse(source: &str) -> (SyntaxTree, Box<dyn SemanticModel>) {
    let tree = CSharpFrontend.parse(Path::new("Plugin.cs"), source);
    let mut models = CSharpFrontend.bind(std::slice::from_ref(&tree));
    let model = models.pop().unwrap();
    (tree, model)
}

fn lint_with(catalog: &RuleCatalog, source: &str) -> Vec<Diagnostic> {
    let (tree, model) = parse(source);
    let sink = DiagnosticSink::new();
    let report = Dispatcher::new(catalog)
        .run(&tree, model.as_ref(), &sink, &CancellationToken::new())
        .unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    let mut diagnostics = sink.into_vec();
    diagnostics.sort_by(|a, b| {
        (a.location.offset, &a.code).cmp(&(b.location.offset, &b.code))
    });
    diagnostics
}

fn lint(source: &str) -> Vec<Diagnostic> {
    lint_with(&default_catalog().unwrap(), source)
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}

fn flagged<'a>(source: &'a str, diagnostic: &Diagnostic) -> &'a str {
    let range = diagnostic.location.range();
    &source[range.start..range.end]
}

fn method_body(body: &str) -> String {
    format!("class Worker\n{{\n    void Run(bool cond)\n    {{\n{body}\n    }}\n}}\n")
}

#[test]
fn bare_statement_gets_one_braces_diagnostic() {
    let source = method_body("        if (cond) doWork();");
    let diagnostics = lint(&source);
    assert_eq!(codes(&diagnostics), vec!["CT0001"]);
    assert_eq!(flagged(&source, &diagnostics[0]), "doWork();");
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].location.line, 5);
}

#[test]
fn braced_return_is_unwrapped_by_its_fix() {
    let source = method_body("        if (cond) { return; }");
    let diagnostics = lint(&source);
    assert_eq!(codes(&diagnostics), vec!["CT0004"]);
    assert_eq!(flagged(&source, &diagnostics[0]), "{ return; }");

    let (tree, _) = parse(&source);
    let edit = diagnostics[0].edit().unwrap();
    let fixed = apply_fix(&tree, edit.span, edit.fix, &CancellationToken::new()).unwrap();
    assert_eq!(fixed.text(), method_body("        if (cond) return;"));
    assert!(lint(fixed.text()).is_empty());
}

#[test]
fn duplicate_service_parameters() {
    let source = "public class Handler\n{\n    public Handler(IFooService a, IFooService b) { }\n}\n";
    let diagnostics = lint(source);
    assert_eq!(codes(&diagnostics), vec!["CT0005"]);
    assert_eq!(diagnostics[0].args, vec!["IFooService", "a, b"]);
}

#[test]
fn numeric_literal_assigned_to_enum_local() {
    let source = "enum Status { Active, Inactive }\nclass Worker\n{\n    void Run()\n    {\n        Status status = Status.Active;\n        status = 2;\n    }\n}\n";
    let diagnostics = lint(source);
    assert_eq!(codes(&diagnostics), vec!["CT0002"]);
    assert_eq!(diagnostics[0].args, vec!["status", "2"]);
}

#[test]
fn plugin_documentation_toggles_with_summary() {
    let diagnostics = lint("class X : Plugin {}");
    assert_eq!(codes(&diagnostics), vec!["CT0006"]);
    assert_eq!(diagnostics[0].args, vec!["X"]);
    assert!(lint("/// <summary>text</summary>\nclass X : Plugin {}").is_empty());
}

#[test]
fn plugin_step_images() {
    let plugin = |chain: &str| {
        format!("/// <inheritdoc/>\npublic class AccountPlugin : Plugin\n{{\n    public AccountPlugin()\n    {{\n        {chain};\n    }}\n}}\n")
    };
    let pre_on_create = plugin("RegisterPluginStep<Account>(EventOperation.Create, ExecutionStage.PreOperation, Execute).AddImage(ImageType.PreImage, x => x.Name)");
    let post_on_create = plugin("RegisterPluginStep<Account>(EventOperation.Create, ExecutionStage.PostOperation, Execute).AddImage(ImageType.PostImage, x => x.Name)");
    let post_on_delete = plugin("RegisterPluginStep<Account>(EventOperation.Delete, ExecutionStage.PreOperation, Execute).AddImage(ImageType.PostImage, x => x.Name)");

    assert_eq!(codes(&lint(&pre_on_create)), vec!["CT0009"]);
    assert!(lint(&post_on_create).is_empty());
    let diagnostics = lint(&post_on_delete);
    assert_eq!(codes(&diagnostics), vec!["CT0010"]);
    assert_eq!(diagnostics[0].args, vec!["PostImage"]);
}

#[test]
fn realistic_plugin_reports_each_rule_once() {
    let source = r#"using Microsoft.Xrm.Sdk;

namespace Contoso.Plugins
{
    public enum AccountState { Active = 0, Inactive = 1 }

    public class Account : Entity
    {
        public AccountState? StateCode { get; set; }
    }

    public class AccountPlugin : Plugin
    {
        public AccountPlugin(IAuditService audit, IAuditService fallback)
        {
            RegisterPluginStep<Account>(EventOperation.Create, ExecutionStage.PostOperation, Execute)
                .AddFilteredAttributes(x => x.StateCode);
        }

        private void Execute(LocalPluginContext context)
        {
            Account account = context.GetTarget<Account>();
            var merged = context.GetTargetMergedWithPreImage<Account>();
            if (account.Contains("statecode"))
                account.StateCode = 1;
            var copy = new Account() { StateCode = AccountState.Active };
        }
    }
}
"#;
    let diagnostics = lint(source);
    let mut found = codes(&diagnostics);
    found.sort_unstable();
    assert_eq!(
        found,
        vec!["CT0001", "CT0002", "CT0003", "CT0005", "CT0006", "CT0007", "CT0008", "CT0011"]
    );
}

#[test]
fn add_then_remove_braces_round_trips() {
    let cancel = CancellationToken::new();

    let source = method_body("        if (cond) doWork();\n        else Log();");
    let (tree, _) = parse(&source);
    let braces = lint(&source);
    assert_eq!(codes(&braces), vec!["CT0001", "CT0001"]);
    let edits: Vec<RewriteEdit> = braces.iter().filter_map(Diagnostic::edit).collect();
    let wrapped = apply_batch(&tree, &edits, &cancel).unwrap();
    assert_eq!(
        wrapped.tree.text(),
        method_body("        if (cond) { doWork(); }\n        else { Log(); }")
    );
    let blocks: Vec<RewriteEdit> = wrapped
        .tree
        .root()
        .descendants()
        .filter(|n| matches!(n.kind(), SyntaxKind::IfStatement | SyntaxKind::ElseClause))
        .filter_map(|n| n.child_of_kind(SyntaxKind::Block))
        .map(|n| RewriteEdit::new(n.span(), FixKind::RemoveBraces))
        .collect();
    assert_eq!(blocks.len(), 2);
    let restored = apply_batch(&wrapped.tree, &blocks, &cancel).unwrap();
    assert_eq!(restored.tree.text(), source);

    let jump = method_body("        if (cond) return;");
    let (tree, _) = parse(&jump);
    let statement = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::ReturnStatement)
        .unwrap();
    let braced = apply_fix(&tree, statement.span(), FixKind::AddBraces, &cancel).unwrap();
    let diagnostics = lint(braced.text());
    assert_eq!(codes(&diagnostics), vec!["CT0004"]);
    let edit = diagnostics[0].edit().unwrap();
    let back = apply_fix(&braced, edit.span, edit.fix, &cancel).unwrap();
    assert_eq!(back.text(), jump);
}

#[test]
fn overlapping_fixes_apply_the_outer_one_first() {
    let source = method_body("        if (cond) { if (cond) { return; } }");
    let (tree, _) = parse(&source);
    let edits: Vec<RewriteEdit> = tree
        .root()
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::Block)
        .skip(1)
        .map(|n| RewriteEdit::new(n.span(), FixKind::RemoveBraces))
        .collect();
    assert_eq!(edits.len(), 2);

    let outcome = apply_batch(&tree, &edits, &CancellationToken::new()).unwrap();
    assert_eq!(outcome.applied, vec![edits[0]]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].edit, edits[1]);
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::Overlap {
            with: edits[0].span
        }
    );
    assert_eq!(
        outcome.tree.text(),
        method_body("        if (cond) if (cond) { return; }")
    );
}

#[test]
fn unwrapping_keeps_comments_by_refusing() {
    let source = method_body("        if (cond) { /* keep */ return; }");
    let (tree, _) = parse(&source);
    let diagnostics = lint(&source);
    assert_eq!(codes(&diagnostics), vec!["CT0004"]);
    let edit = diagnostics[0].edit().unwrap();
    let outcome = apply_batch(&tree, &[edit], &CancellationToken::new()).unwrap();
    assert!(outcome.applied.is_empty());
    assert!(matches!(outcome.skipped[0].reason, SkipReason::Invalid { .. }));
    assert_eq!(outcome.tree.text(), source);
}

#[test]
fn parallel_dispatch_matches_sequential() {
    let source = r#"
public enum Status { A, B }
public class Account { public Status Status { get; set; } }
public class Job : Plugin
{
    public Job(IOrgService a, IOrgService b, ILogHandler c, ILogHandler d) { }
    void Run(Account account, bool flag)
    {
        for (var i = 0; i < 3; i++) Work(i);
        while (flag) Work(0);
        if (flag) { return; } else { throw new Exception(); }
        account.Status = 1;
        var x = new Account() { Status = 0 };
        var target = context.GetTarget<Account>();
        var other = context.GetTarget<Account>();
    }
}
"#;
    let catalog = default_catalog().unwrap();
    let (tree, model) = parse(source);
    let cancel = CancellationToken::new();
    let dispatcher = Dispatcher::new(&catalog);

    let sequential = DiagnosticSink::new();
    let seq_report = dispatcher.run(&tree, model.as_ref(), &sequential, &cancel).unwrap();
    let parallel = DiagnosticSink::new();
    let par_report = dispatcher
        .run_parallel(&tree, model.as_ref(), &parallel, &cancel)
        .unwrap();

    let key = |d: &Diagnostic| (d.location.offset, d.code.clone(), d.message.clone());
    let mut left: Vec<_> = sequential.into_vec().iter().map(key).collect();
    let mut right: Vec<_> = parallel.into_vec().iter().map(key).collect();
    left.sort();
    right.sort();
    assert!(left.len() >= 10, "{left:?}");
    assert_eq!(left, right);
    assert_eq!(seq_report.evaluations, par_report.evaluations);
}

#[test]
fn cancelled_dispatch_reports_nothing() {
    let catalog = default_catalog().unwrap();
    let (tree, model) = parse(&method_body("        if (cond) doWork();"));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let sink = DiagnosticSink::new();
    let dispatcher = Dispatcher::new(&catalog);
    assert!(matches!(
        dispatcher.run(&tree, model.as_ref(), &sink, &cancel),
        Err(DispatchError::Cancelled)
    ));
    assert!(matches!(
        dispatcher.run_parallel(&tree, model.as_ref(), &sink, &cancel),
        Err(DispatchError::Cancelled)
    ));
    assert!(sink.is_empty());
}

struct Exploding;

impl Rule for Exploding {
    fn code(&self) -> &'static str {
        "CT9999"
    }

    fn name(&self) -> &'static str {
        "exploding"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn message_format(&self) -> &'static str {
        "never"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::IfStatement]
    }

    fn check(&self, _ctx: &RuleContext<'_>, _node: &SyntaxNode) -> Vec<Diagnostic> {
        panic!("boom");
    }
}

#[test]
fn a_panicking_rule_only_loses_its_own_diagnostics() {
    let mut rules: Vec<Arc<dyn Rule>> = vec![Arc::new(Exploding)];
    rules.extend(dataverse_lint_rules::all_rules().into_iter().map(Arc::from));
    let catalog = RuleCatalog::from_shared(rules).unwrap();
    let (tree, model) = parse(&method_body("        if (cond) doWork();\n        if (cond) { return; }"));
    let sink = DiagnosticSink::new();
    let report = Dispatcher::new(&catalog)
        .run(&tree, model.as_ref(), &sink, &CancellationToken::new())
        .unwrap();
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.code == "CT9999" && f.message == "boom"));
    let mut found: Vec<String> = sink.into_vec().into_iter().map(|d| d.code).collect();
    found.sort();
    assert_eq!(found, vec!["CT0001", "CT0004"]);
}

#[test]
fn broken_source_is_still_checked() {
    let source = method_body("        if (cond) doWork();\n        var x = ;\n        if (cond) { return; }");
    let (tree, _) = parse(&source);
    assert!(!tree.errors().is_empty());
    assert_eq!(tree.text(), source);
    let found = lint(&source);
    assert!(codes(&found).contains(&"CT0001"));
    assert!(codes(&found).contains(&"CT0004"));
}

#[test]
fn rule_selection_by_code_and_name() {
    let catalog = default_catalog()
        .unwrap()
        .filter(&["CT0001", "no-braces-for-control-flow"])
        .unwrap();
    let source = method_body("        if (cond) doWork();\n        if (cond) { return; }\n        status = 2;");
    assert_eq!(codes(&lint_with(&catalog, &source)), vec!["CT0001", "CT0004"]);
    assert!(default_catalog().unwrap().filter(&["CT0100"]).is_err());
}
