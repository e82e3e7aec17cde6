//! Properties of the brace and constructor rules over generated C#.

use dataverse_lint_core::{
    CancellationToken, Diagnostic, DiagnosticSink, Dispatcher, Frontend, RuleBox, RuleCatalog,
};
use dataverse_lint_csharp::CSharpFrontend;
use dataverse_lint_rules::{BracesForControlFlow, DuplicateConstructorParameterType, DI_SUFFIXES};
use proptest::prelude::*;
use std::path::Path;

fn run(rule: RuleBox, source: &str) -> Vec<Diagnostic> {
    let catalog = RuleCatalog::new(vec![rule]).unwrap();
    let tree = CSharpFrontend.parse(Path::new("Generated.cs"), source);
    let models = CSharpFrontend.bind(std::slice::from_ref(&tree));
    let sink = DiagnosticSink::new();
    Dispatcher::new(&catalog)
        .run(&tree, models[0].as_ref(), &sink, &CancellationToken::new())
        .unwrap();
    sink.into_vec()
}

/// Single statements and whether they end the branch.
const STATEMENTS: &[(&str, bool)] = &[
    ("return;", true),
    ("return x;", true),
    ("throw new InvalidOperationException();", true),
    ("continue;", true),
    ("break;", true),
    ("yield break;", true),
    ("yield return x;", false),
    ("x++;", false),
    ("DoWork(x);", false),
    ("x = await LoadAsync();", false),
    (";", false),
];

const HEADERS: &[&str] = &[
    "if (x > 0)",
    "while (x > 0)",
    "for (;;)",
    "foreach (var item in items)",
];

/// Type names that never match an injectable suffix.
const PLAIN_TYPES: &[&str] = &["string", "int", "List<string>", "Account", "IOrganization"];

fn parameter_type() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..DI_SUFFIXES.len(), 0..3usize)
            .prop_map(|(suffix, stem)| format!("I{}{}", ["Audit", "Order", "Cache"][stem], DI_SUFFIXES[suffix])),
        (0..PLAIN_TYPES.len()).prop_map(|i| PLAIN_TYPES[i].to_string()),
    ]
}

fn constructor(types: &[String]) -> String {
    let parameters: Vec<String> = types
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("{ty} p{i}"))
        .collect();
    format!("class Job\n{{\n    public Job({})\n    {{\n    }}\n}}\n", parameters.join(", "))
}

fn expected_reports(types: &[String]) -> usize {
    let mut distinct: Vec<&String> = types
        .iter()
        .filter(|ty| DI_SUFFIXES.iter().any(|s| ty.ends_with(s)))
        .collect();
    distinct.sort();
    distinct.dedup();
    distinct
        .into_iter()
        .filter(|ty| types.iter().filter(|t| t == ty).count() >= 2)
        .count()
}

proptest! {
    #[test]
    fn braces_required_exactly_for_non_jump_bodies(
        header in 0..HEADERS.len(),
        statement in 0..STATEMENTS.len(),
    ) {
        let (text, is_jump) = STATEMENTS[statement];
        let source = format!(
            "class C\n{{\n    IEnumerable<int> M(int x, List<int> items)\n    {{\n        {} {}\n        return null;\n    }}\n}}\n",
            HEADERS[header], text
        );
        let diagnostics = run(Box::new(BracesForControlFlow::new()), &source);
        prop_assert_eq!(diagnostics.len(), usize::from(!is_jump), "{}", source);
    }

    #[test]
    fn else_bodies_follow_the_same_policy(statement in 0..STATEMENTS.len()) {
        let (text, is_jump) = STATEMENTS[statement];
        let source = format!(
            "class C\n{{\n    void M(int x)\n    {{\n        if (x > 0) {{ x--; }}\n        else {}\n    }}\n}}\n",
            text
        );
        let diagnostics = run(Box::new(BracesForControlFlow::new()), &source);
        prop_assert_eq!(diagnostics.len(), usize::from(!is_jump));
    }

    #[test]
    fn duplicate_reports_do_not_depend_on_parameter_order(
        (types, shuffled) in prop::collection::vec(parameter_type(), 2..7)
            .prop_flat_map(|types| (Just(types.clone()), Just(types).prop_shuffle())),
    ) {
        let rule = || -> RuleBox { Box::new(DuplicateConstructorParameterType::new()) };
        let first = run(rule(), &constructor(&types));
        let second = run(rule(), &constructor(&shuffled));

        prop_assert_eq!(first.len(), expected_reports(&types));
        prop_assert_eq!(second.len(), first.len());

        let mut first_types: Vec<String> = first.iter().map(|d| d.args[0].clone()).collect();
        let mut second_types: Vec<String> = second.iter().map(|d| d.args[0].clone()).collect();
        first_types.sort();
        second_types.sort();
        prop_assert_eq!(first_types, second_types);
    }
}
