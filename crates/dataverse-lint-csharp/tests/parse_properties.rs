//! Parser fidelity over arbitrary and C#-shaped input.

use dataverse_lint_core::syntax::SyntaxKind;
use dataverse_lint_csharp::{parse, tokenize};
use proptest::prelude::*;
use std::path::Path;

const FRAGMENTS: &[&str] = &[
    "class", "C", "{", "}", "(", ")", ";", "if", "else", "x", "=", "==", "new", "Entity", "<",
    ">", "[", "]", ".", ",", "return", "\"s\"", "@\"v\"", "$\"{x}\"", "'c'", "1.5m", "// note\n",
    "/* b */", "#region r\n", "=>", "?.", "??", "async", "await", "partial", "var", "foreach",
    "in", " ", "\n", "\t", "using", "namespace", "N", ":", "get", "set", "init", "@class",
];

fn snippet() -> impl Strategy<Value = String> {
    prop::collection::vec(0..FRAGMENTS.len(), 0..64)
        .prop_map(|picks| picks.into_iter().map(|i| FRAGMENTS[i]).collect())
}

proptest! {
    #[test]
    fn arbitrary_text_round_trips(source in any::<String>()) {
        let tree = parse(Path::new("Prop.cs"), &source);
        prop_assert_eq!(tree.text(), source);
    }

    #[test]
    fn token_soup_round_trips(source in snippet()) {
        let tree = parse(Path::new("Soup.cs"), &source);
        prop_assert_eq!(tree.root().kind(), SyntaxKind::CompilationUnit);
        prop_assert_eq!(tree.text(), source);
    }

    #[test]
    fn tokens_cover_every_byte(source in snippet()) {
        let total: usize = tokenize(&source).iter().map(|t| t.full_len()).sum();
        prop_assert_eq!(total, source.len());
    }
}

#[test]
fn unterminated_constructs_still_round_trip() {
    for source in ["\"never closed", "/* open comment", "@\"verbatim"] {
        assert_eq!(parse(Path::new("Broken.cs"), source).text(), source);
    }
    for source in [
        "class A { void M() { if (x",
        "namespace N { class B : { } ",
        "#if DEBUG\nclass C {",
    ] {
        let tree = parse(Path::new("Broken.cs"), source);
        assert_eq!(tree.text(), source);
        assert!(!tree.errors().is_empty(), "expected errors for {source:?}");
    }
}

#[test]
fn declaration_outline_snapshot() {
    let source = "namespace Contoso.Plugins\n{\n    public partial class AccountPlugin : PluginBase\n    {\n        public AccountPlugin(string unsecure) { }\n        public required string Name { get; init; }\n        private async Task RunAsync() { await Task.Delay(1); }\n    }\n}\n";
    let tree = parse(Path::new("AccountPlugin.cs"), source);
    let outline: Vec<String> = tree
        .root()
        .descendants()
        .filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::NamespaceDeclaration
                    | SyntaxKind::ClassDeclaration
                    | SyntaxKind::ConstructorDeclaration
                    | SyntaxKind::PropertyDeclaration
                    | SyntaxKind::MethodDeclaration
            )
        })
        .map(|n| {
            let name = n.identifier().map(|t| t.text().to_string()).unwrap_or_default();
            format!("{:?} {name}", n.kind()).trim_end().to_string()
        })
        .collect();
    insta::assert_snapshot!(outline.join("\n"), @r"
    NamespaceDeclaration
    ClassDeclaration AccountPlugin
    ConstructorDeclaration AccountPlugin
    PropertyDeclaration Name
    MethodDeclaration RunAsync
    ");
}
