//! Rule requiring documentation on plugin classes.
//!
//! Every class deriving from `Plugin` or implementing `IPlugin` must carry a
//! `/// <summary>` with real text, or an `<inheritdoc/>`. The plugin base is
//! recognised from the written base list, so unresolved framework types
//! still count, and from the bound base chain, so indirect subclasses do too.

use dataverse_lint_core::docs::DocComment;
use dataverse_lint_core::{
    Category, Diagnostic, Resolver, Rule, RuleContext, SyntaxKind, SyntaxNode,
};

/// Rule code for plugin-documentation.
pub const CODE: &str = "CT0006";

/// Rule name for plugin-documentation.
pub const NAME: &str = "plugin-documentation";

const PLUGIN_BASES: &[&str] = &["Plugin", "IPlugin"];

/// Flags undocumented plugin classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginDocumentation;

impl PluginDocumentation {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for PluginDocumentation {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Plugin classes must have a non-empty summary or inheritdoc"
    }

    fn category(&self) -> Category {
        Category::Documentation
    }

    fn message_format(&self) -> &'static str {
        "Plugin class '{0}' must be documented with a <summary> or <inheritdoc/>"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::ClassDeclaration]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let Some(identifier) = node.identifier() else {
            return Vec::new();
        };
        if !names_plugin_base(node) && !derives_from_plugin(ctx, node) {
            return Vec::new();
        }
        if DocComment::of(node).is_documented() {
            return Vec::new();
        }
        vec![ctx.diagnostic(self, identifier.span(), &[identifier.text()])]
    }
}

/// The base list mentions `Plugin` or `IPlugin`, qualified or not.
fn names_plugin_base(class: &SyntaxNode) -> bool {
    let Some(bases) = class.child_of_kind(SyntaxKind::BaseList) else {
        return false;
    };
    bases
        .children_of_kind(SyntaxKind::SimpleBaseType)
        .iter()
        .filter_map(|base| base.find_child(SyntaxKind::is_type))
        .filter_map(|ty| rightmost_name(&ty))
        .any(|name| PLUGIN_BASES.contains(&name.as_str()))
}

fn rightmost_name(ty: &SyntaxNode) -> Option<String> {
    match ty.kind() {
        SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
            ty.identifier().map(|t| t.text().to_string())
        }
        SyntaxKind::QualifiedName => rightmost_name(&ty.child_nodes().last()?),
        _ => None,
    }
}

/// Some base type or interface of the declared class is a plugin base. The
/// class itself does not count, so the `Plugin` base never reports itself.
fn derives_from_plugin(ctx: &RuleContext<'_>, class: &SyntaxNode) -> bool {
    let Some(ty) = ctx.resolver().type_of(class) else {
        return false;
    };
    ty.base_type()
        .into_iter()
        .chain(ty.interfaces())
        .any(|parent| PLUGIN_BASES.iter().any(|name| Resolver::implements(parent, name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, check_files, flagged};

    #[test]
    fn test_reports_undocumented_plugin() {
        let source = "public class X : Plugin { }";
        let diagnostics = check(PluginDocumentation::new(), source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(source, &diagnostics[0]), "X");
        insta::assert_snapshot!(
            diagnostics[0].message,
            @"Plugin class 'X' must be documented with a <summary> or <inheritdoc/>"
        );
    }

    #[test]
    fn test_summary_or_inheritdoc_satisfies() {
        for doc in [
            "/// <summary>text</summary>",
            "/// <summary>\n/// Handles account creation.\n/// </summary>",
            "/// <inheritdoc/>",
            "/// <inheritdoc cref=\"Plugin\" />",
        ] {
            let source = format!("{doc}\npublic class X : Plugin {{ }}");
            assert!(check(PluginDocumentation::new(), &source).is_empty(), "{doc}");
        }
    }

    #[test]
    fn test_blank_or_foreign_docs_do_not_count() {
        for doc in [
            "/// <summary></summary>",
            "/// <summary>   </summary>",
            "/// <remarks>text</remarks>",
            "// <summary>plain comment</summary>",
            "/// <inheritdoc>text</inheritdoc>",
        ] {
            let source = format!("{doc}\npublic class X : Plugin {{ }}");
            assert_eq!(check(PluginDocumentation::new(), &source).len(), 1, "{doc}");
        }
    }

    #[test]
    fn test_nested_tags_satisfy() {
        for doc in [
            "/// <remarks><inheritdoc/></remarks>",
            "/// <remarks><summary>Creates accounts.</summary></remarks>",
        ] {
            let source = format!("{doc}\npublic class X : Plugin {{ }}");
            assert!(check(PluginDocumentation::new(), &source).is_empty(), "{doc}");
        }
    }

    #[test]
    fn test_doc_before_attributes_and_modifiers() {
        let source = "/// <summary>Creates accounts.</summary>\n[Serializable]\npublic sealed class X : Microsoft.Xrm.Sdk.IPlugin { }";
        assert!(check(PluginDocumentation::new(), source).is_empty());
    }

    #[test]
    fn test_recognises_indirect_plugins_across_files() {
        let diagnostics = check_files(
            PluginDocumentation::new(),
            &[
                (
                    "PluginBase.cs",
                    "using Microsoft.Xrm.Sdk;\n/// <summary>Base.</summary>\npublic abstract class PluginBase : IPlugin { }",
                ),
                ("AccountPlugin.cs", "public class AccountPlugin : PluginBase { }"),
            ],
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["AccountPlugin"]);
    }

    #[test]
    fn test_plugin_base_and_unrelated_classes_are_ignored() {
        let source = "public abstract class Plugin { }\npublic class Helper { }\npublic class Other : Exception { }";
        assert!(check(PluginDocumentation::new(), source).is_empty());
    }

    #[test]
    fn test_nested_plugin_classes_are_checked() {
        let source = "/// <summary>Outer.</summary>\npublic class Outer\n{\n    private class Inner : Plugin { }\n}";
        let diagnostics = check(PluginDocumentation::new(), source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["Inner"]);
    }
}
