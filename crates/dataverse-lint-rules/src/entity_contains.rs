//! Rule against `Entity.Contains(string)`.
//!
//! `entity.Contains("name")` only says the attribute is present in this
//! payload, which callers routinely mistake for "has a value". Reading the
//! value through `GetAttributeValue<T>` makes the intent explicit. Calls on
//! `entity.Attributes` are a different method and are not reported.

use dataverse_lint_core::chain::{argument_expressions, argument_list, invocation_callee};
use dataverse_lint_core::chain::{invoked_name, member_receiver};
use dataverse_lint_core::semantic::SpecialType;
use dataverse_lint_core::{
    Category, Diagnostic, Resolver, Rule, RuleContext, SyntaxKind, SyntaxNode,
};

/// Rule code for entity-contains.
pub const CODE: &str = "CT0007";

/// Rule name for entity-contains.
pub const NAME: &str = "entity-contains";

/// Namespace of the SDK `Entity` type.
pub const ENTITY_NAMESPACE: &str = "Microsoft.Xrm.Sdk";

/// Flags `Contains(string)` called on an `Entity` or a subclass of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityContains;

impl EntityContains {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for EntityContains {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Entity.Contains checks presence only; read attributes with GetAttributeValue"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn message_format(&self) -> &'static str {
        "Do not use Entity.Contains for '{0}'; use GetAttributeValue instead"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::InvocationExpression]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let Some(callee) = invocation_callee(node) else {
            return Vec::new();
        };
        if callee.kind() != SyntaxKind::SimpleMemberAccessExpression
            || invoked_name(node).as_deref() != Some("Contains")
        {
            return Vec::new();
        }

        let resolver = ctx.resolver();
        let Some(method) = resolver.method_of(node) else {
            return Vec::new();
        };
        if !method.has_single_parameter_of(SpecialType::String) {
            return Vec::new();
        }
        let Some(receiver_type) = member_receiver(&callee).and_then(|r| resolver.type_of(&r))
        else {
            return Vec::new();
        };
        if !Resolver::base_chain_contains(&receiver_type, ENTITY_NAMESPACE, "Entity") {
            return Vec::new();
        }

        let attribute = attribute_name(node);
        vec![ctx.diagnostic(self, node.span(), &[&attribute])]
    }
}

/// Value of the single literal argument, or `attribute`.
fn attribute_name(invocation: &SyntaxNode) -> String {
    let arguments = argument_list(invocation)
        .map(|list| argument_expressions(&list))
        .unwrap_or_default();
    match arguments.as_slice() {
        [literal] if literal.kind() == SyntaxKind::StringLiteralExpression => {
            string_value(&literal.text())
        }
        [literal] if literal.kind().is_literal()
            && literal.kind() != SyntaxKind::InterpolatedStringExpression =>
        {
            literal.text()
        }
        _ => "attribute".to_string(),
    }
}

/// Contents of a regular, verbatim or raw string literal, without quotes.
fn string_value(text: &str) -> String {
    let body = text.trim_start_matches('@');
    let quotes = body.len() - body.trim_start_matches('"').len();
    let inner = body
        .get(quotes..body.len().saturating_sub(quotes))
        .unwrap_or_default();
    if text.starts_with('@') {
        inner.replace("\"\"", "\"")
    } else {
        inner.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, flagged};

    fn plugin(body: &str) -> String {
        format!(
            "using Microsoft.Xrm.Sdk;\n\npublic class Account : Entity {{ }}\n\npublic class Job\n{{\n    public void Run(Entity entity, Account account, string name)\n    {{\n{body}\n    }}\n}}\n"
        )
    }

    #[test]
    fn test_reports_contains_on_entity() {
        let source = plugin("        if (entity.Contains(\"name\")) { }");
        let diagnostics = check(EntityContains::new(), &source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(&source, &diagnostics[0]), "entity.Contains(\"name\")");
        insta::assert_snapshot!(
            diagnostics[0].message,
            @"Do not use Entity.Contains for 'name'; use GetAttributeValue instead"
        );
    }

    #[test]
    fn test_reports_subclasses_and_uses_placeholder() {
        let source = plugin("        var a = account.Contains(name);\n        var b = account.Contains(@\"x\"\"y\");");
        let names: Vec<String> = check(EntityContains::new(), &source)
            .into_iter()
            .map(|d| d.args[0].clone())
            .collect();
        assert_eq!(names, vec!["attribute", "x\"y"]);
    }

    #[test]
    fn test_ignores_attribute_collection_and_other_types() {
        let source = plugin(
            "        var a = entity.Attributes.Contains(\"name\");\n        var b = name.Contains(\"x\");\n        var c = new List<string>().Contains(\"x\");",
        );
        assert!(check(EntityContains::new(), &source).is_empty());
    }

    #[test]
    fn test_ignores_lookalike_entity_outside_sdk() {
        let source = "namespace Fake { public class Entity { public bool Contains(string key) => true; } }\n\
                      namespace App { using Fake; class Job { void Run(Entity e) { var x = e.Contains(\"a\"); } } }";
        assert!(check(EntityContains::new(), source).is_empty());
    }

    #[test]
    fn test_string_value_unquotes() {
        assert_eq!(string_value("\"name\""), "name");
        assert_eq!(string_value("@\"a\"\"b\""), "a\"b");
        assert_eq!(string_value("\"\"\"raw\"\"\""), "raw");
    }
}
