//! Rule against injecting the same service type twice.
//!
//! A constructor taking two `IOrganizationService` parameters usually means
//! one of them was meant to be something else. Only dependency-injection
//! style types are considered, recognised by their simple-name suffix, so
//! `string a, string b` never fires.

use dataverse_lint_core::{
    Category, Diagnostic, Rule, RuleContext, SyntaxKind, SyntaxNode, TypeSymbol,
};
use std::sync::Arc;

/// Rule code for duplicate-constructor-parameter-type.
pub const CODE: &str = "CT0005";

/// Rule name for duplicate-constructor-parameter-type.
pub const NAME: &str = "duplicate-constructor-parameter-type";

/// Simple-name suffixes of injectable service types.
pub const DI_SUFFIXES: &[&str] = &[
    "Service",
    "Repository",
    "Handler",
    "Provider",
    "Factory",
    "Manager",
    "Client",
];

/// Flags constructors that take one service type more than once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateConstructorParameterType;

impl DuplicateConstructorParameterType {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for DuplicateConstructorParameterType {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Constructors should not take several parameters of the same service type"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn message_format(&self) -> &'static str {
        "Constructor takes '{0}' more than once: {1}"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[
            SyntaxKind::ConstructorDeclaration,
            SyntaxKind::ClassDeclaration,
            SyntaxKind::StructDeclaration,
            SyntaxKind::RecordDeclaration,
            SyntaxKind::RecordStructDeclaration,
        ]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let Some(list) = node.child_of_kind(SyntaxKind::ParameterList) else {
            return Vec::new();
        };
        let parameters = list.children_of_kind(SyntaxKind::Parameter);
        if parameters.len() < 2 {
            return Vec::new();
        }

        let resolver = ctx.resolver();
        let mut groups: Vec<(Arc<TypeSymbol>, Vec<String>)> = Vec::new();
        for parameter in &parameters {
            if parameter.find_child(SyntaxKind::is_type).is_none() {
                continue;
            }
            let (Some(ty), Some(name)) = (resolver.type_of(parameter), parameter.identifier())
            else {
                continue;
            };
            if !is_injectable(&ty) {
                continue;
            }
            match groups.iter_mut().find(|(seen, _)| *seen == ty) {
                Some((_, names)) => names.push(name.text().to_string()),
                None => groups.push((ty, vec![name.text().to_string()])),
            }
        }

        groups
            .into_iter()
            .filter(|(_, names)| names.len() >= 2)
            .map(|(ty, names)| {
                ctx.diagnostic(self, list.span(), &[&ty.display_name(), &names.join(", ")])
            })
            .collect()
    }
}

fn is_injectable(ty: &TypeSymbol) -> bool {
    DI_SUFFIXES.iter().any(|suffix| ty.name().ends_with(suffix))
}
