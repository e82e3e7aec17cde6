//! Rule against attribute filters on `Create` step registrations.

use crate::plugin_step::{step_call, StepCall};
use dataverse_lint_core::{
    Category, Diagnostic, Rule, RuleContext, Severity, SyntaxKind, SyntaxNode,
};

/// Rule code for filtered-attributes-on-create.
pub const CODE: &str = "CT0008";

/// Rule name for filtered-attributes-on-create.
pub const NAME: &str = "filtered-attributes-on-create";

/// Flags `AddFilteredAttributes` on a `Create` registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilteredAttributesOnCreate;

impl FilteredAttributesOnCreate {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for FilteredAttributesOnCreate {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Create steps fire for every new record; attribute filters have no effect on them"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn message_format(&self) -> &'static str {
        "Filtered attributes are not supported on Create steps"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::InvocationExpression]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        match step_call(node, "AddFilteredAttributes") {
            Some(StepCall {
                operation: Some("Create"),
                ..
            }) => vec![ctx.diagnostic(self, node.span(), &[])],
            _ => Vec::new(),
        }
    }
}
