//! Rule against post-images on `Delete` step registrations.

use crate::plugin_step::{step_call, StepCall};
use dataverse_lint_core::{
    Category, Diagnostic, Rule, RuleContext, Severity, SyntaxKind, SyntaxNode,
};

/// Rule code for post-image-on-delete.
pub const CODE: &str = "CT0010";

/// Rule name for post-image-on-delete.
pub const NAME: &str = "post-image-on-delete";

/// Flags a post-image on a `Delete` registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostImageOnDelete;

impl PostImageOnDelete {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for PostImageOnDelete {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "A deleted record has no state left to capture in a post-image"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn message_format(&self) -> &'static str {
        "Image type '{0}' includes a post-image, which Delete steps do not have"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::InvocationExpression]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        match step_call(node, "AddImage") {
            Some(StepCall {
                operation: Some("Delete"),
                image_type: Some(image @ ("PostImage" | "Both")),
            }) => vec![ctx.diagnostic(self, node.span(), &[image])],
            _ => Vec::new(),
        }
    }
}
