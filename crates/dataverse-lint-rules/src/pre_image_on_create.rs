//! Rule against pre-images on `Create` step registrations.

use crate::plugin_step::{step_call, StepCall};
use dataverse_lint_core::{
    Category, Diagnostic, Rule, RuleContext, Severity, SyntaxKind, SyntaxNode,
};

/// Rule code for pre-image-on-create.
pub const CODE: &str = "CT0009";

/// Rule name for pre-image-on-create.
pub const NAME: &str = "pre-image-on-create";

/// Flags a pre-image on a `Create` registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreImageOnCreate;

impl PreImageOnCreate {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for PreImageOnCreate {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "A record being created has no prior state to capture in a pre-image"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn message_format(&self) -> &'static str {
        "Image type '{0}' includes a pre-image, which Create steps do not have"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::InvocationExpression]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        match step_call(node, "AddImage") {
            Some(StepCall {
                operation: Some("Create"),
                image_type: Some(image @ ("PreImage" | "Both")),
            }) => vec![ctx.diagnostic(self, node.span(), &[image])],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn test_metadata() {
        let rule = PreImageOnCreate::new();
        assert_eq!(rule.code(), "CT0009");
        assert_eq!(rule.name(), "pre-image-on-create");
    }

    #[test]
    fn test_reports_image_type() {
        let source = "class P\n{\n    P()\n    {\n        RegisterPluginStep<Account>(EventOperation.Create, Stage, Execute).AddImage(ImageType.PreImage);\n    }\n}\n";
        let diagnostics = check(PreImageOnCreate::new(), source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["PreImage"]);
    }
}
