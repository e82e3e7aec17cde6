//! The rule trait.

use crate::context::RuleContext;
use crate::rewrite::FixKind;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::types::{Category, Diagnostic, Severity};

/// A stateless check evaluated once per matching node.
///
/// Rules declare the node kinds they trigger on; the dispatcher calls
/// [`Rule::check`] for every node of those kinds. A rule must not keep state
/// between calls: the same instance is shared by every worker thread.
///
/// # Example
///
/// ```ignore
/// use dataverse_lint_core::{Category, Diagnostic, Rule, RuleContext, SyntaxKind, SyntaxNode};
///
/// pub struct NoEmptyStatements;
///
/// impl Rule for NoEmptyStatements {
///     fn code(&self) -> &'static str { "CT9000" }
///     fn name(&self) -> &'static str { "no-empty-statements" }
///     fn category(&self) -> Category { Category::Style }
///     fn message_format(&self) -> &'static str { "Remove the empty statement" }
///     fn triggers(&self) -> &'static [SyntaxKind] { &[SyntaxKind::EmptyStatement] }
///
///     fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
///         vec![ctx.diagnostic(self, node.span(), &[])]
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the stable rule code (e.g., "CT0001").
    fn code(&self) -> &'static str;

    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the rule's category.
    fn category(&self) -> Category;

    /// Returns the severity of diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Message template with positional `{0}`, `{1}`, ... placeholders.
    fn message_format(&self) -> &'static str;

    /// Node kinds this rule is evaluated on.
    fn triggers(&self) -> &'static [SyntaxKind];

    /// Automatic fix offered for this rule's diagnostics, if any.
    fn fix(&self) -> Option<FixKind> {
        None
    }

    /// Checks one node and returns any diagnostics.
    ///
    /// Shapes the rule does not expect (missing children, unresolved types)
    /// yield no diagnostics rather than errors.
    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Substitutes positional `{n}` placeholders. Placeholders without a
/// matching argument are left as written.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
