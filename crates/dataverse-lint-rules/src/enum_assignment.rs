//! Rule against assigning numeric literals to enum-typed targets.
//!
//! `account.StateCode = 1;` compiles when the literal converts, but hides
//! which member was meant. Targets typed `Enum?` are unwrapped once before
//! the check.

use dataverse_lint_core::chain::member_name;
use dataverse_lint_core::{
    Category, Diagnostic, Resolver, Rule, RuleContext, SyntaxKind, SyntaxNode,
};

/// Rule code for enum-assignment.
pub const CODE: &str = "CT0002";

/// Rule name for enum-assignment.
pub const NAME: &str = "enum-assignment";

/// Flags numeric literals assigned to enum targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumAssignment;

impl EnumAssignment {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for EnumAssignment {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Enum-typed targets must be assigned enum members, not numeric literals"
    }

    fn category(&self) -> Category {
        Category::Usage
    }

    fn message_format(&self) -> &'static str {
        "Assign an enum member to '{0}' instead of the literal {1}"
    }

    fn triggers(&self) -> &'static [SyntaxKind] {
        &[
            SyntaxKind::SimpleAssignmentExpression,
            SyntaxKind::PropertyDeclaration,
        ]
    }

    fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let (target, value) = match node.kind() {
            SyntaxKind::SimpleAssignmentExpression => {
                let mut operands = node.child_nodes();
                let (Some(left), Some(right)) = (operands.next(), operands.next()) else {
                    return Vec::new();
                };
                (left, right)
            }
            _ => {
                let Some(value) = node
                    .child_of_kind(SyntaxKind::EqualsValueClause)
                    .and_then(|clause| clause.child_nodes().next())
                else {
                    return Vec::new();
                };
                (node.clone(), value)
            }
        };

        let Some(literal) = numeric_literal(&value) else {
            return Vec::new();
        };
        let Some(ty) = ctx.resolver().type_of(&target) else {
            return Vec::new();
        };
        if !Resolver::unwrap_optional(&ty).is_enum() {
            return Vec::new();
        }

        let name = target_name(&target);
        vec![ctx.diagnostic(self, value.span(), &[&name, &literal.text()])]
    }
}

/// The numeric literal `value` is, looking through casts and parentheses.
fn numeric_literal(value: &SyntaxNode) -> Option<SyntaxNode> {
    let mut current = value.clone();
    loop {
        match current.kind() {
            SyntaxKind::NumericLiteralExpression => return Some(current),
            SyntaxKind::CastExpression | SyntaxKind::ParenthesizedExpression => {
                current = current
                    .child_nodes()
                    .filter(|n| n.kind().is_expression())
                    .last()?;
            }
            _ => return None,
        }
    }
}

fn target_name(target: &SyntaxNode) -> String {
    let name = match target.kind() {
        SyntaxKind::PropertyDeclaration | SyntaxKind::IdentifierName => target.identifier(),
        SyntaxKind::SimpleMemberAccessExpression => {
            member_name(target).and_then(|name| name.identifier())
        }
        _ => None,
    };
    name.map_or_else(|| "property".to_string(), |t| t.text().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, flagged};

    const TYPES: &str = "
public enum Status { Active = 0, Inactive = 1 }

public class Account
{
    public Status Status { get; set; }
    public Status? StateCode { get; set; }
    public int Count { get; set; }
}
";

    fn check_body(body: &str) -> (String, Vec<Diagnostic>) {
        let source = format!(
            "{TYPES}\npublic class Worker\n{{\n    private Status _status;\n\n    public void Run(Account account, Status input, int value)\n    {{\n{body}\n    }}\n}}\n"
        );
        let diagnostics = check(EnumAssignment::new(), &source);
        (source, diagnostics)
    }

    #[test]
    fn test_reports_literal_assigned_to_local_enum() {
        let (source, diagnostics) = check_body("        Status status = Status.Active;\n        status = 2;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(&source, &diagnostics[0]), "2");
        assert_eq!(diagnostics[0].args, vec!["status", "2"]);
        insta::assert_snapshot!(
            diagnostics[0].message,
            @"Assign an enum member to 'status' instead of the literal 2"
        );
    }

    #[test]
    fn test_unwraps_nullable_enum() {
        let (_, diagnostics) = check_body("        account.StateCode = 1;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["StateCode", "1"]);
    }

    #[test]
    fn test_reports_fields_and_object_initializers() {
        let (_, diagnostics) =
            check_body("        _status = 1;\n        var a = new Account { Status = 0, Count = 3 };");
        let names: Vec<&str> = diagnostics.iter().map(|d| d.args[0].as_str()).collect();
        assert_eq!(names, vec!["_status", "Status"]);
    }

    #[test]
    fn test_cast_of_literal_counts_as_literal() {
        let (source, diagnostics) = check_body("        account.Status = (Status)1;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(flagged(&source, &diagnostics[0]), "(Status)1");
        assert_eq!(diagnostics[0].args[1], "1");
    }

    #[test]
    fn test_ignores_members_variables_and_casts_of_variables() {
        let (_, diagnostics) = check_body(
            "        account.Status = Status.Inactive;\n        account.Status = input;\n        account.Status = (Status)value;\n        account.Count = 4;",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_reports_property_initializer() {
        let source = format!("{TYPES}\npublic class Defaults\n{{\n    public Status Initial {{ get; set; }} = 1;\n}}\n");
        let diagnostics = check(EnumAssignment::new(), &source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, vec!["Initial", "1"]);
    }

    #[test]
    fn test_unresolved_target_is_ignored() {
        let source = "class C { void M() { unknown.Value = 1; } }";
        assert!(check(EnumAssignment::new(), source).is_empty());
    }
}
