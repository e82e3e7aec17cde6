//! List rules command implementation.

use anyhow::Result;
use dataverse_lint_rules::{all_rules, Preset};
use std::io::Write;

/// Runs the list-rules command.
pub fn run() -> Result<()> {
    let mut out = std::io::stdout().lock();

    writeln!(out, "Available rules:\n")?;
    writeln!(
        out,
        "{:<8} {:<34} {:<14} {:<9} Fix",
        "Code", "Name", "Category", "Severity"
    )?;
    writeln!(out, "{}", "-".repeat(90))?;

    for rule in all_rules() {
        writeln!(
            out,
            "{:<8} {:<34} {:<14} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.category().to_string(),
            rule.default_severity().to_string(),
            rule.fix().map_or("-", |fix| fix.title())
        )?;
    }

    let fixable: Vec<&str> = Preset::Fixable.rules().iter().map(|r| r.code()).collect();
    writeln!(out, "\nAutomatic fixes: {}", fixable.join(", "))?;

    writeln!(out, "\nUse --rules to select specific rules, e.g.:")?;
    writeln!(out, "  dataverse-lint check --rules CT0001,CT0004")?;
    writeln!(out, "  dataverse-lint check --rules entity-contains")?;
    writeln!(out, "  dataverse-lint fix --rules braces-for-control-flow")?;

    Ok(())
}
