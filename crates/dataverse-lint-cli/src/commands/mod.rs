//! Subcommand implementations.

pub mod check;
pub mod fix;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::{Context, Result};
use dataverse_lint_core::RuleCatalog;

/// The default catalog, narrowed to `--rules` when given.
pub fn select_rules(filter: Option<&str>) -> Result<RuleCatalog> {
    let catalog = dataverse_lint_rules::default_catalog().context("Invalid rule catalog")?;
    let Some(filter) = filter else {
        return Ok(catalog);
    };
    let selectors: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    catalog
        .filter(&selectors)
        .with_context(|| format!("Invalid --rules value '{filter}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_rules_accepts_codes_and_names() {
        let catalog = select_rules(Some("CT0001, entity-contains,")).unwrap();
        assert_eq!(catalog.codes(), vec!["CT0001", "CT0007"]);
    }

    #[test]
    fn select_rules_defaults_to_everything() {
        assert_eq!(select_rules(None).unwrap().len(), 12);
    }

    #[test]
    fn unknown_rule_is_an_error() {
        let err = select_rules(Some("CT9999")).unwrap_err();
        assert!(format!("{err:#}").contains("CT9999"));
    }
}
