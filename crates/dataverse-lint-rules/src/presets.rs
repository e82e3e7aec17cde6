//! Rule sets shipped with the linter.

use crate::{
    BracesForControlFlow, DuplicateConstructorParameterType, EntityContains, EnumAssignment,
    FilteredAttributesOnCreate, GetTargetNaming, MergedTargetNaming, NoBracesForControlFlow,
    ObjectInitialization, PluginDocumentation, PostImageOnDelete, PreImageOnCreate,
};
use dataverse_lint_core::{CatalogError, RuleBox, RuleCatalog};

/// Named rule selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every rule, CT0001 to CT0012.
    All,
    /// Only the rules that carry an automatic fix.
    Fixable,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::All => all_rules(),
            Self::Fixable => all_rules()
                .into_iter()
                .filter(|rule| rule.fix().is_some())
                .collect(),
        }
    }

    /// Builds a catalog for this preset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] if two rules share a code.
    pub fn catalog(self) -> Result<RuleCatalog, CatalogError> {
        let catalog = RuleCatalog::new(self.rules())?;
        tracing::debug!(preset = ?self, rules = catalog.len(), "Built rule catalog");
        Ok(catalog)
    }
}

/// Returns every rule, ordered by code.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(BracesForControlFlow::new()),
        Box::new(EnumAssignment::new()),
        Box::new(ObjectInitialization::new()),
        Box::new(NoBracesForControlFlow::new()),
        Box::new(DuplicateConstructorParameterType::new()),
        Box::new(PluginDocumentation::new()),
        Box::new(EntityContains::new()),
        Box::new(FilteredAttributesOnCreate::new()),
        Box::new(PreImageOnCreate::new()),
        Box::new(PostImageOnDelete::new()),
        Box::new(GetTargetNaming::new()),
        Box::new(MergedTargetNaming::new()),
    ]
}

/// Catalog of every rule.
///
/// # Errors
///
/// Only fails if the built-in codes collide, which the tests rule out.
pub fn default_catalog() -> Result<RuleCatalog, CatalogError> {
    Preset::All.catalog()
}
