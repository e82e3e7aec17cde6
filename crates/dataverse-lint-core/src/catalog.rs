//! Immutable rule catalog with a kind-keyed dispatch table.

use crate::rule::{Rule, RuleBox};
use crate::syntax::SyntaxKind;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors building or filtering a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two rules share a code.
    #[error("duplicate rule code: {0}")]
    DuplicateCode(String),

    /// A selector matched no rule code or name.
    #[error("unknown rule: {0}")]
    UnknownRule(String),
}

/// The set of rules for a run, built once and shared read-only.
#[derive(Clone)]
pub struct RuleCatalog {
    rules: Vec<Arc<dyn Rule>>,
    by_kind: HashMap<SyntaxKind, Vec<usize>>,
}

impl std::fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleCatalog")
            .field("codes", &self.codes())
            .finish()
    }
}

impl RuleCatalog {
    /// Builds a catalog from boxed rules.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] if two rules share a code.
    pub fn new(rules: Vec<RuleBox>) -> Result<Self, CatalogError> {
        Self::from_shared(rules.into_iter().map(Arc::from).collect())
    }

    /// Builds a catalog from shared rules.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] if two rules share a code.
    pub fn from_shared(rules: Vec<Arc<dyn Rule>>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut by_kind: HashMap<SyntaxKind, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            if !seen.insert(rule.code()) {
                return Err(CatalogError::DuplicateCode(rule.code().to_string()));
            }
            // A rule listing a kind twice is still evaluated once per node.
            let kinds: HashSet<SyntaxKind> = rule.triggers().iter().copied().collect();
            for kind in kinds {
                by_kind.entry(kind).or_default().push(index);
            }
        }
        Ok(Self { rules, by_kind })
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the catalog holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| &**r)
    }

    /// Rule codes in registration order.
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.code()).collect()
    }

    /// Rule at `index`.
    #[must_use]
    pub fn rule(&self, index: usize) -> Option<&dyn Rule> {
        self.rules.get(index).map(|r| &**r)
    }

    /// Indices of the rules triggered by `kind`.
    #[must_use]
    pub fn rules_for(&self, kind: SyntaxKind) -> &[usize] {
        match self.by_kind.get(&kind) {
            Some(indices) => indices,
            None => &[],
        }
    }

    /// Looks up a rule by code (case-insensitive) or name.
    #[must_use]
    pub fn get(&self, selector: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.code().eq_ignore_ascii_case(selector) || r.name() == selector)
            .map(|r| &**r)
    }

    /// Sub-catalog holding only the selected rules, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownRule`] for a selector matching nothing.
    pub fn filter<S: AsRef<str>>(&self, selectors: &[S]) -> Result<Self, CatalogError> {
        let mut wanted = HashSet::new();
        for selector in selectors {
            let selector = selector.as_ref().trim();
            let rule = self
                .get(selector)
                .ok_or_else(|| CatalogError::UnknownRule(selector.to_string()))?;
            wanted.insert(rule.code());
        }
        Self::from_shared(
            self.rules
                .iter()
                .filter(|r| wanted.contains(r.code()))
                .cloned()
                .collect(),
        )
    }
}
