//! # dataverse-lint-core
//!
//! Core engine for linting C# Dataverse plugin code over a full-fidelity
//! syntax tree.
//!
//! This crate provides the language-neutral machinery rules are built on:
//!
//! - [`syntax`]: immutable green/red tree with trivia and stable spans
//! - [`semantic`]: the [`SemanticModel`] trait and the [`Resolver`] queries
//! - [`docs`] and [`chain`]: helpers for documentation trivia and fluent chains
//! - [`Rule`], [`RuleCatalog`] and [`Dispatcher`] for routing nodes to rules
//! - [`rewrite`]: pure tree-to-tree fixes and batch application
//! - [`Analyzer`] for discovering, parsing and checking a whole project
//!
//! ## Example
//!
//! ```ignore
//! use dataverse_lint_core::{Analyzer, RuleCatalog};
//!
//! let catalog = RuleCatalog::new(rules)?;
//! let analyzer = Analyzer::builder(frontend, catalog)
//!     .root("./Plugins")
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod cancellation;
mod catalog;
mod config;
mod context;
mod dispatcher;
mod rule;
mod types;

pub mod chain;
pub mod docs;
pub mod rewrite;
pub mod semantic;
pub mod syntax;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, Frontend};
pub use cancellation::CancellationToken;
pub use catalog::{CatalogError, RuleCatalog};
pub use config::{AnalyzerConfig, Config, ConfigError, CONFIG_FILE_NAMES};
pub use context::RuleContext;
pub use dispatcher::{DiagnosticSink, DispatchError, DispatchReport, Dispatcher};
pub use rewrite::{
    apply_batch, apply_fix, BatchOutcome, FixKind, RewriteEdit, RewriteError, SkipReason,
    SkippedEdit,
};
pub use rule::{format_message, Rule, RuleBox};
pub use semantic::{EmptyModel, MethodSymbol, Resolver, SemanticModel, TypeSymbol};
pub use syntax::{SyntaxKind, SyntaxNode, SyntaxTree, TextRange};
pub use types::{
    Category, Diagnostic, DiagnosticReport, LintResult, Location, RuleFailure, Severity,
    Suggestion,
};
