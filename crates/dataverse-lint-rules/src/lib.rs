//! # dataverse-lint-rules
//!
//! Built-in rules for C# Dataverse plugin code.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | CT0001 | `braces-for-control-flow` | Braces around non-jump `if`/`else`/loop bodies (fixable) |
//! | CT0002 | `enum-assignment` | Enum targets are assigned members, not numeric literals |
//! | CT0003 | `object-initialization` | No `()` before an object initializer |
//! | CT0004 | `no-braces-for-control-flow` | No braces around a lone jump statement (fixable) |
//! | CT0005 | `duplicate-constructor-parameter-type` | A service type is injected once |
//! | CT0006 | `plugin-documentation` | Plugin classes carry a summary or inheritdoc |
//! | CT0007 | `entity-contains` | No `Entity.Contains(string)` |
//! | CT0008 | `filtered-attributes-on-create` | No filtered attributes on Create steps |
//! | CT0009 | `pre-image-on-create` | No pre-image on Create steps |
//! | CT0010 | `post-image-on-delete` | No post-image on Delete steps |
//! | CT0011 | `get-target-naming` | `GetTarget` result is named `target` |
//! | CT0012 | `merged-target-naming` | `GetTargetMergedWithPreImage` result is named `merged` |
//!
//! Codes are part of the output contract: they are never renumbered or
//! reused.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use dataverse_lint_core::Analyzer;
//! use dataverse_lint_csharp::CSharpFrontend;
//!
//! let analyzer = Analyzer::builder(Arc::new(CSharpFrontend), dataverse_lint_rules::default_catalog()?)
//!     .root("./Plugins")
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod braces_for_control_flow;
mod control_flow;
mod duplicate_constructor_parameter_type;
mod entity_contains;
mod enum_assignment;
mod filtered_attributes_on_create;
mod get_target_naming;
mod merged_target_naming;
mod no_braces_for_control_flow;
mod object_initialization;
mod plugin_documentation;
mod plugin_step;
mod post_image_on_delete;
mod pre_image_on_create;
mod presets;
mod target_naming;

#[cfg(test)]
mod testing;

pub use braces_for_control_flow::BracesForControlFlow;
pub use duplicate_constructor_parameter_type::{DuplicateConstructorParameterType, DI_SUFFIXES};
pub use entity_contains::EntityContains;
pub use enum_assignment::EnumAssignment;
pub use filtered_attributes_on_create::FilteredAttributesOnCreate;
pub use get_target_naming::GetTargetNaming;
pub use merged_target_naming::MergedTargetNaming;
pub use no_braces_for_control_flow::NoBracesForControlFlow;
pub use object_initialization::ObjectInitialization;
pub use plugin_documentation::PluginDocumentation;
pub use post_image_on_delete::PostImageOnDelete;
pub use pre_image_on_create::PreImageOnCreate;
pub use presets::{all_rules, default_catalog, Preset};

/// Re-export core types for convenience.
pub use dataverse_lint_core::{Diagnostic, Rule, RuleCatalog, Severity};
