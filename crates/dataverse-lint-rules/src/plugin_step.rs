//! Shared reading of plugin step registrations.
//!
//! Registrations are fluent chains such as
//! `RegisterPluginStep<Account>(EventOperation.Create, ...).AddImage(ImageType.PreImage)`.
//! The later call is checked against the operation named in its anchor
//! `RegisterPluginStep` call. Operation and image type are recovered by
//! ordinal substring search over the argument text, not by resolving the
//! enum members, so `EventOperation.ReCreate` classifies as `Create`.

use dataverse_lint_core::chain::{
    argument_list, argument_texts, find_anchor, first_contained, invocation_callee,
    invoked_name, member_receiver, scan_arguments,
};
use dataverse_lint_core::{SyntaxKind, SyntaxNode};

/// Call that names the event operation of a registration.
const ANCHOR: &str = "RegisterPluginStep";

const OPERATIONS: &[&str] = &["Create", "Delete", "Update"];
const IMAGE_TYPES: &[&str] = &["PreImage", "PostImage", "Both"];

/// A step-configuration call and the registration it belongs to.
pub(crate) struct StepCall {
    pub(crate) operation: Option<&'static str>,
    pub(crate) image_type: Option<&'static str>,
}

/// Matches `<receiver>.<method>(...)` and reads the registration context.
pub(crate) fn step_call(invocation: &SyntaxNode, method: &str) -> Option<StepCall> {
    let callee = invocation_callee(invocation)?;
    if callee.kind() != SyntaxKind::SimpleMemberAccessExpression
        || invoked_name(invocation).as_deref() != Some(method)
    {
        return None;
    }
    let operation = member_receiver(&callee)
        .and_then(|receiver| find_anchor(&receiver, ANCHOR))
        .and_then(|arguments| scan_arguments(&arguments, OPERATIONS));
    let image_type = argument_list(invocation)
        .and_then(|arguments| argument_texts(&arguments).into_iter().next())
        .and_then(|first| first_contained(&first, IMAGE_TYPES));
    Some(StepCall {
        operation,
        image_type,
    })
}
