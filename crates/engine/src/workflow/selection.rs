//! Picks a workflow out of a repository listing.

use ghwf_types::{Workflow, WorkflowState};
use thiserror::Error;

/// States a workflow must be in to accept a dispatch event.
pub const DISPATCHABLE_STATES: &[WorkflowState] = &[WorkflowState::Active];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no workflows are enabled on this repository")]
    NoneEnabled,

    #[error("could not find any workflows named {0}")]
    NotFound(String),

    #[error("could not resolve to a unique workflow; found: {}", .candidates.join(" "))]
    Ambiguous { selector: String, candidates: Vec<String> },

    #[error("workflow {name} is {state} and cannot be run")]
    NotRunnable { name: String, state: WorkflowState },
}

/// Keep the workflows whose state is one of `states`.
///
/// An empty listing stays empty; a listing that loses every entry is
/// [`SelectionError::NoneEnabled`].
pub fn filter_by_state(workflows: Vec<Workflow>, states: &[WorkflowState]) -> Result<Vec<Workflow>, SelectionError> {
    let listed = workflows.len();
    let kept: Vec<Workflow> = workflows
        .into_iter()
        .filter(|workflow| states.contains(&workflow.state))
        .collect();

    if listed > 0 && kept.is_empty() {
        return Err(SelectionError::NoneEnabled);
    }
    Ok(kept)
}

/// Workflows matching `selector` by name (any case), file name, or path.
pub fn match_selector<'a>(workflows: &'a [Workflow], selector: &str) -> Vec<&'a Workflow> {
    workflows
        .iter()
        .filter(|workflow| {
            workflow.name.eq_ignore_ascii_case(selector) || workflow.base() == selector || workflow.path == selector
        })
        .collect()
}

/// Resolve `selector` to exactly one workflow.
pub fn select_workflow(workflows: &[Workflow], selector: &str) -> Result<Workflow, SelectionError> {
    match match_selector(workflows, selector).as_slice() {
        [] => Err(SelectionError::NotFound(selector.to_string())),
        [workflow] => Ok((*workflow).clone()),
        several => Err(SelectionError::Ambiguous {
            selector: selector.to_string(),
            candidates: several.iter().map(|workflow| workflow.path.clone()).collect(),
        }),
    }
}

/// Check that a workflow fetched by ID is in one of `states`.
pub fn ensure_runnable(workflow: &Workflow, states: &[WorkflowState]) -> Result<(), SelectionError> {
    if states.contains(&workflow.state) {
        return Ok(());
    }
    Err(SelectionError::NotRunnable {
        name: workflow.name.clone(),
        state: workflow.state,
    })
}

/// Numeric workflow ID, when the selector consists only of digits.
pub fn workflow_id(selector: &str) -> Option<u64> {
    if selector.is_empty() || !selector.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    selector.parse().ok()
}
