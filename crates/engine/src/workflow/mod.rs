//! Workflow file interpretation.
//!
//! - [`document`] finds the `workflow_dispatch` inputs a workflow file declares
//! - [`inputs`] collects and validates values for those inputs
//! - [`selection`] resolves a user-supplied selector to a workflow

pub mod document;
pub mod inputs;
pub mod selection;

pub use document::{WorkflowDocument, WorkflowDocumentError, WorkflowTriggers, find_inputs};
pub use inputs::{InputError, ProvidedInputs, build_input_command, inputs_from_args, inputs_from_json, validate_inputs};
pub use selection::{
    DISPATCHABLE_STATES, SelectionError, ensure_runnable, filter_by_state, match_selector, select_workflow, workflow_id,
};
