//! # ghwf engine
//!
//! Everything between "the user named a workflow" and "a `workflow_dispatch`
//! event was created", independent of the terminal and the HTTP transport.
//!
//! ## Usage
//!
//! ```rust
//! use ghwf_engine::find_inputs;
//!
//! let yaml = br#"
//! on:
//!   workflow_dispatch:
//!     inputs:
//!       name:
//!         required: true
//!         description: who to greet
//! "#;
//!
//! let inputs = find_inputs(yaml)?;
//! assert!(inputs["name"].required);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`workflow`**: parsing workflow files, collecting input values, selecting workflows
//! - **`dispatch`**: the end-to-end flow over a [`ghwf_api::WorkflowsApi`] and a [`Prompter`]

pub mod dispatch;
pub mod workflow;

pub use dispatch::{DispatchOptions, DispatchOutcome, InputSource, Prompter, run_dispatch};
pub use workflow::{InputError, SelectionError, WorkflowDocumentError, find_inputs};
