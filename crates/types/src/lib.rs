//! Shared type definitions for the ghwf workspace.
//!
//! The API client, the dispatch engine, and the command-line front end all
//! speak in terms of these models, so they live in a dependency-light crate.

pub mod repo;
pub mod workflow;

pub use repo::{DEFAULT_HOST, RepoParseError, RepoRef};
pub use workflow::*;
