//! Domain layer
//!
//! Contains the project record and its status vocabulary.

pub mod project;

pub use project::{PROJECT_STATUS_LABELS, Project, ProjectStatus, SelectOption, status_options};
