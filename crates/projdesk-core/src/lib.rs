//! Projdesk Core Library
//!
//! This crate provides the core functionality for Projdesk, including:
//! - The project record and its status labels
//! - A generic form state with validation and display formatting
//! - Resource providers (JSON REST and in-memory)
//! - The project edit view controller
//! - Configuration and error types

pub mod domain;
pub mod form;
pub mod resource;
pub mod edit;
pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::{Project, ProjectStatus};
    pub use crate::edit::{ProjectEditView, ViewState};
    pub use crate::error::{Error, Result};
    pub use crate::resource::{HttpProvider, MemoryProvider, ResourceProvider};
}
