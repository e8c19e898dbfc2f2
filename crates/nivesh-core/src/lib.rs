//! Core abstractions for the nivesh equity-analysis agent
//!
//! This crate defines the tool-call boundary shared by the analysis crates:
//! the [`Tool`] trait, the [`ToolRegistry`] a conversational driver dispatches
//! through, and the error types for driver-facing operations.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{Error, Result};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDefinition, string_argument_schema};
