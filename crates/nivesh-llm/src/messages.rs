//! Chat message types

use serde::{Deserialize, Serialize};

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
}

/// A single chat message
///
/// The pipeline only ever exchanges plain text with the model; tool requests
/// come back on the response side as [`crate::FunctionCall`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    pub role: Role,
    /// Text content
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
