//! Provider implementations

pub mod groq;

pub use groq::{GroqConfig, GroqProvider};
