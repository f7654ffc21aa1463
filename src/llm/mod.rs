//! Language-generation collaborator: an OpenAI-compatible chat completions client.

pub mod client;
pub mod types;

pub use client::{ChatClient, GenerationError, TextGenerator};
