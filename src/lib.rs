//! Adaptive multi-strategy arXiv literature search.
//!
//! An LLM writes formal arXiv queries for a free-text topic under three
//! strategies; if none of them finds anything, the LLM rephrases the topic and
//! the round is repeated for each rephrasing. See [`search::SmartSearch`].

pub mod arxiv;
pub mod config;
pub mod format;
pub mod llm;
pub mod search;

pub const USER_AGENT: &str = concat!("scholar/", env!("CARGO_PKG_VERSION"));

pub use arxiv::{ArxivClient, PaperRecord, PaperSource, SearchProviderError, SortBy};
pub use config::{Config, ConfigError};
pub use llm::{ChatClient, GenerationError, TextGenerator};
pub use search::{
    History, HistoryEntry, SearchError, SearchOptions, SearchOutcome, SmartSearch, Strategy,
    TrialResult,
};
