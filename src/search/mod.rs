//! Search orchestration: query formulation, strategy trial rounds, restructuring, and provenance.

pub mod engine;
pub mod executor;
pub mod formulate;
pub mod history;
pub mod restructure;
pub mod strategy;
pub mod trial;

#[cfg(test)]
pub(crate) mod mock;

pub use engine::SmartSearch;
pub use history::{History, HistoryEntry};
pub use restructure::RestructureCandidate;
pub use strategy::{Strategy, strategy_label};

use serde::{Serialize, Serializer};

use crate::arxiv::{PaperRecord, SearchProviderError, SortBy};
use crate::llm::GenerationError;

/// Per-search limits handed to the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub sort_by: SortBy,
}

/// Why one strategy attempt produced no result set.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("paper search failed: {0}")]
    Search(#[from] SearchProviderError),
}

/// Papers found for one topic by one strategy. `count` always equals `results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    #[serde(serialize_with = "serialize_strategy")]
    strategy: Option<Strategy>,
    query: String,
    results: Vec<PaperRecord>,
    count: usize,
    search_input: String,
}

impl TrialResult {
    pub fn new(strategy: Strategy, query: String, results: Vec<PaperRecord>, topic: &str) -> Self {
        Self {
            strategy: Some(strategy),
            query,
            count: results.len(),
            results,
            search_input: topic.to_string(),
        }
    }

    /// The "nothing found" sentinel: no strategy, empty query, no papers.
    pub fn none(topic: &str) -> Self {
        Self {
            strategy: None,
            query: String::new(),
            results: Vec::new(),
            count: 0,
            search_input: topic.to_string(),
        }
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[PaperRecord] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PaperRecord> {
        self.results
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Topic this round was run for (the original or a restructured candidate).
    pub fn search_input(&self) -> &str {
        &self.search_input
    }
}

fn serialize_strategy<S: Serializer>(
    strategy: &Option<Strategy>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(strategy_label(*strategy))
}

/// Final answer of a search: the winning trial plus restructuring provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    #[serde(flatten)]
    pub trial: TrialResult,
    pub original_query: Option<String>,
    pub restructured_query: Option<String>,
    pub restructure_strategy: Option<u8>,
    pub used_restructure: bool,
}

impl SearchOutcome {
    /// Result of the first round, returned as-is.
    pub fn direct(trial: TrialResult) -> Self {
        Self {
            trial,
            original_query: None,
            restructured_query: None,
            restructure_strategy: None,
            used_restructure: false,
        }
    }

    /// First-round result after restructuring was skipped or found nothing.
    pub fn unrestructured(trial: TrialResult, original: &str) -> Self {
        Self {
            original_query: Some(original.to_string()),
            ..Self::direct(trial)
        }
    }

    pub fn restructured(
        trial: TrialResult,
        original: &str,
        candidate: RestructureCandidate,
    ) -> Self {
        Self {
            trial,
            original_query: Some(original.to_string()),
            restructured_query: Some(candidate.topic),
            restructure_strategy: Some(candidate.index),
            used_restructure: true,
        }
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.trial.strategy()
    }

    pub fn query(&self) -> &str {
        self.trial.query()
    }

    pub fn results(&self) -> &[PaperRecord] {
        self.trial.results()
    }

    pub fn count(&self) -> usize {
        self.trial.count()
    }
}
