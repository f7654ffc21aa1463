use tracing::{debug, info, warn};

use super::restructure::QueryRestructurer;
use super::strategy::Strategy;
use super::trial::StrategyTrialRunner;
use super::{SearchError, SearchOptions, SearchOutcome};
use crate::arxiv::PaperSource;
use crate::llm::TextGenerator;

/// Any first-round result at all skips restructuring, even below `SUFFICIENT_RESULTS`.
pub const RESTRUCTURE_SKIP_RESULTS: usize = 1;

/// Top-level search: one strategy round on the topic, then restructured topics if it found nothing.
///
/// Holds no state between calls. Dropping the returned future abandons the
/// search at the next LLM or arXiv call.
pub struct SmartSearch<'a, G, S> {
    trials: StrategyTrialRunner<'a, G, S>,
    restructurer: QueryRestructurer<'a, G>,
}

impl<'a, G: TextGenerator, S: PaperSource> SmartSearch<'a, G, S> {
    pub fn new(llm: &'a G, source: &'a S, options: SearchOptions) -> Self {
        Self {
            trials: StrategyTrialRunner::new(llm, source, options),
            restructurer: QueryRestructurer::new(llm),
        }
    }

    /// Never fails; `count() == 0` means nothing was found (or every call failed).
    pub async fn smart_search(&self, topic: &str, allow_restructure: bool) -> SearchOutcome {
        let first = self.trials.run_all(topic).await;
        if first.count() >= RESTRUCTURE_SKIP_RESULTS {
            return SearchOutcome::direct(first);
        }

        if allow_restructure {
            info!(%topic, "original topic found no papers, trying restructured topics");
            for candidate in self.restructurer.restructure(topic).await {
                if candidate.topic == topic {
                    debug!(
                        index = candidate.index,
                        "skipping candidate identical to original topic"
                    );
                    continue;
                }
                info!(
                    index = candidate.index,
                    candidate = %candidate.topic,
                    "trying restructured topic"
                );
                let trial = self.trials.run_all(&candidate.topic).await;
                if trial.count() > 0 {
                    info!(
                        index = candidate.index,
                        count = trial.count(),
                        "restructured topic found papers"
                    );
                    return SearchOutcome::restructured(trial, topic, candidate);
                }
            }
            warn!(%topic, "no restructured topic found any papers");
        }

        SearchOutcome::unrestructured(first, topic)
    }

    /// One fixed strategy, no fallback. Failures are returned instead of absorbed.
    pub async fn single_strategy_search(
        &self,
        topic: &str,
        strategy: Strategy,
    ) -> Result<SearchOutcome, SearchError> {
        let trial = self.trials.attempt(topic, strategy).await?;
        Ok(SearchOutcome::direct(trial))
    }
}
