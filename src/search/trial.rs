use tracing::{info, warn};

use super::executor::SearchExecutor;
use super::formulate::QueryFormulator;
use super::strategy::Strategy;
use super::{SearchError, SearchOptions, TrialResult};
use crate::arxiv::PaperSource;
use crate::llm::TextGenerator;

/// A strategy returning at least this many papers ends the round immediately.
pub const SUFFICIENT_RESULTS: usize = 3;

/// Tries every strategy against one topic, in `Strategy::ORDER`.
pub struct StrategyTrialRunner<'a, G, S> {
    formulator: QueryFormulator<'a, G>,
    executor: SearchExecutor<'a, S>,
}

impl<'a, G: TextGenerator, S: PaperSource> StrategyTrialRunner<'a, G, S> {
    pub fn new(llm: &'a G, source: &'a S, options: SearchOptions) -> Self {
        Self {
            formulator: QueryFormulator::new(llm),
            executor: SearchExecutor::new(source, options),
        }
    }

    /// One strategy: formulate, then search.
    pub async fn attempt(
        &self,
        topic: &str,
        strategy: Strategy,
    ) -> Result<TrialResult, SearchError> {
        let query = self.formulator.formulate(topic, strategy).await?;
        let papers = self.executor.execute(&query).await?;
        info!(%strategy, count = papers.len(), "strategy finished");
        Ok(TrialResult::new(strategy, query, papers, topic))
    }

    /// Never fails: a failing strategy counts as zero results.
    pub async fn run_all(&self, topic: &str) -> TrialResult {
        info!(%topic, "starting strategy round");
        let mut candidates = Vec::new();

        for strategy in Strategy::ORDER {
            match self.attempt(topic, strategy).await {
                Ok(trial) if trial.count() >= SUFFICIENT_RESULTS => {
                    info!(%strategy, count = trial.count(), "sufficient results, ending round");
                    return trial;
                }
                Ok(trial) if trial.count() > 0 => candidates.push(trial),
                Ok(_) => {}
                Err(e) => {
                    warn!(%strategy, error = %e, "strategy failed (continuing with next strategy)");
                }
            }
        }

        match best_of(candidates) {
            Some(best) => {
                info!(
                    strategy = %super::strategy_label(best.strategy()),
                    count = best.count(),
                    "selected best partial result"
                );
                best
            }
            None => {
                warn!(%topic, "no strategy found any papers");
                TrialResult::none(topic)
            }
        }
    }
}

/// Largest count wins; on a tie the earlier candidate is kept.
fn best_of(candidates: Vec<TrialResult>) -> Option<TrialResult> {
    candidates
        .into_iter()
        .reduce(|best, next| if next.count() > best.count() { next } else { best })
}
