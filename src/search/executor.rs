use futures::TryStreamExt;
use tracing::debug;

use super::SearchOptions;
use crate::arxiv::{PaperRecord, PaperSource, SearchProviderError};

/// Runs formal queries against the paper source and drains the result stream,
/// since callers need a count.
pub struct SearchExecutor<'a, S> {
    source: &'a S,
    options: SearchOptions,
}

impl<'a, S: PaperSource> SearchExecutor<'a, S> {
    pub fn new(source: &'a S, options: SearchOptions) -> Self {
        Self { source, options }
    }

    /// An error anywhere in the stream discards the papers drained before it.
    pub async fn execute(&self, query: &str) -> Result<Vec<PaperRecord>, SearchProviderError> {
        let papers: Vec<PaperRecord> = self
            .source
            .results(query, self.options.max_results, self.options.sort_by)
            .try_collect()
            .await?;
        debug!(%query, count = papers.len(), "search drained");
        Ok(papers)
    }
}
