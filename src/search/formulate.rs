use tracing::info;

use super::strategy::Strategy;
use crate::llm::{GenerationError, TextGenerator};

/// Low temperature keeps query syntax stable across calls.
pub const FORMULATION_TEMPERATURE: f32 = 0.2;

/// Turns a free-text topic into a formal arXiv query, one LLM call per request.
pub struct QueryFormulator<'a, G> {
    llm: &'a G,
}

impl<'a, G: TextGenerator> QueryFormulator<'a, G> {
    pub fn new(llm: &'a G) -> Self {
        Self { llm }
    }

    /// No retries here: a failure is the caller's to absorb or report.
    pub async fn formulate(
        &self,
        topic: &str,
        strategy: Strategy,
    ) -> Result<String, GenerationError> {
        info!(%topic, %strategy, "generating search query");
        let prompt = strategy.prompt(topic);
        let query = self
            .llm
            .complete(&prompt, FORMULATION_TEMPERATURE)
            .await?
            .trim()
            .to_string();
        if query.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        info!(%strategy, %query, "generated query");
        Ok(query)
    }
}
