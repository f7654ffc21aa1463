use serde::Serialize;
use tracing::{debug, info, warn};

use crate::llm::TextGenerator;

/// Higher than query formulation: varied rephrasings are the point.
pub const RESTRUCTURE_TEMPERATURE: f32 = 0.3;
pub const CANDIDATE_COUNT: usize = 3;

/// An alternative phrasing of the topic; `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestructureCandidate {
    pub index: u8,
    pub topic: String,
}

/// Asks the LLM for progressively more general phrasings of a topic that found nothing.
pub struct QueryRestructurer<'a, G> {
    llm: &'a G,
}

impl<'a, G: TextGenerator> QueryRestructurer<'a, G> {
    pub fn new(llm: &'a G) -> Self {
        Self { llm }
    }

    /// Never fails: on any error the only candidate is the original topic.
    pub async fn restructure(&self, topic: &str) -> Vec<RestructureCandidate> {
        info!(%topic, "restructuring topic");
        let prompt = restructure_prompt(topic);
        let topics = match self.llm.complete(&prompt, RESTRUCTURE_TEMPERATURE).await {
            Ok(response) => {
                debug!(response = %response.trim(), "restructure response");
                parse_candidates(&response, topic)
            }
            Err(e) => {
                warn!(error = %e, "restructuring failed, keeping original topic");
                vec![topic.to_string()]
            }
        };

        topics
            .into_iter()
            .zip(1..)
            .map(|(topic, index)| RestructureCandidate { index, topic })
            .collect()
    }
}

/// Splits `A|B|C` into candidates, padded with the original topic to three.
/// A response without any `|` yields just the original topic.
/// Blank segments are kept as empty candidates.
pub fn parse_candidates(response: &str, topic: &str) -> Vec<String> {
    let response = response.trim();
    if !response.contains('|') {
        warn!(%response, "restructure response has no '|' separator, keeping original topic");
        return vec![topic.to_string()];
    }

    let mut candidates: Vec<String> = response
        .split('|')
        .map(str::trim)
        .take(CANDIDATE_COUNT)
        .map(str::to_string)
        .collect();
    candidates.resize(CANDIDATE_COUNT, topic.to_string());
    debug!(?candidates, "parsed restructure candidates");
    candidates
}

fn restructure_prompt(topic: &str) -> String {
    format!(
        "\
# Role
You are an academic search query optimizer. You rewrite research topics that are too specific into broader search phrases that stay relevant.

# Goal
The user's topic may be too specific or combine too many constraints, so no papers were found. Propose three rewritten topics.

# Rewriting strategies
Strategy 1 - simplify: keep the core concepts, drop the extra detail.
Strategy 2 - single field: keep only the single most important research field.
Strategy 3 - related techniques: use related but more general technical vocabulary.

# Examples
Topic: deep learning for time-series analysis of single-cell RNA sequencing data
Output: deep learning single-cell analysis|single-cell RNA sequencing|machine learning bioinformatics

Topic: transformer-based multimodal medical image diagnosis system
Output: transformer medical imaging|medical image diagnosis|deep learning medical imaging

Topic: large language models for time-series analysis of single-cell RNA sequencing data
Output: large language models single-cell analysis|single-cell time series|machine learning genomics

# Output format
Answer strictly on one line, separated by \"|\":
strategy 1|strategy 2|strategy 3

# Task
Topic: {topic}
Output:"
    )
}
