use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Query-writing style. Every trial round walks `Strategy::ORDER` front to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Balanced,
    Broad,
    Precise,
}

impl Strategy {
    pub const ORDER: [Strategy; 3] = [Strategy::Balanced, Strategy::Broad, Strategy::Precise];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Broad => "broad",
            Strategy::Precise => "precise",
        }
    }

    /// Instruction prompt asking the LLM for one arXiv query about `topic`.
    pub fn prompt(self, topic: &str) -> String {
        let (goal, rules) = match self {
            Strategy::Broad => (BROAD_GOAL, BROAD_RULES),
            Strategy::Precise => (PRECISE_GOAL, PRECISE_RULES),
            Strategy::Balanced => (BALANCED_GOAL, BALANCED_RULES),
        };
        let examples = match self {
            Strategy::Balanced => BALANCED_EXAMPLES,
            _ => "",
        };
        format!(
            "# Role\n{ROLE}\n\n# Goal\n{goal}\n\n# Output rules\n{rules}\n{examples}\n# Task\nUser input: {topic}\nOutput (the query string only):\n"
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown strategy '{0}' (expected balanced, broad or precise)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Strategy::Balanced),
            "broad" => Ok(Strategy::Broad),
            "precise" => Ok(Strategy::Precise),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Display label for an optional strategy; `None` is the "nothing found" sentinel.
pub fn strategy_label(strategy: Option<Strategy>) -> &'static str {
    strategy.map_or("none", Strategy::as_str)
}

const ROLE: &str = "You are an academic literature search assistant. You write query strings in arXiv API search syntax.";

const BROAD_GOAL: &str = "Write a BROAD query for the user's topic. Finding every relevant paper matters more than precision: it is better to return too much than to miss something.";

const BROAD_RULES: &str = "\
- Write an English query string in arXiv search syntax.
- Prefer OR to join synonyms and related concepts.
- Use as few AND conditions as possible; avoid strict constraints.
- Prefer general keywords over narrow jargon.
- Output only the query string, with no explanation.
";

const PRECISE_GOAL: &str = "Write a PRECISE query for the user's topic that targets the most relevant papers.";

const PRECISE_RULES: &str = "\
- Write an English query string in arXiv search syntax.
- Use exact technical terminology.
- Combine AND and OR deliberately.
- Use the ti: and abs: field prefixes to raise precision.
- Output only the query string, with no explanation.
";

const BALANCED_GOAL: &str = "Write an arXiv query for the user's topic (given in any language) that finds relevant papers while keeping results strongly on topic. Balance recall and precision: do not over-constrain the query so that nothing matches, and do not make it so loose that unrelated papers dominate.";

const BALANCED_RULES: &str = "\
- Write an English query string in arXiv search syntax.
- Wrap multi-word keywords in double quotes for exact phrase matching.
- Join keywords with AND, OR and ANDNOT, leading with core concepts and technical terms.
- The prefixes ti:, abs:, au: and cat: may be used to raise relevance.
- Keep the query short, accurate and focused.
- When the topic spans several core concepts, join the concepts with AND and their synonyms with OR.
- Output only the final query string, with no explanation.
";

const BALANCED_EXAMPLES: &str = "
# Examples
User input: deep learning for image classification
Output: (\"deep learning\" OR \"neural network\") AND (\"image classification\" OR \"computer vision\")

User input: applications of transformers in natural language processing
Output: (\"transformer\" OR \"attention mechanism\") AND (\"natural language processing\" OR \"NLP\")

User input: single-cell RNA sequencing data analysis
Output: (\"single-cell RNA sequencing\" OR \"scRNA-seq\") AND (\"data analysis\" OR \"computational biology\")
";
