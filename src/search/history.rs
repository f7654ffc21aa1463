use chrono::{DateTime, Local};
use serde::Serialize;

use super::{SearchOutcome, Strategy};

/// Summary of one finished search, kept only for the life of the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub topic: String,
    pub timestamp: DateTime<Local>,
    pub count: usize,
    #[serde(serialize_with = "super::serialize_strategy")]
    pub strategy: Option<Strategy>,
    pub used_restructure: bool,
}

impl HistoryEntry {
    pub fn from_outcome(topic: &str, outcome: &SearchOutcome) -> Self {
        Self::at(topic, outcome, Local::now())
    }

    fn at(topic: &str, outcome: &SearchOutcome, timestamp: DateTime<Local>) -> Self {
        Self {
            topic: topic.to_string(),
            timestamp,
            count: outcome.count(),
            strategy: outcome.strategy(),
            used_restructure: outcome.used_restructure,
        }
    }
}

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, topic: &str, outcome: &SearchOutcome) -> &HistoryEntry {
        self.entries.push(HistoryEntry::from_outcome(topic, outcome));
        &self.entries[self.entries.len() - 1]
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
