//! Scripted collaborators shared by the search tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use futures::stream::{self, BoxStream, StreamExt};

use crate::arxiv::{PaperRecord, PaperSource, SearchProviderError, SortBy};
use crate::llm::{GenerationError, TextGenerator};

pub(crate) struct MockLlm {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl MockLlm {
    pub(crate) fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers each call with the next string, in order.
    pub(crate) fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    pub(crate) fn temperatures(&self) -> Vec<f32> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

impl TextGenerator for MockLlm {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Scripted {
    Papers(usize),
    /// Yields this many papers, then a provider error.
    FailAfter(usize),
}

/// Paper source keyed by exact query string; unknown queries match nothing.
pub(crate) struct MockPapers {
    script: HashMap<String, Scripted>,
    queries: Mutex<Vec<(String, usize, SortBy)>>,
}

impl MockPapers {
    pub(crate) fn new(script: &[(&str, Scripted)]) -> Self {
        Self {
            script: script
                .iter()
                .map(|(q, s)| (q.to_string(), *s))
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn counts(script: &[(&str, usize)]) -> Self {
        let script: Vec<_> = script
            .iter()
            .map(|(q, n)| (*q, Scripted::Papers(*n)))
            .collect();
        Self::new(&script)
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _, _)| q.clone())
            .collect()
    }

    pub(crate) fn requests(&self) -> Vec<(String, usize, SortBy)> {
        self.queries.lock().unwrap().clone()
    }
}

impl PaperSource for MockPapers {
    fn results<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
        sort_by: SortBy,
    ) -> BoxStream<'a, Result<PaperRecord, SearchProviderError>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), limit, sort_by));
        match self.script.get(query).copied() {
            Some(Scripted::Papers(n)) => stream::iter(papers(query, n).into_iter().map(Ok))
                .take(limit)
                .boxed(),
            Some(Scripted::FailAfter(n)) => stream::iter(
                papers(query, n)
                    .into_iter()
                    .map(Ok)
                    .chain([Err(SearchProviderError::Parse("truncated feed".into()))]),
            )
            .boxed(),
            None => stream::empty().boxed(),
        }
    }
}

pub(crate) fn paper(title: &str) -> PaperRecord {
    PaperRecord {
        title: title.to_string(),
        authors: vec!["A. Author".to_string()],
        summary: String::new(),
        published: None,
        url: format!("http://arxiv.org/abs/{title}"),
        pdf_url: format!("https://arxiv.org/pdf/{title}"),
        categories: vec!["cs.LG".to_string()],
    }
}

pub(crate) fn papers(prefix: &str, n: usize) -> Vec<PaperRecord> {
    (0..n).map(|i| paper(&format!("{prefix}-{i}"))).collect()
}
