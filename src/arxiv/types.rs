use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

/// One paper as returned by the search provider. Passed through untouched by the search core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: Option<NaiveDate>,
    pub url: String,
    pub pdf_url: String,
    pub categories: Vec<String>,
}

/// Sort criterion passed through to arXiv. Results are always requested newest/best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    LastUpdatedDate,
    #[default]
    SubmittedDate,
}

impl SortBy {
    pub fn as_api_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
            SortBy::SubmittedDate => "submittedDate",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort order '{0}' (expected relevance, lastUpdatedDate or submittedDate)")]
pub struct UnknownSortBy(pub String);

impl FromStr for SortBy {
    type Err = UnknownSortBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "lastupdateddate" | "updated" => Ok(SortBy::LastUpdatedDate),
            "submitteddate" | "submitted" | "date" => Ok(SortBy::SubmittedDate),
            _ => Err(UnknownSortBy(s.to_string())),
        }
    }
}
