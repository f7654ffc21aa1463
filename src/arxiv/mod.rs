//! Search-provider collaborator: the arXiv export API and its Atom feed format.

pub mod client;
mod feed;
pub mod types;

pub use client::{ArxivClient, PaperSource, SearchProviderError};
pub use types::{PaperRecord, SortBy};
