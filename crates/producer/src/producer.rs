use crate::error::Result;
use async_trait::async_trait;
use pagestitch_protocol::OpenChunkSummary;
use std::collections::{BTreeMap, BTreeSet};

/// Everything the producer needs to describe one batch of pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchContext {
    /// Page number → full page text
    pub pages: BTreeMap<u32, String>,

    /// Chunks left open by earlier batches, outermost first
    pub open_chunks: Vec<OpenChunkSummary>,
}

impl BatchContext {
    #[must_use]
    pub fn new(pages: BTreeMap<u32, String>, open_chunks: Vec<OpenChunkSummary>) -> Self {
        Self { pages, open_chunks }
    }

    /// Page numbers the producer may reference
    #[must_use]
    pub fn page_numbers(&self) -> BTreeSet<u32> {
        self.pages.keys().copied().collect()
    }

    /// First and last page of the batch
    #[must_use]
    pub fn page_range(&self) -> Option<(u32, u32)> {
        let first = *self.pages.keys().next()?;
        let last = *self.pages.keys().next_back()?;
        Some((first, last))
    }
}

/// One request to the event producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRequest {
    pub system_prompt: String,
    pub user_prompt: String,

    /// 1-based attempt number within the retry loop
    pub attempt: u32,

    /// Pages the response may reference
    pub batch_pages: Vec<u32>,
}

/// Source of structural events for a batch (typically a language model).
///
/// Implementations return the raw response body; parsing and page
/// validation happen in [`crate::RetryController`].
#[async_trait]
pub trait EventProducer: Send + Sync {
    /// Produce a raw JSON response for `request`
    async fn produce(&self, request: &ProducerRequest) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "producer"
    }
}
