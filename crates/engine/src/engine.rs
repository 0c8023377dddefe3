use crate::batching::{split_into_batches, PageBatch};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use pagestitch_producer::{BatchContext, CancellationToken, EventProducer, RetryController};
use pagestitch_protocol::ChunkRecord;
use pagestitch_stitcher::{
    group_events_by_page, CompletedChunk, FinalAssembler, StitchWarning, Stitcher,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Everything produced for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// Assembled chunks in pre-order
    pub records: Vec<ChunkRecord>,

    /// Recoverable findings collected across all batches
    pub warnings: Vec<StitchWarning>,

    pub batches: usize,
    pub events: usize,
}

/// Chunks whole documents: batches pages, obtains validated events per batch,
/// stitches them and assembles the final records.
///
/// The engine holds no per-document state, so one instance can process many
/// documents, including concurrently.
pub struct ChunkingEngine {
    config: EngineConfig,
    retry: RetryController,
    assembler: FinalAssembler,
}

impl ChunkingEngine {
    pub fn new(producer: Arc<dyn EventProducer>, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(EngineError::invalid_config)?;
        let retry = RetryController::new(producer, config.retry.clone()).map_err(|err| {
            EngineError::invalid_config(err.to_string())
        })?;
        let assembler = FinalAssembler::new(config.assembly.clone());
        Ok(Self {
            config,
            retry,
            assembler,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Chunk a document given as page number → page text.
    pub async fn process_document(
        &self,
        name: &str,
        pages: &BTreeMap<u32, String>,
        cancel: &CancellationToken,
    ) -> Result<DocumentOutcome> {
        if pages.contains_key(&0) {
            return Err(EngineError::InvalidPage(0));
        }

        let start = Instant::now();
        let batches = split_into_batches(pages, self.config.batching.page_batch_size);
        log::info!(
            "Chunking {name}: {} page(s) in {} batch(es)",
            pages.len(),
            batches.len()
        );

        let mut stitcher = Stitcher::new(self.config.stitcher.clone());
        let mut completed: Vec<CompletedChunk> = Vec::new();
        let mut outcome = DocumentOutcome {
            batches: batches.len(),
            ..Default::default()
        };

        for batch in &batches {
            let batch_outcome = self
                .process_batch(&mut stitcher, batch, cancel, &mut outcome)
                .await?;
            completed.extend(batch_outcome);
        }

        stitcher
            .finish()
            .map_err(|source| EngineError::Incomplete {
                document: name.to_string(),
                source,
            })?;

        for warning in &outcome.warnings {
            log::warn!("{name}: {warning}");
        }
        outcome.records = self.assembler.assemble(name, &completed);
        log::info!(
            "Chunked {name}: {} chunk(s) from {} event(s) in {:.2?}",
            outcome.records.len(),
            outcome.events,
            start.elapsed()
        );
        Ok(outcome)
    }

    async fn process_batch(
        &self,
        stitcher: &mut Stitcher,
        batch: &PageBatch,
        cancel: &CancellationToken,
        outcome: &mut DocumentOutcome,
    ) -> Result<Vec<CompletedChunk>> {
        let (first_page, last_page) = batch.page_range();
        let ctx = BatchContext::new(batch.pages.clone(), stitcher.open_summaries());

        let events = self
            .retry
            .obtain_validated_events(&ctx, cancel)
            .await
            .map_err(|source| EngineError::Producer {
                batch: batch.index,
                first_page,
                last_page,
                source,
            })?;

        let stitched = stitcher
            .process_batch(&group_events_by_page(&events), &batch.pages)
            .map_err(|source| EngineError::Stitch {
                batch: batch.index,
                first_page,
                last_page,
                source,
            })?;

        log::debug!(
            "Batch {} (pages {first_page}-{last_page}): {} event(s), {} chunk(s) closed, {} open",
            batch.index,
            events.len(),
            stitched.completed.len(),
            stitched.open.len()
        );
        outcome.events += events.len();
        outcome.warnings.extend(stitched.warnings);
        Ok(stitched.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestitch_producer::ScriptedProducer;

    #[test]
    fn rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.batching.page_batch_size = 0;
        let result = ChunkingEngine::new(Arc::new(ScriptedProducer::new(Vec::<String>::new())), config);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn empty_document_needs_no_producer() {
        let producer = Arc::new(ScriptedProducer::new(Vec::<String>::new()));
        let engine = ChunkingEngine::new(producer.clone(), EngineConfig::default()).unwrap();
        let outcome = engine
            .process_document("empty.pdf", &BTreeMap::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.batches, 0);
        assert_eq!(producer.calls(), 0);
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        let engine = ChunkingEngine::new(
            Arc::new(ScriptedProducer::new(Vec::<String>::new())),
            EngineConfig::default(),
        )
        .unwrap();
        let pages: BTreeMap<u32, String> = [(0, "cover".to_string())].into_iter().collect();
        let err = engine
            .process_document("doc", &pages, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPage(0)));
    }
}
