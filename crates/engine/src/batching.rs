use std::collections::BTreeMap;

/// A run of consecutive document pages sent to the producer together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBatch {
    /// 0-based position of the batch in the document
    pub index: usize,

    /// Page number → page text, ascending
    pub pages: BTreeMap<u32, String>,
}

impl PageBatch {
    #[must_use]
    pub fn first_page(&self) -> u32 {
        self.pages.keys().next().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn last_page(&self) -> u32 {
        self.pages.keys().next_back().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn page_range(&self) -> (u32, u32) {
        (self.first_page(), self.last_page())
    }
}

/// Split a document into batches of at most `batch_size` pages, in page order.
///
/// Gaps in the page numbering are kept as-is; a batch holds the next
/// `batch_size` pages present in the map.
#[must_use]
pub fn split_into_batches(pages: &BTreeMap<u32, String>, batch_size: usize) -> Vec<PageBatch> {
    let size = batch_size.max(1);
    let mut batches: Vec<PageBatch> = Vec::with_capacity(pages.len().div_ceil(size));
    for (position, (page, text)) in pages.iter().enumerate() {
        if position % size == 0 {
            batches.push(PageBatch {
                index: batches.len(),
                pages: BTreeMap::new(),
            });
        }
        if let Some(batch) = batches.last_mut() {
            batch.pages.insert(*page, text.clone());
        }
    }
    batches
}
