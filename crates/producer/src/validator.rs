use pagestitch_protocol::Event;
use std::collections::BTreeSet;
use std::fmt;

/// Events referenced pages that were not part of their batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRangeViolation {
    /// Offending page numbers, sorted and deduplicated
    pub invalid_pages: Vec<u32>,

    /// Smallest and largest page of the batch (inclusive); `(0, 0)` for an empty batch
    pub valid_range: (u32, u32),
}

impl fmt::Display for PageRangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pages: Vec<String> = self.invalid_pages.iter().map(u32::to_string).collect();
        write!(
            f,
            "events reference page(s) [{}] outside the batch range {}-{}",
            pages.join(", "),
            self.valid_range.0,
            self.valid_range.1
        )
    }
}

/// Check that every event's page belongs to `batch_pages`
pub fn validate_page_numbers(
    batch_pages: &BTreeSet<u32>,
    events: &[Event],
) -> Result<(), PageRangeViolation> {
    let invalid_pages: BTreeSet<u32> = events
        .iter()
        .map(|event| event.page_number)
        .filter(|page| !batch_pages.contains(page))
        .collect();

    if invalid_pages.is_empty() {
        return Ok(());
    }

    let valid_range = match (batch_pages.first(), batch_pages.last()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => (0, 0),
    };
    Err(PageRangeViolation {
        invalid_pages: invalid_pages.into_iter().collect(),
        valid_range,
    })
}
