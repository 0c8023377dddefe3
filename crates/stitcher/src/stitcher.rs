use crate::config::StitcherConfig;
use crate::error::{Result, StitchError, StitchWarning};
use crate::types::{CompletedChunk, OpenChunk};
use pagestitch_protocol::{Event, EventKind, OpenChunkSummary};
use std::collections::BTreeMap;

const PREVIEW_CHARS: usize = 40;

/// Result of stitching one batch of pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Top-level chunks that closed during this batch
    pub completed: Vec<CompletedChunk>,

    /// Recoverable findings (lenient mode only)
    pub warnings: Vec<StitchWarning>,

    /// Stack after the batch, outermost first
    pub open: Vec<OpenChunkSummary>,
}

/// Event-driven state machine that rebuilds nested chunks from page text.
///
/// One instance per document. The stack of open chunks and the page cursor
/// carry over between [`Stitcher::process_batch`] calls, so a chunk opened in
/// one batch can close in a later one.
#[derive(Debug, Default)]
pub struct Stitcher {
    config: StitcherConfig,
    stack: Vec<OpenChunk>,
    last_page: Option<u32>,
    /// Whether any chunk has started; text before the first START is front matter
    seen_start: bool,
}

impl Stitcher {
    #[must_use]
    pub fn new(config: StitcherConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            last_page: None,
            seen_start: false,
        }
    }

    /// Number of open chunks
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open chunks, outermost first
    #[must_use]
    pub fn open_chunks(&self) -> &[OpenChunk] {
        &self.stack
    }

    #[must_use]
    pub fn open_summaries(&self) -> Vec<OpenChunkSummary> {
        self.stack.iter().map(OpenChunk::summary).collect()
    }

    /// Last page stitched so far
    #[must_use]
    pub const fn last_page(&self) -> Option<u32> {
        self.last_page
    }

    /// Stitch every page of `page_texts` in ascending page order.
    ///
    /// Pages without events still hand their whole text to the open chunk.
    /// An error leaves the stitcher in an unspecified state; the document
    /// should be abandoned.
    pub fn process_batch(
        &mut self,
        events_by_page: &BTreeMap<u32, Vec<Event>>,
        page_texts: &BTreeMap<u32, String>,
    ) -> Result<BatchOutcome> {
        if let Some(page) = events_by_page
            .keys()
            .find(|page| !page_texts.contains_key(page))
        {
            return Err(StitchError::MissingPageText { page: *page });
        }

        let mut outcome = BatchOutcome::default();
        for (&page, text) in page_texts {
            let events = events_by_page.get(&page).map_or(&[][..], Vec::as_slice);
            self.stitch_page(page, events, text, &mut outcome)?;
        }
        outcome.open = self.open_summaries();

        log::debug!(
            "Stitched {} page(s): {} chunk(s) completed, depth {}",
            page_texts.len(),
            outcome.completed.len(),
            self.stack.len()
        );
        Ok(outcome)
    }

    /// Stitch a single page; `events` must be ordered by position in `text`
    pub fn process_page(&mut self, page: u32, events: &[Event], text: &str) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        self.stitch_page(page, events, text, &mut outcome)?;
        outcome.open = self.open_summaries();
        Ok(outcome)
    }

    /// Declare the input exhausted; fails if any chunk is still open
    pub fn finish(self) -> Result<()> {
        match self.stack.last() {
            None => Ok(()),
            Some(innermost) => Err(StitchError::UnclosedChunks {
                start_page: innermost.start_page,
                level: innermost.level.clone(),
                title: innermost.title.clone(),
                depth: self.stack.len(),
            }),
        }
    }

    fn stitch_page(
        &mut self,
        page: u32,
        events: &[Event],
        text: &str,
        outcome: &mut BatchOutcome,
    ) -> Result<()> {
        if let Some(last_page) = self.last_page {
            if page <= last_page {
                return Err(StitchError::PageOutOfOrder { page, last_page });
            }
        }
        self.last_page = Some(page);

        let mut cursor = 0;
        for event in events {
            let (fp_start, fp_end) = locate(page, event, text, cursor)?;
            match event.kind {
                EventKind::Start => {
                    if let Some(top) = self.stack.last_mut() {
                        top.append(page, text, cursor, fp_start);
                    } else if fp_start > cursor {
                        log::debug!(
                            "Dropping {} bytes of front matter on page {page}",
                            fp_start - cursor
                        );
                    }
                    self.seen_start = true;
                    let mut chunk = OpenChunk::new(event.level.clone(), event.title.clone(), page);
                    chunk.append(page, text, fp_start, fp_end);
                    self.stack.push(chunk);
                }
                EventKind::Continuation => {
                    let top = self.top_for(page, event)?;
                    top.append(page, text, cursor, fp_end);
                }
                EventKind::End => {
                    let top = self.top_for(page, event)?;
                    if top.level != event.level {
                        log::debug!(
                            "{} on page {page} tagged {:?} closes innermost {:?} chunk",
                            event.kind,
                            event.level,
                            top.level
                        );
                    }
                    top.append(page, text, cursor, fp_end);
                    if let Some(closed) = self.stack.pop() {
                        let closed = closed.complete(page);
                        match self.stack.last_mut() {
                            Some(parent) => parent.children.push(closed),
                            None => outcome.completed.push(closed),
                        }
                    }
                }
            }
            cursor = fp_end;
        }

        if cursor < text.len() {
            if let Some(top) = self.stack.last_mut() {
                top.append(page, text, cursor, text.len());
            } else if !self.seen_start {
                log::debug!(
                    "Dropping {} bytes of front matter on page {page}",
                    text.len() - cursor
                );
            } else {
                self.orphan_trailing_text(page, text, cursor, outcome)?;
            }
        }
        Ok(())
    }

    fn top_for(&mut self, page: u32, event: &Event) -> Result<&mut OpenChunk> {
        let depth = self.stack.len();
        self.stack
            .last_mut()
            .ok_or_else(|| StitchError::UnbalancedEvent {
                page,
                kind: event.kind,
                fingerprint: event.fingerprint.clone(),
                depth,
            })
    }

    fn orphan_trailing_text(
        &self,
        page: u32,
        text: &str,
        offset: usize,
        outcome: &mut BatchOutcome,
    ) -> Result<()> {
        let trailing = &text[offset..];
        if trailing.trim().is_empty() {
            return Ok(());
        }

        let preview: String = trailing.trim().chars().take(PREVIEW_CHARS).collect();
        let len = trailing.len();
        if self.config.strict_trailing_text {
            return Err(StitchError::OrphanTrailingText {
                page,
                offset,
                len,
                preview,
            });
        }

        log::warn!("Discarding {len} bytes of unassigned text on page {page}: {preview:?}");
        outcome.warnings.push(StitchWarning::OrphanTrailingText {
            page,
            offset,
            len,
            preview,
        });
        Ok(())
    }
}

/// First literal match of the fingerprint at or after `cursor`
fn locate(page: u32, event: &Event, text: &str, cursor: usize) -> Result<(usize, usize)> {
    let not_found = || StitchError::FingerprintNotFound {
        page,
        kind: event.kind,
        fingerprint: event.fingerprint.clone(),
        cursor,
    };
    if event.fingerprint.is_empty() {
        return Err(not_found());
    }
    let start = text
        .get(cursor..)
        .and_then(|rest| rest.find(&event.fingerprint))
        .map(|pos| cursor + pos)
        .ok_or_else(not_found)?;
    Ok((start, start + event.fingerprint.len()))
}

/// Group a page-major event list by page, keeping in-page order
#[must_use]
pub fn group_events_by_page(events: &[Event]) -> BTreeMap<u32, Vec<Event>> {
    let mut grouped: BTreeMap<u32, Vec<Event>> = BTreeMap::new();
    for event in events {
        grouped
            .entry(event.page_number)
            .or_default()
            .push(event.clone());
    }
    grouped
}
