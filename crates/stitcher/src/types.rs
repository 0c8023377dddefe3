use pagestitch_protocol::OpenChunkSummary;
use serde::{Deserialize, Serialize};

/// A byte range of one page's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub page: u32,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl TextSpan {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Whether two spans share at least one byte of the same page
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.page == other.page && self.start < other.end && other.start < self.end
    }
}

/// A chunk whose END has not been observed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenChunk {
    pub level: String,
    pub title: Option<String>,
    pub start_page: u32,
    /// Append-only text accumulator
    pub text: String,
    /// Where `text` came from, in append order
    pub spans: Vec<TextSpan>,
    /// Completed chunks nested inside, in discovery order
    pub children: Vec<CompletedChunk>,
}

impl OpenChunk {
    #[must_use]
    pub fn new(level: impl Into<String>, title: Option<String>, start_page: u32) -> Self {
        Self {
            level: level.into(),
            title,
            start_page,
            text: String::new(),
            spans: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append `page_text[start..end]`, recording its provenance
    pub(crate) fn append(&mut self, page: u32, page_text: &str, start: usize, end: usize) {
        if start >= end {
            return;
        }
        self.text.push_str(&page_text[start..end]);
        match self.spans.last_mut() {
            Some(last) if last.page == page && last.end == start => last.end = end,
            _ => self.spans.push(TextSpan { page, start, end }),
        }
    }

    /// Close the chunk on `end_page`
    #[must_use]
    pub fn complete(self, end_page: u32) -> CompletedChunk {
        CompletedChunk {
            level: self.level,
            title: self.title,
            start_page: self.start_page,
            end_page,
            text: self.text,
            spans: self.spans,
            children: self.children,
        }
    }

    #[must_use]
    pub fn summary(&self) -> OpenChunkSummary {
        OpenChunkSummary {
            level: self.level.clone(),
            title: self.title.clone(),
            start_page: self.start_page,
        }
    }
}

/// A closed chunk; immutable once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedChunk {
    pub level: String,
    pub title: Option<String>,
    pub start_page: u32,
    pub end_page: u32,
    pub text: String,
    pub spans: Vec<TextSpan>,
    pub children: Vec<CompletedChunk>,
}

impl CompletedChunk {
    /// Number of chunks in this subtree, including itself
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Self::subtree_len)
            .sum::<usize>()
    }

    /// Pre-order iterator over this chunk and every descendant
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let next = pending.pop()?;
            pending.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
