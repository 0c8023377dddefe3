use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of structural boundary an event marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EventKind {
    /// A new chunk begins; the fingerprint is its first words
    #[serde(rename = "STARTS")]
    Start,

    /// The innermost open chunk ends; the fingerprint is its last words
    #[serde(rename = "ENDS")]
    End,

    /// The innermost open chunk keeps going up to the fingerprint
    #[serde(rename = "CONTINUATION")]
    Continuation,
}

impl EventKind {
    /// Wire name, as the producer is asked to emit it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "STARTS",
            Self::End => "ENDS",
            Self::Continuation => "CONTINUATION",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural signal at a specific position in a page's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Event {
    /// Boundary kind
    #[serde(rename = "event")]
    pub kind: EventKind,

    /// Structural label (section, table, list, ...). Opaque to the stitcher.
    pub level: String,

    /// Human label, only meaningful on STARTS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// 1-based page the event occurs on
    pub page_number: u32,

    /// Literal snippet of the page text anchoring the event
    pub fingerprint: String,
}

impl Event {
    #[must_use]
    pub fn start(
        level: impl Into<String>,
        title: Option<&str>,
        page_number: u32,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            kind: EventKind::Start,
            level: level.into(),
            title: title.map(str::to_string),
            page_number,
            fingerprint: fingerprint.into(),
        }
    }

    #[must_use]
    pub fn end(level: impl Into<String>, page_number: u32, fingerprint: impl Into<String>) -> Self {
        Self {
            kind: EventKind::End,
            level: level.into(),
            title: None,
            page_number,
            fingerprint: fingerprint.into(),
        }
    }

    #[must_use]
    pub fn continuation(
        level: impl Into<String>,
        page_number: u32,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            kind: EventKind::Continuation,
            level: level.into(),
            title: None,
            page_number,
            fingerprint: fingerprint.into(),
        }
    }
}
