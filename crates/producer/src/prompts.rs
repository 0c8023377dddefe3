use crate::producer::{BatchContext, ProducerRequest};
use crate::validator::PageRangeViolation;
use std::fmt::Write as _;

/// Instructions sent with every batch
pub const SYSTEM_PROMPT: &str = r#"You split documents into self-contained chunks for retrieval.

Read the pages you are given and describe where chunks begin and end by
emitting structural events. Each chunk should hold one complete idea with
enough context to be understood on its own: keep a list with its
introduction, a table with its caption, an example with the point it
illustrates. Avoid chunks that are only a heading or a single sentence.

EVENTS
- STARTS: a new chunk begins. "fingerprint" is the first words of the chunk.
- ENDS: the innermost open chunk is complete. "fingerprint" is the LAST words
  of that chunk, not the first words of what follows.
- CONTINUATION: the innermost open chunk carries on; "fingerprint" is the
  last words of this batch that still belong to it.

An ENDS event always closes the most recently started chunk that is still
open. Chunks listed as currently open came from earlier pages; close them
with ENDS when their content is finished.

FIELDS
- "event": "STARTS", "ENDS" or "CONTINUATION"
- "level": what the chunk is, e.g. "section", "table", "list", "image_caption"
- "title": a short description of the chunk (STARTS only)
- "page_number": the page the fingerprint is on; only pages of this batch
- "fingerprint": 3-8 words copied exactly, character for character, from
  that page

Emit events in reading order. Respond with only a JSON object of the form
{"events": [...]}."#;

/// Corrective paragraph appended after an attempt referenced bad pages
#[must_use]
pub fn corrective_instruction(attempt: u32, violation: &PageRangeViolation) -> String {
    let pages: Vec<String> = violation
        .invalid_pages
        .iter()
        .map(u32::to_string)
        .collect();
    let (min, max) = violation.valid_range;
    format!(
        "CORRECTION (attempt {attempt}): your previous response used page_number {} which \
         is not part of this batch. Every event must use a page_number between {min} and \
         {max} inclusive.",
        pages.join(", ")
    )
}

/// Render the user prompt for a batch, followed by any corrections so far
#[must_use]
pub fn user_prompt(ctx: &BatchContext, corrections: &[String]) -> String {
    let mut prompt = String::new();
    match ctx.page_range() {
        Some((first, last)) if first == last => {
            let _ = writeln!(prompt, "Analyzing page: {first}");
        }
        Some((first, last)) => {
            let _ = writeln!(prompt, "Analyzing pages: {first}-{last}");
        }
        None => prompt.push_str("Analyzing pages: none\n"),
    }

    prompt.push_str("\nCurrently open chunks from previous pages:\n");
    if ctx.open_chunks.is_empty() {
        prompt.push_str("none, this batch starts outside any chunk\n");
    } else {
        let open = serde_json::to_string_pretty(&ctx.open_chunks).unwrap_or_default();
        prompt.push_str(&open);
        prompt.push('\n');
    }

    prompt.push_str("\nDocument content to analyze:\n");
    for (page, text) in &ctx.pages {
        let _ = writeln!(prompt, "--- Page {page} ---");
        prompt.push_str(text);
        if !text.ends_with('\n') {
            prompt.push('\n');
        }
    }
    prompt.push_str("--- End of batch ---\n");

    for correction in corrections {
        prompt.push('\n');
        prompt.push_str(correction);
        prompt.push('\n');
    }
    prompt
}

/// Build the request for `attempt`
#[must_use]
pub fn build_request(ctx: &BatchContext, corrections: &[String], attempt: u32) -> ProducerRequest {
    ProducerRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: user_prompt(ctx, corrections),
        attempt,
        batch_pages: ctx.pages.keys().copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestitch_protocol::OpenChunkSummary;

    fn ctx() -> BatchContext {
        BatchContext::new(
            [(1, "First page.".to_string()), (2, "Second page.\n".to_string())]
                .into_iter()
                .collect(),
            vec![OpenChunkSummary {
                level: "section".to_string(),
                title: Some("Overview".to_string()),
                start_page: 1,
            }],
        )
    }

    #[test]
    fn prompt_lists_range_open_chunks_and_pages() {
        let prompt = user_prompt(&ctx(), &[]);
        assert!(prompt.contains("Analyzing pages: 1-2"));
        assert!(prompt.contains("\"Overview\""));
        assert!(prompt.contains("--- Page 1 ---\nFirst page.\n--- Page 2 ---\nSecond page.\n"));
        assert!(!prompt.contains("CORRECTION"));
    }

    #[test]
    fn prompt_without_open_chunks_says_so() {
        let mut ctx = ctx();
        ctx.open_chunks.clear();
        assert!(user_prompt(&ctx, &[]).contains("none, this batch starts outside any chunk"));
    }

    #[test]
    fn correction_names_pages_and_range() {
        let violation = PageRangeViolation {
            invalid_pages: vec![5, 7],
            valid_range: (1, 3),
        };
        let text = corrective_instruction(1, &violation);
        assert!(text.contains("5, 7"), "{text}");
        assert!(text.contains("between 1 and 3 inclusive"), "{text}");
    }

    #[test]
    fn corrections_accumulate_in_order() {
        let request = build_request(&ctx(), &["first fix".to_string(), "second fix".to_string()], 3);
        let first = request.user_prompt.find("first fix").unwrap();
        let second = request.user_prompt.find("second fix").unwrap();
        assert!(first < second);
        assert_eq!(request.attempt, 3);
        assert_eq!(request.batch_pages, vec![1, 2]);
    }
}
