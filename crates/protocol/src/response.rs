use crate::error::{ResponseError, Result};
use crate::event::Event;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body returned by an event producer for one batch of pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProducerResponse {
    /// Events in page-major, position-within-page order
    pub events: Vec<Event>,
}

/// Decode a raw producer body into events.
///
/// Tolerates a surrounding markdown code fence (```` ```json ````), which
/// chat models add even when asked for bare JSON. Rejects empty fingerprints
/// and page 0, since neither can be located in any page.
pub fn parse_response(raw: &str) -> Result<ProducerResponse> {
    let body = strip_code_fence(raw);
    let response: ProducerResponse = serde_json::from_str(body)?;

    for (index, event) in response.events.iter().enumerate() {
        if event.page_number == 0 {
            return Err(ResponseError::ZeroPage { index });
        }
        if event.fingerprint.is_empty() {
            return Err(ResponseError::EmptyFingerprint {
                index,
                kind: event.kind,
                page: event.page_number,
            });
        }
    }

    Ok(response)
}

/// JSON schema of [`ProducerResponse`], suitable for structured-output APIs
#[must_use]
pub fn event_response_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(ProducerResponse);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string (`json`) on the opening fence line
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use pretty_assertions::assert_eq;

    const BODY: &str = r#"{
        "events": [
            {"event": "ENDS", "level": "section", "page_number": 5, "fingerprint": "end of three."},
            {"event": "STARTS", "level": "section", "title": "4. Results", "page_number": 5, "fingerprint": "4. Results"}
        ]
    }"#;

    #[test]
    fn parses_plain_body() {
        let response = parse_response(BODY).unwrap();
        assert_eq!(response.events.len(), 2);
        assert_eq!(response.events[1].kind, EventKind::Start);
        assert_eq!(response.events[1].title.as_deref(), Some("4. Results"));
    }

    #[test]
    fn parses_fenced_body() {
        let fenced = format!("```json\n{BODY}\n```");
        let response = parse_response(&fenced).unwrap();
        assert_eq!(response.events.len(), 2);
    }

    #[test]
    fn empty_event_list_is_valid() {
        let response = parse_response(r#"{"events": []}"#).unwrap();
        assert!(response.events.is_empty());
    }

    #[test]
    fn rejects_empty_fingerprint() {
        let err = parse_response(
            r#"{"events":[{"event":"CONTINUATION","level":"list","page_number":2,"fingerprint":""}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResponseError::EmptyFingerprint { index: 0, page: 2, .. }
        ));
    }

    #[test]
    fn rejects_page_zero() {
        let err = parse_response(
            r#"{"events":[{"event":"ENDS","level":"list","page_number":0,"fingerprint":"x"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ResponseError::ZeroPage { index: 0 }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_response("I could not find any events"),
            Err(ResponseError::Json(_))
        ));
    }

    #[test]
    fn schema_describes_events() {
        let schema = event_response_schema();
        let text = schema.to_string();
        assert!(text.contains("events"));
        assert!(text.contains("fingerprint"));
        assert!(text.contains("STARTS"));
    }
}
