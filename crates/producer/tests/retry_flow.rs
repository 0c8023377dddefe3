use async_trait::async_trait;
use pagestitch_producer::{
    BatchContext, CancellationToken, EventProducer, ProducerError, ProducerRequest, RetryConfig,
    RetryController, ScriptedProducer,
};
use pagestitch_protocol::ErrorKind;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const OUT_OF_RANGE: &str = r#"{"events":[
    {"event":"STARTS","level":"section","title":"Intro","page_number":1,"fingerprint":"Intro"},
    {"event":"ENDS","level":"section","page_number":5,"fingerprint":"done."}
]}"#;

const IN_RANGE: &str = r#"{"events":[
    {"event":"STARTS","level":"section","title":"Intro","page_number":1,"fingerprint":"Intro"},
    {"event":"ENDS","level":"section","page_number":3,"fingerprint":"done."}
]}"#;

fn batch() -> BatchContext {
    BatchContext::new(
        [
            (1, "Intro to the report.".to_string()),
            (2, "Middle page.".to_string()),
            (3, "All done.".to_string()),
        ]
        .into_iter()
        .collect(),
        Vec::new(),
    )
}

fn controller(producer: Arc<dyn EventProducer>, max_attempts: u32) -> RetryController {
    RetryController::new(
        producer,
        RetryConfig {
            max_attempts,
            ..Default::default()
        },
    )
    .unwrap()
}

#[tokio::test]
async fn retries_once_with_correction_then_succeeds() {
    let producer = Arc::new(ScriptedProducer::new([OUT_OF_RANGE, IN_RANGE]));
    let events = controller(producer.clone(), 3)
        .obtain_validated_events(&batch(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[1].page_number, 3);

    let requests = producer.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].user_prompt.contains("CORRECTION"));
    let retry_prompt = &requests[1].user_prompt;
    assert!(retry_prompt.contains("page_number 5"), "{retry_prompt}");
    assert!(retry_prompt.contains("between 1 and 3 inclusive"), "{retry_prompt}");
    assert_eq!(requests[1].attempt, 2);
}

#[tokio::test]
async fn gives_up_after_exactly_max_attempts() {
    for max_attempts in 1..=4 {
        let producer = Arc::new(ScriptedProducer::repeating(OUT_OF_RANGE));
        let err = controller(producer.clone(), max_attempts)
            .obtain_validated_events(&batch(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(producer.calls(), max_attempts as usize);
        assert_eq!(err.kind(), ErrorKind::PageRangeViolation);
        match err {
            ProducerError::PageRangeViolation {
                violation,
                attempts,
            } => {
                assert_eq!(attempts, max_attempts);
                assert_eq!(violation.invalid_pages, vec![5]);
                assert_eq!(violation.valid_range, (1, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[tokio::test]
async fn corrections_accumulate_across_attempts() {
    let producer = Arc::new(ScriptedProducer::repeating(OUT_OF_RANGE));
    let _ = controller(producer.clone(), 3)
        .obtain_validated_events(&batch(), &CancellationToken::new())
        .await;

    let last = &producer.requests()[2].user_prompt;
    assert_eq!(last.matches("CORRECTION").count(), 2);
}

#[test]
fn zero_attempts_is_rejected() {
    let producer = Arc::new(ScriptedProducer::new([IN_RANGE]));
    let result = RetryController::new(
        producer,
        RetryConfig {
            max_attempts: 0,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(ProducerError::InvalidConfig(_))));
}

#[tokio::test]
async fn malformed_body_is_not_retried() {
    let producer = Arc::new(ScriptedProducer::new(["not json", IN_RANGE]));
    let err = controller(producer.clone(), 3)
        .obtain_validated_events(&batch(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProducerError::MalformedResponse { attempt: 1, .. }
    ));
    assert_eq!(producer.calls(), 1);
}

#[tokio::test]
async fn already_cancelled_token_skips_the_producer() {
    let producer = Arc::new(ScriptedProducer::new([IN_RANGE]));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = controller(producer.clone(), 3)
        .obtain_validated_events(&batch(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ProducerError::Cancelled));
    assert_eq!(producer.calls(), 0);
}

/// Never answers; lets tests exercise cancellation and timeouts
struct Stalled;

#[async_trait]
impl EventProducer for Stalled {
    async fn produce(&self, _request: &ProducerRequest) -> pagestitch_producer::Result<String> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_a_pending_call() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    let err = controller(Arc::new(Stalled), 3)
        .obtain_validated_events(&batch(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ProducerError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn timeout_surfaces_without_retrying() {
    let controller = RetryController::new(
        Arc::new(Stalled),
        RetryConfig {
            max_attempts: 3,
            attempt_timeout_ms: Some(250),
        },
    )
    .unwrap();

    let err = controller
        .obtain_validated_events(&batch(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProducerError::Timeout {
            attempt: 1,
            timeout_ms: 250
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Timeout);
}
