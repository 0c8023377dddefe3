use crate::error::{ProducerError, Result};
use crate::producer::{BatchContext, EventProducer, ProducerRequest};
use crate::prompts;
use crate::validator::validate_page_numbers;
use pagestitch_protocol::{parse_response, Event};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Configuration for the page validation retry loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per batch, including the first
    pub max_attempts: u32,

    /// Time limit for a single producer call; `None` waits indefinitely
    pub attempt_timeout_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout_ms: None,
        }
    }
}

impl RetryConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be >= 1".to_string());
        }
        if self.attempt_timeout_ms == Some(0) {
            return Err("attempt_timeout_ms must be > 0 when set".to_string());
        }
        Ok(())
    }
}

/// Obtains page-valid events for a batch, re-prompting the producer with
/// corrective instructions when it references pages outside the batch.
pub struct RetryController {
    producer: Arc<dyn EventProducer>,
    config: RetryConfig,
}

impl RetryController {
    pub fn new(producer: Arc<dyn EventProducer>, config: RetryConfig) -> Result<Self> {
        config.validate().map_err(ProducerError::invalid_config)?;
        Ok(Self { producer, config })
    }

    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Ask the producer for the batch's events until they only reference
    /// batch pages, at most `max_attempts` times.
    ///
    /// Cancellation and timeouts end the loop at once without spending an
    /// attempt. Malformed bodies and producer failures are not retried.
    pub async fn obtain_validated_events(
        &self,
        ctx: &BatchContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<Event>> {
        let batch_pages = ctx.page_numbers();
        let mut corrections: Vec<String> = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(ProducerError::Cancelled);
            }

            let request = prompts::build_request(ctx, &corrections, attempt);
            let raw = self.call(&request, cancel).await?;
            let response = parse_response(&raw)
                .map_err(|source| ProducerError::MalformedResponse { attempt, source })?;

            match validate_page_numbers(&batch_pages, &response.events) {
                Ok(()) => {
                    log::debug!(
                        "{} returned {} valid event(s) on attempt {attempt}",
                        self.producer.name(),
                        response.events.len()
                    );
                    return Ok(response.events);
                }
                Err(violation) if attempt >= self.config.max_attempts => {
                    log::warn!(
                        "Giving up after {attempt} attempt(s): {violation}"
                    );
                    return Err(ProducerError::PageRangeViolation {
                        violation,
                        attempts: attempt,
                    });
                }
                Err(violation) => {
                    log::warn!(
                        "Attempt {attempt}/{} rejected: {violation}; retrying with correction",
                        self.config.max_attempts
                    );
                    corrections.push(prompts::corrective_instruction(attempt, &violation));
                }
            }
        }
    }

    async fn call(&self, request: &ProducerRequest, cancel: &CancellationToken) -> Result<String> {
        let attempt = request.attempt;
        let limit = self.config.attempt_timeout_ms;
        let produce = async {
            match limit {
                Some(timeout_ms) => {
                    match tokio::time::timeout(
                        Duration::from_millis(timeout_ms),
                        self.producer.produce(request),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ProducerError::Timeout {
                            attempt,
                            timeout_ms,
                        }),
                    }
                }
                None => self.producer.produce(request).await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ProducerError::Cancelled),
            result = produce => result,
        }
    }
}
