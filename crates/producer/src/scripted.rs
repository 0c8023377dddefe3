use crate::error::{ProducerError, Result};
use crate::producer::{EventProducer, ProducerRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Producer that replays canned response bodies in order.
///
/// Used for offline replays of recorded documents and in tests. Every
/// request is recorded so callers can inspect the prompts that were sent.
#[derive(Debug, Default)]
pub struct ScriptedProducer {
    responses: Mutex<VecDeque<String>>,
    repeat_last: bool,
    last: Mutex<Option<String>>,
    requests: Mutex<Vec<ProducerRequest>>,
}

impl ScriptedProducer {
    /// Replay `responses` once each; further calls fail
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Answer every request with the same body
    pub fn repeating(response: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([response.into()])),
            repeat_last: true,
            ..Default::default()
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ProducerRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl EventProducer for ScriptedProducer {
    async fn produce(&self, request: &ProducerRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        match next {
            Some(body) => {
                *last = Some(body.clone());
                Ok(body)
            }
            None if self.repeat_last => last
                .clone()
                .ok_or_else(|| ProducerError::producer("scripted producer has no responses")),
            None => Err(ProducerError::producer(format!(
                "scripted producer exhausted after {} call(s)",
                self.calls() - 1
            ))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(attempt: u32) -> ProducerRequest {
        ProducerRequest {
            system_prompt: String::new(),
            user_prompt: format!("attempt {attempt}"),
            attempt,
            batch_pages: vec![1],
        }
    }

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let producer = ScriptedProducer::new(["a", "b"]);
        assert_eq!(producer.produce(&request(1)).await.unwrap(), "a");
        assert_eq!(producer.produce(&request(2)).await.unwrap(), "b");
        assert!(matches!(
            producer.produce(&request(3)).await,
            Err(ProducerError::Producer(_))
        ));
        assert_eq!(producer.calls(), 3);
        assert_eq!(producer.requests()[1].user_prompt, "attempt 2");
    }

    #[tokio::test]
    async fn repeating_never_runs_dry() {
        let producer = ScriptedProducer::repeating("same");
        for attempt in 1..=5 {
            assert_eq!(producer.produce(&request(attempt)).await.unwrap(), "same");
        }
        assert_eq!(producer.remaining(), 0);
    }
}
