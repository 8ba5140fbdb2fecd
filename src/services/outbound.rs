use std::{future::Future, time::Duration};

use tokio::time::{sleep, timeout, Instant};

use crate::{config::OutboundConfig, errors::EvaluationError};

/// Timeout and retry budget applied to every call to an external collaborator.
#[derive(Debug, Clone, Copy)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl CallPolicy {
    pub fn from_config(config: &OutboundConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            base_backoff: config.backoff(),
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt)
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, EvaluationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EvaluationError>>,
    {
        let mut attempt = 0;
        loop {
            let started = Instant::now();
            let outcome = match timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(EvaluationError::Timeout(self.timeout.as_secs())),
            };
            let elapsed_ms = started.elapsed().as_millis();

            match outcome {
                Ok(value) => {
                    log::info!(
                        "{} succeeded on attempt {} in {}ms",
                        operation,
                        attempt + 1,
                        elapsed_ms
                    );
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff_for(attempt);
                    log::warn!(
                        "{} attempt {} failed after {}ms: {}; retrying in {}ms",
                        operation,
                        attempt + 1,
                        elapsed_ms,
                        err,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    log::error!(
                        "{} failed on attempt {} after {}ms: {}",
                        operation,
                        attempt + 1,
                        elapsed_ms,
                        err
                    );
                    return Err(err);
                }
            }
        }
    }
}
