use std::time::Duration;

/// Retries expressed as data rather than ad-hoc loops, per spec §9. Shared
/// by the dispatcher's publish path (linear) and reused by the
/// orchestrator's `FetchNextDeadline` retry path (exponential), so both
/// components compute backoff the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Linear,
    Exponential,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts, base_delay, backoff: Backoff::Linear }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts, base_delay, backoff: Backoff::Exponential }
    }

    /// Delay to wait before the given 1-indexed attempt number.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear => self.base_delay * attempt,
            Backoff::Exponential => self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1)),
        }
    }

    /// Runs `op` up to `max_attempts` times, sleeping `delay_before` between
    /// attempts. Returns the last error if every attempt fails.
    pub async fn run<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.delay_before(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
