use std::time::Duration;

/// Dispatcher-facing configuration; defaults mirror spec §6.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub batch_size: i64,
    pub fallback_interval: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            fallback_interval: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}
