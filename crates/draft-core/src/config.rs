use std::time::Duration;

use eventbus::EventBusConfig;
use orchestrator::OrchestratorConfig;
use outbox_dispatcher::DispatcherConfig;

/// Process-wide configuration, loaded once in `main` the way `api::Config`
/// loads its own: `dotenvy::dotenv()` then named environment variables with
/// explicit defaults, never a generic layered loader.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nats_url: String,
    pub num_workers: usize,
    pub work_queue_depth: usize,
    pub pick_batch_size: i64,
    pub fallback_interval: Duration,
    pub max_deliver: i64,
    pub ack_wait: Duration,
    pub duplicate_window: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub shutdown_deadline: Duration,
    /// No player catalog exists in this core (an explicit non-goal); this
    /// many synthetic player ids are generated at startup so autopick has a
    /// candidate universe to draw from.
    pub synthetic_player_pool_size: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://127.0.0.1:4222".to_string());

        let num_workers: usize = env_or("DRAFT_CORE_NUM_WORKERS", 10);
        let work_queue_depth: usize = env_or("DRAFT_CORE_WORK_QUEUE_DEPTH", 2 * num_workers);

        Ok(Config {
            database_url,
            nats_url,
            num_workers,
            work_queue_depth,
            pick_batch_size: env_or("DRAFT_CORE_PICK_BATCH_SIZE", 100),
            fallback_interval: Duration::from_secs(env_or("DRAFT_CORE_FALLBACK_INTERVAL_SECS", 30)),
            max_deliver: env_or("DRAFT_CORE_MAX_DELIVER", 5),
            ack_wait: Duration::from_secs(env_or("DRAFT_CORE_ACK_WAIT_SECS", 30)),
            duplicate_window: Duration::from_secs(env_or("DRAFT_CORE_DUPLICATE_WINDOW_SECS", 7200)),
            max_retries: env_or("DRAFT_CORE_MAX_RETRIES", 3),
            retry_delay: Duration::from_millis(env_or("DRAFT_CORE_RETRY_DELAY_MS", 1000)),
            shutdown_deadline: Duration::from_secs(env_or("DRAFT_CORE_SHUTDOWN_DEADLINE_SECS", 10)),
            synthetic_player_pool_size: env_or("DRAFT_CORE_SYNTHETIC_PLAYER_POOL_SIZE", 500),
        })
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            num_workers: self.num_workers,
            work_queue_depth: self.work_queue_depth,
            pick_batch_size: self.pick_batch_size,
        }
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            batch_size: self.pick_batch_size,
            fallback_interval: self.fallback_interval,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
        }
    }

    pub fn event_bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            nats_url: self.nats_url.clone(),
            max_deliver: self.max_deliver,
            ack_wait: self.ack_wait,
            duplicate_window: self.duplicate_window,
            ..EventBusConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_queue_depth_defaults_to_twice_the_worker_count() {
        std::env::remove_var("DRAFT_CORE_WORK_QUEUE_DEPTH");
        std::env::set_var("DRAFT_CORE_NUM_WORKERS", "4");
        let num_workers: usize = env_or("DRAFT_CORE_NUM_WORKERS", 10);
        let work_queue_depth: usize = env_or("DRAFT_CORE_WORK_QUEUE_DEPTH", 2 * num_workers);
        assert_eq!(num_workers, 4);
        assert_eq!(work_queue_depth, 8);
        std::env::remove_var("DRAFT_CORE_NUM_WORKERS");
    }

    #[test]
    fn env_or_falls_back_on_missing_or_unparseable_values() {
        std::env::remove_var("DRAFT_CORE_PICK_BATCH_SIZE");
        let value: i64 = env_or("DRAFT_CORE_PICK_BATCH_SIZE", 100);
        assert_eq!(value, 100);

        std::env::set_var("DRAFT_CORE_PICK_BATCH_SIZE", "not-a-number");
        let value: i64 = env_or("DRAFT_CORE_PICK_BATCH_SIZE", 100);
        assert_eq!(value, 100);
        std::env::remove_var("DRAFT_CORE_PICK_BATCH_SIZE");
    }
}
