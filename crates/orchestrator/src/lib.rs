pub mod config;
pub mod handlers;
pub mod orchestrator;
pub mod timers;
pub mod workers;

pub use config::OrchestratorConfig;
pub use handlers::{AutopickExecutor, DraftEventHandler};
pub use orchestrator::Orchestrator;
pub use timers::TimerRegistry;
pub use workers::{TimeoutHandler, WorkerPool};
