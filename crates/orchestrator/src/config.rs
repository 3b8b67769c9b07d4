/// Orchestrator-facing configuration; defaults mirror spec §6.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub num_workers: usize,
    pub work_queue_depth: usize,
    /// Used only by the optional polling reconciliation pass (spec §9's
    /// belt-and-suspenders variant); the default runtime path is
    /// event-driven timers and never calls `FetchDraftsDueForPick`.
    pub pick_batch_size: i64,
}

impl OrchestratorConfig {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            work_queue_depth: 2 * num_workers,
            pick_batch_size: 100,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::new(10)
    }
}
