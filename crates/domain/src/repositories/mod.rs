pub mod draft;
pub mod outbox;
pub mod player_pool;

pub use draft::{ClaimedSlot, DraftRepository, MakePickOutcome, PlayerPool};
pub use outbox::OutboxRepository;
pub use player_pool::InMemoryPlayerPool;
