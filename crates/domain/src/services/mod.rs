pub mod autopick;
pub mod retry;
pub mod store;

pub use autopick::{AutopickStrategy, SelectedClaim, UniformRandomStrategy};
pub use retry::{Backoff, RetryPolicy};
pub use store::DraftStoreService;
