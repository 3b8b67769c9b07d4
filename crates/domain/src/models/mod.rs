pub mod draft;
pub mod events;
pub mod outbox;

pub use draft::{build_picks, Draft, DraftPick, DraftSettings, DraftStatus, DraftType};
pub use events::{DraftEvent, EventPayload, EventType};
pub use outbox::OutboxRecord;
