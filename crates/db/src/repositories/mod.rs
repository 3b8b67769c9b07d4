pub mod draft;
pub mod outbox;

pub use draft::SqlxDraftRepository;
pub use outbox::SqlxOutboxRepository;
