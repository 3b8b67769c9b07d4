pub mod draft;
pub mod outbox;

pub use draft::{DraftPickRow, DraftRow};
pub use outbox::OutboxRow;
