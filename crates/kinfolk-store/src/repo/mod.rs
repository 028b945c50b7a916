pub mod contacts;
pub mod interactions;

pub use contacts::{ContactRepository, ContactScan, LoadedContact, NewContact, SkippedFile};
