pub mod contact;
pub mod field;
pub mod interaction;
pub mod relationship;

pub use contact::ContactRecord;
pub use field::{normalize_field_key, RESERVED_KEYS};
pub use interaction::{Interaction, InteractionLog};
pub use relationship::{normalize_relationship, register_relationship};
