pub mod codec;
pub mod domain;
pub mod dto;
pub mod error;
pub mod rules;

pub use codec::{decode, encode, Document, HeaderStatus};
pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use rules::*;
