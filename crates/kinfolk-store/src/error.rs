use kinfolk_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("invalid contact name for a file: {0}")]
    InvalidName(String),
    #[error("not a contact file ({reason}): {path}")]
    InvalidContact { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Core,
    Watch,
    NotFound,
    AlreadyExists,
    InvalidName,
    InvalidContact,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::Watch(_) => StoreErrorKind::Watch,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::AlreadyExists(_) => StoreErrorKind::AlreadyExists,
            StoreError::InvalidName(_) => StoreErrorKind::InvalidName,
            StoreError::InvalidContact { .. } => StoreErrorKind::InvalidContact,
        }
    }
}
