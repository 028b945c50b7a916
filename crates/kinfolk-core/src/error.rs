use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("contact name is required")]
    MissingName,
    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("invalid field name: {0}")]
    InvalidFieldKey(String),
    #[error("field already exists: {0}")]
    DuplicateField(String),
    #[error("field is managed separately: {0}")]
    ReservedField(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("interaction text is required")]
    EmptyInteraction,
    #[error("interaction index {index} out of range ({len} entries)")]
    InteractionIndex { index: usize, len: usize },
    #[error("invalid sort column: {0}")]
    InvalidSortColumn(String),
    #[error("invalid sort direction: {0}")]
    InvalidSortDirection(String),
    #[error("failed to encode header: {0}")]
    Encode(String),
}
