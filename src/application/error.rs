use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Entry ID '{prefix}' is ambiguous ({matches} entries match); use more digits")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
