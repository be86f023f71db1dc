use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A catalog item with the same name (case-insensitive) already exists.
    #[error("an item named \"{name}\" already exists")]
    DuplicateItem { name: String },

    /// A catalog item name was empty after trimming.
    #[error("item name cannot be empty")]
    EmptyItemName,

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
