use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("store error: {0}")]
    Store(#[from] order_store::StoreError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
