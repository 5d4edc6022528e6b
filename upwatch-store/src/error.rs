use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store document error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
