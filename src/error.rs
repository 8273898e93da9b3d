use crate::model::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("LockError: {0}")]
    LockError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("StoreError: {}", crate::unpack_error(.0))]
    StoreError(#[from] StoreError),
    #[error("ValidationError: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("BodyError: {0}")]
    BodyError(String),
    #[error("Panic: {0}")]
    Panic(String),
}

impl HandlerError {
    /// Short, client-facing kind used as the `error` detail in development responses.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::StoreError(_) => "StoreError",
            HandlerError::ValidationError(_) => "ValidationError",
            HandlerError::BodyError(_) => "BodyError",
            HandlerError::Panic(_) => "Panic",
        }
    }
}
