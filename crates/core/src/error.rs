#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Unexpected decoder input: {0}")]
    UnexpectedDecoderInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
