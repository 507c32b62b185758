use thiserror::Error;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("malformed span state: {0}")]
    Record(String),

    #[error("tag parse error: {0}")]
    Tags(String),

    #[error("context extraction error: {0}")]
    Extraction(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StitchError>;
