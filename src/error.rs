use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantizeError {
    /// Malformed or out-of-range arguments: dimension mismatches, bad `k`, empty data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failures surfaced by collaborators at the I/O boundary (decode, encode, filesystem).
    #[error("resource failure: {0}")]
    ResourceFailure(String),
}

impl QuantizeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QuantizeError::InvalidInput(msg.into())
    }
}

impl From<image::ImageError> for QuantizeError {
    fn from(e: image::ImageError) -> Self {
        QuantizeError::ResourceFailure(e.to_string())
    }
}

impl From<std::io::Error> for QuantizeError {
    fn from(e: std::io::Error) -> Self {
        QuantizeError::ResourceFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuantizeError>;
