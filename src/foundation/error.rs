/// Convenience result type used across seewav.
pub type SeewavResult<T> = Result<T, SeewavError>;

/// Top-level error taxonomy for a generation run.
#[derive(thiserror::Error, Debug)]
pub enum SeewavError {
    /// Out-of-range or non-finite generation options. Rejected before any work starts.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The input audio could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The video encoder or muxer rejected its input.
    #[error("encode error: {0}")]
    Encode(String),

    /// The run was cancelled by its caller.
    ///
    /// Only used to unwind a worker; it is never reported to the caller as an `error` message.
    #[error("cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SeewavError {
    /// Build a [`SeewavError::InvalidOptions`] value.
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Build a [`SeewavError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SeewavError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Return `true` for the cancellation marker.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
