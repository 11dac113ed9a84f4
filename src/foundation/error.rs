/// Convenience result type used across gifcast.
pub type GifResult<T> = Result<T, GifError>;

/// Top-level error taxonomy used by encoder APIs.
#[derive(thiserror::Error, Debug)]
pub enum GifError {
    /// Width or height is zero or does not fit the 16-bit GIF screen fields.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// A frame buffer whose length is not `width * height * 4`.
    #[error("invalid frame size: expected {expected} bytes, got {actual}")]
    InvalidFrameSize {
        /// Required RGBA byte length.
        expected: usize,
        /// Length of the buffer that was supplied.
        actual: usize,
    },

    /// `start` was called on a stream that already wrote its header.
    #[error("encoder already started")]
    AlreadyStarted,

    /// Any operation after `finish` wrote the trailer.
    #[error("encoder session already finished")]
    SessionAlreadyFinished,

    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// An output sink refused or failed to accept produced bytes.
    #[error("sink error: {0}")]
    Sink(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifError {
    /// Build a [`GifError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GifError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`GifError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
