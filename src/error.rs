use thiserror::Error;

/// Errors produced by the audio engine.
#[derive(Debug, Error)]
pub enum FrettyError {
    /// A precondition on an argument was violated (bad rate, duration,
    /// offset, cutoff, note name, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A waveform file uses a sample encoding the codec cannot read.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Codec error: {0}")]
    Codec(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Playback error: {0}")]
    Playback(String),
}

pub type Result<T, E = FrettyError> = std::result::Result<T, E>;

/// Shorthand for building an [`FrettyError::InvalidArgument`].
pub(crate) fn invalid(msg: impl Into<String>) -> FrettyError {
    FrettyError::InvalidArgument(msg.into())
}
