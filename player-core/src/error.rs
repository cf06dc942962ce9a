use thiserror::Error;

use crate::decoder::DecoderError;

/// Errors surfaced to the Controller's caller. Underruns are deliberately
/// absent: they're a [`crate::metrics::Metrics`] counter, not a failure,
/// since the callback recovers on its own by emitting silence.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Decode(#[from] DecoderError),

    #[error("no more ring capacity could be reserved for this stream")]
    ResourceExhaustion,

    #[error("failed to start or stop the audio output stream: {0}")]
    StreamControl(String),

    #[error("producer thread did not shut down within the configured timeout")]
    ShutdownTimeout,

    #[error("seek request is invalid: {0}")]
    InvalidSeek(String),
}
