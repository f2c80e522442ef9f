//! Error types for the squeeze library.

use std::fmt;

use crate::{MAX_WINDOW_BITS, MIN_LOOKAHEAD_BITS, MIN_WINDOW_BITS};

/// Result type alias for squeeze operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or driving a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Window exponent outside the supported range.
    InvalidWindowBits(u8),
    /// Lookahead exponent outside the supported range for the chosen window.
    InvalidLookaheadBits {
        /// Requested lookahead exponent.
        lookahead_bits: u8,
        /// Window exponent it was paired with.
        window_bits: u8,
    },
    /// Decoder input buffer size of zero.
    InvalidInputBufferSize,
    /// `sink` was called after `finish` signaled end of input.
    SinkAfterFinish,
    /// `sink` was called while buffered input was still being processed.
    SinkWhileProcessing,
    /// `poll` was called with a zero-capacity output buffer.
    EmptyOutputBuffer,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidWindowBits(bits) => {
                write!(
                    f,
                    "Invalid window bits {}: must be {}-{}",
                    bits, MIN_WINDOW_BITS, MAX_WINDOW_BITS
                )
            }
            Error::InvalidLookaheadBits {
                lookahead_bits,
                window_bits,
            } => {
                write!(
                    f,
                    "Invalid lookahead bits {}: must be {}-{} (window bits)",
                    lookahead_bits, MIN_LOOKAHEAD_BITS, window_bits
                )
            }
            Error::InvalidInputBufferSize => {
                write!(f, "Decoder input buffer size must be at least 1")
            }
            Error::SinkAfterFinish => {
                write!(f, "Cannot sink more input after finish")
            }
            Error::SinkWhileProcessing => {
                write!(
                    f,
                    "Cannot sink while buffered input is being processed; poll first"
                )
            }
            Error::EmptyOutputBuffer => {
                write!(f, "Output buffer must have room for at least one byte")
            }
        }
    }
}

impl std::error::Error for Error {}
