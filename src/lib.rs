//! # squeeze
//!
//! A streaming, bounded-memory LZSS compression library for targets where
//! only a few kilobytes of RAM are available.
//!
//! The encoder and decoder are incremental, non-blocking state machines
//! driven by two primitives: `sink` feeds input bytes, `poll` drains output
//! bytes, and `finish` signals (or queries) end of stream. All buffers are
//! sized at construction by a window exponent `window_bits` and a
//! maximum-match exponent `lookahead_bits`; nothing allocates after that.
//! Feeding one byte at a time and draining into a one-byte buffer are both
//! legal and produce byte-identical streams.
//!
//! ## Features
//!
//! - **Zero runtime dependencies by default**
//! - Fixed memory: encoder `2 * 2^window_bits` bytes, decoder
//!   `input_buffer_size + 2^window_bits` bytes
//! - Optional byte-chain search index via the `index` feature (on by
//!   default; identical output, faster search)
//! - Command-line tool via the `cli` feature
//!
//! ## Example
//!
//! ```rust
//! let data = b"streams within streams within streams";
//! let compressed = squeeze::encode_to_vec(data, 8, 4).unwrap();
//! let restored = squeeze::decode_to_vec(&compressed, 8, 4).unwrap();
//! assert_eq!(restored, data);
//! ```
//!
//! The bitstream has no header, length, or checksum; framing is the
//! caller's responsibility, and both sides must agree on `window_bits` and
//! `lookahead_bits`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};

/// Smallest supported window exponent.
pub const MIN_WINDOW_BITS: u8 = 4;

/// Largest supported window exponent.
pub const MAX_WINDOW_BITS: u8 = 15;

/// Smallest supported lookahead exponent; the largest is the window
/// exponent in use.
pub const MIN_LOOKAHEAD_BITS: u8 = 3;

/// Why `poll` stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// The codec needs more input (or is done); polling again without a
    /// `sink` makes no progress.
    Empty,
    /// The output buffer filled; poll again to continue draining.
    More,
}

/// Completion state reported by `finish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// The stream is fully processed.
    Done,
    /// Output remains; keep polling.
    More,
}

/// Scratch buffer size used by the one-shot helpers below.
const DRIVER_CHUNK: usize = 256;

/// Compress `input` in one call, driving an [`Encoder`] internally.
///
/// Convenience for callers that do not need streaming; see [`Encoder`] for
/// the incremental interface and the meaning of `window_bits` and
/// `lookahead_bits`.
pub fn encode_to_vec(input: &[u8], window_bits: u8, lookahead_bits: u8) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(window_bits, lookahead_bits)?;
    let mut output = Vec::new();
    let mut chunk = [0u8; DRIVER_CHUNK];

    let mut consumed = 0;
    while consumed < input.len() {
        consumed += encoder.sink(&input[consumed..])?;
        loop {
            let (n, poll) = encoder.poll(&mut chunk)?;
            output.extend_from_slice(&chunk[..n]);
            if poll == Poll::Empty {
                break;
            }
        }
    }
    while encoder.finish() == Finish::More {
        let (n, _) = encoder.poll(&mut chunk)?;
        output.extend_from_slice(&chunk[..n]);
    }
    Ok(output)
}

/// Decompress `input` in one call, driving a [`Decoder`] internally.
///
/// The parameters must match the encoder that produced `input`. Trailing
/// padding bits are ignored; an input truncated mid-symbol yields the bytes
/// decoded up to the truncation point.
pub fn decode_to_vec(input: &[u8], window_bits: u8, lookahead_bits: u8) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(DRIVER_CHUNK, window_bits, lookahead_bits)?;
    let mut output = Vec::new();
    let mut chunk = [0u8; DRIVER_CHUNK];

    let mut consumed = 0;
    while consumed < input.len() {
        consumed += decoder.sink(&input[consumed..])?;
        loop {
            let (n, poll) = decoder.poll(&mut chunk)?;
            output.extend_from_slice(&chunk[..n]);
            if poll == Poll::Empty {
                break;
            }
        }
    }
    Ok(output)
}
