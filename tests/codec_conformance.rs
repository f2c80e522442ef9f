//! Wire-format conformance tests.
//!
//! Pins the exact bit layout of the compressed stream: tag bits, literal
//! payloads, back-reference fields stored as value minus one, and the
//! zero-padded final byte. These byte sequences are load-bearing; a decoder
//! built elsewhere with the same settings must accept them.

use squeeze::{decode_to_vec, encode_to_vec, Decoder, Encoder, Error, Finish, Poll};

#[test]
fn test_literals_only_stream_layout() {
    // W = 8, L = 7: five incompressible bytes, each 9 bits on the wire.
    let encoded = encode_to_vec(&[0x00, 0x01, 0x02, 0x03, 0x04], 8, 7).unwrap();
    assert_eq!(encoded, [0x80, 0x40, 0x60, 0x50, 0x38, 0x20]);
}

#[test]
fn test_byte_run_stream_layout() {
    // 'a' x5: literal 'a', then a distance-1 length-4 self-overlapping
    // back-reference.
    let encoded = encode_to_vec(b"aaaaa", 8, 7).unwrap();
    assert_eq!(encoded, [0xB0, 0x80, 0x01, 0x80]);
}

#[test]
fn test_repeated_substring_stream_layout() {
    let encoded = encode_to_vec(b"abcdabcd", 8, 3).unwrap();
    assert_eq!(encoded, [0xB0, 0xD8, 0xAC, 0x76, 0x40, 0x1B]);
}

#[test]
fn test_repeated_substring_with_trailing_literal_layout() {
    let encoded = encode_to_vec(b"abcdabcde", 8, 3).unwrap();
    assert_eq!(encoded, [0xB0, 0xD8, 0xAC, 0x76, 0x40, 0x1B, 0xB2, 0x80]);
}

#[test]
fn test_decode_known_literal_stream() {
    let decoded = decode_to_vec(&[0xB3, 0x5B, 0xED, 0xE0], 7, 3).unwrap();
    assert_eq!(decoded, b"foo");
}

#[test]
fn test_decode_known_backref_stream() {
    let decoded = decode_to_vec(&[0xB3, 0x5B, 0xED, 0xE0, 0x40, 0x80], 7, 7).unwrap();
    assert_eq!(decoded, b"foofoo");
}

#[test]
fn test_empty_stream_roundtrip() {
    let encoded = encode_to_vec(&[], 8, 4).unwrap();
    assert_eq!(encoded, Vec::<u8>::new());
    assert_eq!(decode_to_vec(&[], 8, 4).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_single_byte_roundtrip() {
    let encoded = encode_to_vec(&[0x42], 8, 4).unwrap();
    // Tag bit + 8 literal bits, zero-padded: 1_01000010 -> A1 00
    assert_eq!(encoded, [0xA1, 0x00]);
    assert_eq!(decode_to_vec(&encoded, 8, 4).unwrap(), [0x42]);
}

#[test]
fn test_trailing_padding_reads_as_incomplete_backref() {
    // After the last literal of "foo", five zero bits of padding remain.
    // They decode as a back-reference tag whose fields never complete, which
    // finish() must treat as a clean end of stream.
    let mut decoder = Decoder::new(256, 7, 3).unwrap();
    decoder.sink(&[0xB3, 0x5B, 0xED, 0xE0]).unwrap();
    let mut out = [0u8; 8];
    let (n, poll) = decoder.poll(&mut out).unwrap();
    assert_eq!(poll, Poll::Empty);
    assert_eq!(&out[..n], b"foo");
    assert_eq!(decoder.finish(), Finish::Done);
}

#[test]
fn test_encoder_misuse_sequencing() {
    let mut encoder = Encoder::new(8, 4).unwrap();
    let big = [0u8; 300];
    assert_eq!(encoder.sink(&big).unwrap(), 256);
    // Active half is full; sinking again without polling is a misuse.
    assert_eq!(encoder.sink(&big).unwrap_err(), Error::SinkWhileProcessing);

    let mut encoder = Encoder::new(8, 4).unwrap();
    encoder.sink(b"abc").unwrap();
    encoder.finish();
    assert_eq!(encoder.sink(b"d").unwrap_err(), Error::SinkAfterFinish);
}

#[test]
fn test_decoder_sink_when_full_is_nonfatal() {
    let mut decoder = Decoder::new(2, 8, 4).unwrap();
    assert_eq!(decoder.sink(&[0xA1, 0x00, 0xFF]).unwrap(), 2);
    assert_eq!(decoder.sink(&[0xFF]).unwrap(), 0);

    // Draining makes room again.
    let mut out = [0u8; 4];
    let (n, _) = decoder.poll(&mut out).unwrap();
    assert_eq!(&out[..n], &[0x42]);
    assert!(decoder.sink(&[0xFF]).unwrap() > 0);
}

#[test]
fn test_zero_capacity_poll_is_misuse() {
    let mut encoder = Encoder::new(8, 4).unwrap();
    assert_eq!(encoder.poll(&mut []).unwrap_err(), Error::EmptyOutputBuffer);
    let mut decoder = Decoder::new(256, 8, 4).unwrap();
    assert_eq!(decoder.poll(&mut []).unwrap_err(), Error::EmptyOutputBuffer);
}

#[test]
fn test_construction_bounds() {
    assert!(Encoder::new(4, 3).is_ok());
    assert!(Encoder::new(15, 15).is_ok());
    assert!(Encoder::new(3, 3).is_err());
    assert!(Encoder::new(16, 8).is_err());
    assert!(Encoder::new(8, 2).is_err());
    assert!(Encoder::new(8, 9).is_err());

    assert!(Decoder::new(1, 4, 3).is_ok());
    assert!(Decoder::new(0, 8, 4).is_err());
    assert!(Decoder::new(256, 16, 4).is_err());
    assert!(Decoder::new(256, 8, 16).is_err());
}

#[test]
fn test_encoder_finish_sequencing() {
    let mut encoder = Encoder::new(8, 7).unwrap();
    encoder.sink(b"aaaaa").unwrap();

    // Nothing is processed until finish (the window never filled).
    let mut out = [0u8; 64];
    assert_eq!(encoder.poll(&mut out).unwrap(), (0, Poll::Empty));

    assert_eq!(encoder.finish(), Finish::More);
    let (n, poll) = encoder.poll(&mut out).unwrap();
    assert_eq!(poll, Poll::Empty);
    assert_eq!(&out[..n], &[0xB0, 0x80, 0x01, 0x80]);
    assert_eq!(encoder.finish(), Finish::Done);
}

#[test]
fn test_matched_settings_across_the_parameter_space() {
    let data = b"the quick brown fox jumps over the lazy dog, the lazy dog";
    for (window, lookahead) in [(4u8, 3u8), (7, 4), (8, 4), (8, 7), (11, 4), (13, 5)] {
        let encoded = encode_to_vec(data, window, lookahead).unwrap();
        let decoded = decode_to_vec(&encoded, window, lookahead).unwrap();
        assert_eq!(
            decoded, data,
            "roundtrip failed for W={window} L={lookahead}"
        );
    }
}
