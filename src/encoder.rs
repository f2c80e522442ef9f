//! Streaming LZSS encoder with a sliding window and bounded output.
//!
//! The encoder buffers input into the active half of a `2 * 2^window_bits`
//! buffer, searches the backlog half (older data) plus the already-scanned
//! active prefix for the longest match, and emits bit-packed literal and
//! back-reference symbols. It is a resumable state machine: `poll` runs
//! transitions until the output buffer fills or more input is needed, and a
//! later `poll` picks up exactly where it stopped, down to the bit.

use crate::bits::{BitPacker, OutputSink, BACKREF_MARKER, LITERAL_MARKER};
use crate::error::{Error, Result};
use crate::{Finish, Poll, MAX_WINDOW_BITS, MIN_LOOKAHEAD_BITS, MIN_WINDOW_BITS};

/// Matches must be strictly longer than this to beat the cost of emitting
/// the bytes as literals.
const BREAK_EVEN_POINT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Active half has free space; waiting on `sink`.
    NotFull,
    /// Active half is full (or input is finished); build the search index.
    Filled,
    /// Scan for the next longest match.
    Search,
    /// Emit the 1-bit literal/backref tag.
    YieldTagBit,
    /// Emit an 8-bit literal byte.
    YieldLiteral,
    /// Spool out the back-reference distance field.
    YieldBrIndex,
    /// Spool out the back-reference length field.
    YieldBrLength,
    /// Shift processed data into the backlog, or begin finishing.
    SaveBacklog,
    /// Emit the final zero-padded partial byte, if any.
    FlushBits,
    /// Terminal; `poll` has nothing further.
    Done,
}

/// Incremental LZSS encoder.
///
/// Buffer sizes are fixed by `window_bits` and `lookahead_bits` at
/// construction; `sink`, `poll`, and `finish` never allocate.
///
/// # Example
///
/// ```
/// use squeeze::{Encoder, Finish};
///
/// let mut encoder = Encoder::new(8, 4).unwrap();
/// let mut compressed = Vec::new();
/// let mut chunk = [0u8; 64];
///
/// let accepted = encoder.sink(b"an example of an example").unwrap();
/// assert_eq!(accepted, 24);
/// while encoder.finish() == Finish::More {
///     let (n, _) = encoder.poll(&mut chunk).unwrap();
///     compressed.extend_from_slice(&chunk[..n]);
/// }
/// assert!(!compressed.is_empty());
/// ```
#[derive(Debug)]
pub struct Encoder {
    window_bits: u8,
    lookahead_bits: u8,
    state: State,
    /// Backlog half then active half, each `2^window_bits` bytes.
    buffer: Vec<u8>,
    /// Valid bytes in the active half.
    input_size: usize,
    /// Offset into the active half of the next byte to scan.
    match_scan_index: usize,
    /// Distance of the match being emitted.
    match_pos: usize,
    /// Length of the match being emitted; 0 means a literal is pending.
    match_length: usize,
    /// Staged multi-bit field (distance or length), spooled in 8-bit slices.
    outgoing_bits: u16,
    outgoing_count: u8,
    bits: BitPacker,
    finishing: bool,
    has_literal: bool,
    on_final_literal: bool,
    backlog_partial: bool,
    backlog_filled: bool,
    /// Maps each buffer offset to the previous offset holding the same byte
    /// value, -1 if none. Rebuilt once per active-half fill.
    #[cfg(feature = "index")]
    search_index: Vec<i32>,
}

impl Encoder {
    /// Create an encoder.
    ///
    /// `window_bits` must be in `4..=15` and `lookahead_bits` in
    /// `3..=window_bits`. A decoder must be constructed with the same pair
    /// to read the output.
    pub fn new(window_bits: u8, lookahead_bits: u8) -> Result<Self> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
            return Err(Error::InvalidWindowBits(window_bits));
        }
        if lookahead_bits < MIN_LOOKAHEAD_BITS || lookahead_bits > window_bits {
            return Err(Error::InvalidLookaheadBits {
                lookahead_bits,
                window_bits,
            });
        }
        let buffer_size = 2 << window_bits;
        Ok(Self {
            window_bits,
            lookahead_bits,
            state: State::NotFull,
            buffer: vec![0; buffer_size],
            input_size: 0,
            match_scan_index: 0,
            match_pos: 0,
            match_length: 0,
            outgoing_bits: 0,
            outgoing_count: 0,
            bits: BitPacker::new(),
            finishing: false,
            has_literal: false,
            on_final_literal: false,
            backlog_partial: false,
            backlog_filled: false,
            #[cfg(feature = "index")]
            search_index: vec![-1; buffer_size],
        })
    }

    /// Clear all mutable state, keeping the configured sizes.
    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.state = State::NotFull;
        self.input_size = 0;
        self.match_scan_index = 0;
        self.match_pos = 0;
        self.match_length = 0;
        self.outgoing_bits = 0;
        self.outgoing_count = 0;
        self.bits.reset();
        self.finishing = false;
        self.has_literal = false;
        self.on_final_literal = false;
        self.backlog_partial = false;
        self.backlog_filled = false;
        #[cfg(feature = "index")]
        self.search_index.fill(-1);
    }

    /// Window exponent this encoder was built with.
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Lookahead exponent this encoder was built with.
    pub fn lookahead_bits(&self) -> u8 {
        self.lookahead_bits
    }

    /// Copy as much of `input` as fits into the active half.
    ///
    /// Returns the number of bytes accepted, which may be less than
    /// `input.len()`. Once the active half fills, `poll` must drain the
    /// encoder before more input is accepted.
    pub fn sink(&mut self, input: &[u8]) -> Result<usize> {
        if self.finishing {
            return Err(Error::SinkAfterFinish);
        }
        if self.state != State::NotFull {
            return Err(Error::SinkWhileProcessing);
        }
        let window = self.window_size();
        let write_offset = window + self.input_size;
        let room = window - self.input_size;
        let count = room.min(input.len());
        self.buffer[write_offset..write_offset + count].copy_from_slice(&input[..count]);
        self.input_size += count;
        if count == room {
            self.state = State::Filled;
        }
        Ok(count)
    }

    /// Run the state machine, writing compressed bytes into `out_buf`.
    ///
    /// Returns the bytes written and whether the encoder stopped because the
    /// buffer filled (`Poll::More`, call again) or because it needs more
    /// input or is done (`Poll::Empty`).
    pub fn poll(&mut self, out_buf: &mut [u8]) -> Result<(usize, Poll)> {
        if out_buf.is_empty() {
            return Err(Error::EmptyOutputBuffer);
        }
        let mut out = OutputSink::new(out_buf);
        loop {
            let in_state = self.state;
            self.state = match in_state {
                State::NotFull | State::Done => return Ok((out.written(), Poll::Empty)),
                State::Filled => {
                    self.build_index();
                    State::Search
                }
                State::Search => self.step_search(),
                State::YieldTagBit => self.yield_tag_bit(&mut out),
                State::YieldLiteral => self.yield_literal(&mut out),
                State::YieldBrIndex => self.yield_backref_index(&mut out),
                State::YieldBrLength => self.yield_backref_length(&mut out),
                State::SaveBacklog => self.save_backlog(),
                State::FlushBits => self.flush_bit_buffer(&mut out),
            };
            // A state that could not advance was blocked on output space.
            if self.state == in_state && out.is_full() {
                return Ok((out.written(), Poll::More));
            }
        }
    }

    /// Signal end of input.
    ///
    /// Remaining buffered bytes become eligible for processing; keep calling
    /// `poll` until this returns [`Finish::Done`]. Idempotent.
    pub fn finish(&mut self) -> Finish {
        self.finishing = true;
        if self.state == State::NotFull {
            self.state = State::Filled;
        }
        if self.state == State::Done {
            Finish::Done
        } else {
            Finish::More
        }
    }

    #[inline]
    fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    #[inline]
    fn lookahead_size(&self) -> usize {
        1 << self.lookahead_bits
    }

    fn step_search(&mut self) -> State {
        let msi = self.match_scan_index;
        let remaining = self.input_size - msi;
        let exhausted = if self.finishing {
            remaining == 0
        } else {
            // Keep a full lookahead behind the scan so no match is emitted
            // before it can be evaluated to its maximum length.
            remaining <= self.lookahead_size()
        };
        if exhausted {
            return State::SaveBacklog;
        }

        let window = self.window_size();
        let end = window + msi;
        let start = if self.backlog_filled {
            end + 1 - window
        } else if self.backlog_partial {
            // The first lookahead's worth of the backlog never held data.
            (end + 1 - window).max(self.lookahead_size())
        } else {
            window
        };
        let max_possible = self.lookahead_size().min(remaining);

        match self.find_longest_match(start, end, max_possible) {
            None => {
                self.match_scan_index += 1;
                self.has_literal = true;
                self.match_length = 0;
                State::YieldTagBit
            }
            Some((distance, length)) => {
                debug_assert!(distance >= 1 && distance < self.window_size());
                self.match_pos = distance;
                self.match_length = length;
                State::YieldTagBit
            }
        }
    }

    fn yield_tag_bit(&mut self, out: &mut OutputSink<'_>) -> State {
        if !out.can_take_byte() {
            return State::YieldTagBit;
        }
        if self.match_length == 0 {
            self.bits.push_bits(1, LITERAL_MARKER, out);
            State::YieldLiteral
        } else {
            self.bits.push_bits(1, BACKREF_MARKER, out);
            self.outgoing_bits = (self.match_pos - 1) as u16;
            self.outgoing_count = self.window_bits;
            State::YieldBrIndex
        }
    }

    fn yield_literal(&mut self, out: &mut OutputSink<'_>) -> State {
        if !out.can_take_byte() {
            return State::YieldLiteral;
        }
        let byte = self.buffer[self.window_size() + self.match_scan_index - 1];
        self.bits.push_bits(8, byte, out);
        self.has_literal = false;
        if self.on_final_literal {
            return State::FlushBits;
        }
        if self.match_length > 0 {
            State::YieldTagBit
        } else {
            State::Search
        }
    }

    fn yield_backref_index(&mut self, out: &mut OutputSink<'_>) -> State {
        if !out.can_take_byte() {
            return State::YieldBrIndex;
        }
        if self.push_outgoing_bits(out) > 0 {
            return State::YieldBrIndex;
        }
        self.outgoing_bits = (self.match_length - 1) as u16;
        self.outgoing_count = self.lookahead_bits;
        State::YieldBrLength
    }

    fn yield_backref_length(&mut self, out: &mut OutputSink<'_>) -> State {
        if !out.can_take_byte() {
            return State::YieldBrLength;
        }
        if self.push_outgoing_bits(out) > 0 {
            return State::YieldBrLength;
        }
        self.match_scan_index += self.match_length;
        self.match_length = 0;
        State::Search
    }

    fn save_backlog(&mut self) -> State {
        if self.finishing {
            if self.has_literal {
                self.on_final_literal = true;
                return State::YieldTagBit;
            }
            return State::FlushBits;
        }
        // Slide the newest window of data down so future matches can still
        // reach it; the unscanned tail moves with it.
        let msi = self.match_scan_index;
        self.buffer.copy_within(msi.., 0);
        if self.backlog_partial {
            self.backlog_filled = true;
        } else {
            self.backlog_partial = true;
        }
        self.match_scan_index = 0;
        self.input_size -= msi;
        State::NotFull
    }

    fn flush_bit_buffer(&mut self, out: &mut OutputSink<'_>) -> State {
        if !self.bits.has_partial_byte() {
            return State::Done;
        }
        if !out.can_take_byte() {
            return State::FlushBits;
        }
        let byte = self.bits.take_partial_byte();
        out.push_byte(byte);
        State::Done
    }

    /// Push the next slice (up to 8 bits) of the staged field. Returns the
    /// number of bits pushed; 0 means the field is fully emitted.
    fn push_outgoing_bits(&mut self, out: &mut OutputSink<'_>) -> u8 {
        let (count, chunk) = if self.outgoing_count > 8 {
            (8, (self.outgoing_bits >> (self.outgoing_count - 8)) as u8)
        } else {
            (self.outgoing_count, self.outgoing_bits as u8)
        };
        if count > 0 {
            self.bits.push_bits(count, chunk, out);
            self.outgoing_count -= count;
        }
        count
    }

    /// Longest match for `buffer[end..end + max_possible]` among positions
    /// in `start..end`, most recent candidate first; ties keep the earlier
    /// candidate. Returns `(distance, length)`.
    #[cfg(feature = "index")]
    fn find_longest_match(
        &self,
        start: usize,
        end: usize,
        max_possible: usize,
    ) -> Option<(usize, usize)> {
        if start == end {
            return None;
        }
        let buf = &self.buffer;
        let mut best_length = 0;
        let mut best_pos = None;

        let mut pos = self.search_index[end];
        while pos >= start as i32 {
            let candidate = pos as usize;
            let length = match_length(buf, candidate, end, max_possible);
            if length > BREAK_EVEN_POINT && length > best_length {
                best_length = length;
                best_pos = Some(candidate);
                if length == max_possible {
                    break;
                }
            }
            pos = self.search_index[candidate];
        }

        best_pos.map(|pos| (end - pos, best_length))
    }

    /// Brute-force variant of the search used when the chain index is
    /// compiled out. Identical results, linear scan.
    #[cfg(not(feature = "index"))]
    fn find_longest_match(
        &self,
        start: usize,
        end: usize,
        max_possible: usize,
    ) -> Option<(usize, usize)> {
        if start == end {
            return None;
        }
        let buf = &self.buffer;
        let mut best_length = 0;
        let mut best_pos = None;

        let mut pos = end - 1;
        loop {
            let length = match_length(buf, pos, end, max_possible);
            if length > BREAK_EVEN_POINT && length > best_length {
                best_length = length;
                best_pos = Some(pos);
                if length == max_possible {
                    break;
                }
            }
            if pos == start {
                break;
            }
            pos -= 1;
        }

        best_pos.map(|pos| (end - pos, best_length))
    }

    /// Rebuild the per-offset chain of previous same-byte occurrences over
    /// the backlog and the sunk portion of the active half.
    #[cfg(feature = "index")]
    fn build_index(&mut self) {
        let end = self.window_size() + self.input_size;
        let mut last = [-1i32; 256];
        self.search_index.fill(-1);
        for i in 0..end {
            let value = self.buffer[i] as usize;
            self.search_index[i] = last[value];
            last[value] = i as i32;
        }
    }

    #[cfg(not(feature = "index"))]
    fn build_index(&mut self) {}
}

/// Length of the common prefix of `buf[candidate..]` and `buf[needle..]`,
/// capped at `max_possible`.
#[inline]
fn match_length(buf: &[u8], candidate: usize, needle: usize, max_possible: usize) -> usize {
    let mut length = 0;
    while length < max_possible && buf[candidate + length] == buf[needle + length] {
        length += 1;
    }
    length
}
