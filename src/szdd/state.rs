//! LZ77 state for the SZDD (LZEXPAND) algorithm

use crate::common::{checked_prefix, checked_prefix_mut};
use crate::{MsDecompError, Result};

/// Size of the LZ ring buffer
pub const TABLE_SIZE: usize = 4096;

/// Ring buffer write cursor at the start of a stream
pub const TABLE_START: usize = 0xFF0;

/// Minimum reference length
pub const MIN_MATCH: usize = 3;

/// Maximum reference length
pub const MAX_MATCH: usize = MIN_MATCH + 15;

const TABLE_MASK: usize = TABLE_SIZE - 1;

/// Decoder state for one SZDD payload.
///
/// The state remembers how far into the compressed payload it has read, so
/// every call is given the same payload buffer and continues where the last
/// call stopped, including in the middle of a back-reference.
#[derive(Debug, Clone)]
pub struct LzState {
    table: Box<[u8; TABLE_SIZE]>,
    cursor: usize,
    flags: u8,
    flags_left: u8,
    run_source: usize,
    run_remaining: usize,
    input_pos: usize,
    output_pos: u64,
}

impl LzState {
    /// Create state for the start of a payload
    pub fn new() -> Self {
        Self {
            table: Box::new([b' '; TABLE_SIZE]),
            cursor: TABLE_START,
            flags: 0,
            flags_left: 0,
            run_source: 0,
            run_remaining: 0,
            input_pos: 0,
            output_pos: 0,
        }
    }

    /// Rewind to the start of the payload
    pub fn reset(&mut self) {
        log::debug!("SZDD state reset at output offset {}", self.output_pos);
        self.table.fill(b' ');
        self.cursor = TABLE_START;
        self.flags = 0;
        self.flags_left = 0;
        self.run_source = 0;
        self.run_remaining = 0;
        self.input_pos = 0;
        self.output_pos = 0;
    }

    /// Payload bytes consumed so far
    pub fn input_pos(&self) -> usize {
        self.input_pos
    }

    /// Bytes produced so far
    pub fn output_pos(&self) -> u64 {
        self.output_pos
    }

    fn next_byte(&mut self, input: &[u8]) -> Result<u8> {
        let byte = *input
            .get(self.input_pos)
            .ok_or(MsDecompError::TruncatedInput)?;
        self.input_pos += 1;
        Ok(byte)
    }

    #[inline]
    fn emit(&mut self, byte: u8) {
        self.table[self.cursor] = byte;
        self.cursor = (self.cursor + 1) & TABLE_MASK;
    }

    /// Produce the next `output_len` bytes of the payload `input[..input_len]`
    pub fn decompress(
        &mut self,
        input: &[u8],
        input_len: usize,
        output: &mut [u8],
        output_len: usize,
    ) -> Result<()> {
        let input = checked_prefix(input, input_len)?;
        let output = checked_prefix_mut(output, output_len)?;

        for slot in output.iter_mut() {
            if self.run_remaining == 0 {
                if self.flags_left == 0 {
                    self.flags = self.next_byte(input)?;
                    self.flags_left = 8;
                }
                let literal = self.flags & 1 != 0;
                self.flags >>= 1;
                self.flags_left -= 1;

                if !literal {
                    let low = self.next_byte(input)? as usize;
                    let high = self.next_byte(input)? as usize;
                    self.run_source = low | ((high & 0xF0) << 4);
                    self.run_remaining = (high & 0x0F) + MIN_MATCH;
                }
            }

            let byte = if self.run_remaining > 0 {
                let byte = self.table[self.run_source];
                self.run_source = (self.run_source + 1) & TABLE_MASK;
                self.run_remaining -= 1;
                byte
            } else {
                self.next_byte(input)?
            };
            self.emit(byte);
            *slot = byte;
        }

        self.output_pos += output_len as u64;
        Ok(())
    }
}

impl Default for LzState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(payload: &[u8], len: usize) -> Result<Vec<u8>> {
        let mut state = LzState::new();
        let mut output = vec![0u8; len];
        state.decompress(payload, payload.len(), &mut output, len)?;
        Ok(output)
    }

    #[test]
    fn test_literals() {
        let payload = [0xFF, b'H', b'e', b'l', b'l', b'o', b'!', b'!', b'!'];
        assert_eq!(expand(&payload, 8).unwrap(), b"Hello!!!");
    }

    #[test]
    fn test_overlapping_reference() {
        // literal 'a' at 0xFF0, then a reference to 0xFF0 of length 6
        let payload = [0b0000_0001, b'a', 0xF0, 0xF3];
        assert_eq!(expand(&payload, 7).unwrap(), b"aaaaaaa");
    }

    #[test]
    fn test_reference_into_prefilled_table() {
        // reference to offset 0 before anything was written reads spaces
        let payload = [0b0000_0000, 0x00, 0x00];
        assert_eq!(expand(&payload, 3).unwrap(), b"   ");
    }

    #[test]
    fn test_run_spans_calls() {
        let payload = [0b0000_0001, b'x', 0xF0, 0xFF];
        let mut state = LzState::new();
        let mut first = [0u8; 5];
        state.decompress(&payload, payload.len(), &mut first, 5).unwrap();
        let mut second = [0u8; 14];
        state.decompress(&payload, payload.len(), &mut second, 14).unwrap();
        assert_eq!(&first, b"xxxxx");
        assert_eq!(&second, &[b'x'; 14]);
        assert_eq!(state.output_pos(), 19);
        assert_eq!(state.input_pos(), 4);
    }

    #[test]
    fn test_truncated() {
        let payload = [0xFF, b'a'];
        assert!(matches!(
            expand(&payload, 2),
            Err(MsDecompError::TruncatedInput)
        ));
        let payload = [0x00, 0x10];
        assert!(matches!(
            expand(&payload, 1),
            Err(MsDecompError::TruncatedInput)
        ));
    }

    #[test]
    fn test_reset_replays() {
        let payload = [0xFF, b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h'];
        let mut state = LzState::new();
        let mut output = [0u8; 4];
        state.decompress(&payload, payload.len(), &mut output, 4).unwrap();
        state.reset();
        state.decompress(&payload, payload.len(), &mut output, 4).unwrap();
        assert_eq!(&output, b"abcd");
        assert_eq!(state.input_pos(), 5);
    }
}
