//! Bit readers over in-memory compressed buffers
//!
//! MSZIP consumes bits LSB-first like deflate; Quantum consumes them MSB-first
//! through a left-aligned peek window. The two orderings are kept in separate
//! types because nothing else about them is shared.

use crate::{MsDecompError, Result};

/// LSB-first bit reader used by MSZIP.
///
/// Once the input is exhausted the reader keeps serving zero bits. Slightly
/// short final CAB blocks decode this way with historical decoders, so the
/// leniency is preserved; [`LsbBitReader::overrun`] reports how many padding
/// bytes were synthesised.
#[derive(Debug)]
pub struct LsbBitReader<'a> {
    input: &'a [u8],
    position: usize,
    accumulator: u32,
    bit_count: u32,
    overrun: usize,
}

impl<'a> LsbBitReader<'a> {
    /// Create a reader positioned at the first byte of `input`
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            accumulator: 0,
            bit_count: 0,
            overrun: 0,
        }
    }

    fn ensure(&mut self, n_bits: u32) {
        debug_assert!(n_bits <= 16);
        while self.bit_count < n_bits {
            let byte = match self.input.get(self.position) {
                Some(&byte) => {
                    self.position += 1;
                    byte
                }
                None => {
                    if self.overrun == 0 {
                        log::warn!(
                            "MSZIP input exhausted after {} bytes, zero-filling",
                            self.input.len()
                        );
                    }
                    self.overrun += 1;
                    0
                }
            };
            self.accumulator |= (byte as u32) << self.bit_count;
            self.bit_count += 8;
        }
    }

    /// Return the next `n_bits` (at most 16) without consuming them
    pub fn peek_bits(&mut self, n_bits: u32) -> u32 {
        if n_bits == 0 {
            return 0;
        }
        self.ensure(n_bits);
        self.accumulator & ((1u32 << n_bits) - 1)
    }

    /// Drop `n_bits` that were previously made available by a peek
    pub fn consume(&mut self, n_bits: u32) {
        debug_assert!(n_bits <= self.bit_count);
        self.accumulator >>= n_bits;
        self.bit_count -= n_bits;
    }

    /// Read `n_bits` (at most 16)
    pub fn read_bits(&mut self, n_bits: u32) -> u32 {
        let value = self.peek_bits(n_bits);
        self.consume(n_bits);
        value
    }

    /// Discard the rest of the current byte
    pub fn align_to_byte(&mut self) {
        let partial = self.bit_count & 7;
        self.consume(partial);
    }

    /// Bytes of input consumed so far, counting a partly read byte as consumed
    pub fn bytes_consumed(&self) -> usize {
        let fetched = self.position + self.overrun;
        let unread = (self.bit_count / 8) as usize;
        (fetched - unread).min(self.input.len())
    }

    /// Number of zero bytes supplied past the end of the input
    pub fn overrun(&self) -> usize {
        self.overrun
    }
}

/// MSB-first bit reader used by the Quantum range coder.
///
/// Bits live left-aligned in a 32-bit window. A bounded number of zero bytes
/// may be read past the end of the input, because the coder's 16-bit code
/// register always runs ahead of the last meaningful bit; beyond that slack the
/// reader fails with [`MsDecompError::TruncatedInput`].
///
/// The libmspack and fdi.c decoders zero-fill without limit. Bounding the
/// padding is stricter than they are; a well-formed frame only ever needs a
/// few bytes of it.
#[derive(Debug)]
pub struct MsbBitReader<'a> {
    input: &'a [u8],
    position: usize,
    window: u32,
    bit_count: u32,
    overrun: usize,
    slack: usize,
}

impl<'a> MsbBitReader<'a> {
    /// Create a reader over `input` that tolerates `slack` padding bytes
    pub fn new(input: &'a [u8], slack: usize) -> Self {
        Self {
            input,
            position: 0,
            window: 0,
            bit_count: 0,
            overrun: 0,
            slack,
        }
    }

    fn ensure(&mut self, n_bits: u32) -> Result<()> {
        debug_assert!(n_bits <= 16);
        while self.bit_count < n_bits {
            let byte = match self.input.get(self.position) {
                Some(&byte) => {
                    self.position += 1;
                    byte
                }
                None => {
                    if self.overrun >= self.slack {
                        return Err(MsDecompError::TruncatedInput);
                    }
                    self.overrun += 1;
                    0
                }
            };
            self.window |= (byte as u32) << (24 - self.bit_count);
            self.bit_count += 8;
        }
        Ok(())
    }

    /// Read `n_bits` (at most 16), most significant bit first
    pub fn read_bits(&mut self, n_bits: u32) -> Result<u32> {
        if n_bits == 0 {
            return Ok(0);
        }
        self.ensure(n_bits)?;
        let value = self.window >> (32 - n_bits);
        self.window <<= n_bits;
        self.bit_count -= n_bits;
        Ok(value)
    }

    /// Read up to 32 bits as a sequence of 16-bit sub-reads
    pub fn read_many_bits(&mut self, mut n_bits: u32) -> Result<u32> {
        debug_assert!(n_bits <= 32);
        let mut value = 0u32;
        while n_bits > 0 {
            let run = n_bits.min(16);
            value = (value << run) | self.read_bits(run)?;
            n_bits -= run;
        }
        Ok(value)
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> Result<u16> {
        Ok(self.read_bits(1)? as u16)
    }

    /// Number of zero bytes supplied past the end of the input
    pub fn overrun(&self) -> usize {
        self.overrun
    }
}
