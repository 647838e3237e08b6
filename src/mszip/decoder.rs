//! Deflate block decoding for MSZIP
//!
//! One call decodes the deflate blocks that make up a single CAB data block,
//! stopping after the block flagged final.

use super::state::MszipState;
use crate::bit_reader::LsbBitReader;
use crate::common::{checked_prefix, checked_prefix_mut, MSZIP_BLOCK_SIZE, MSZIP_SIGNATURE};
use crate::huffman::{HuffmanTable, Leaf, SymbolMap};
use crate::tables::{
    CODE_LENGTH_ORDER, DIST_BASE, DIST_EXTRA, FIXED_DISTANCE_LENGTHS, FIXED_LITERAL_LENGTHS,
    LENGTH_BASE, LENGTH_EXTRA,
};
use crate::window::SlidingWindow;
use crate::{MsDecompError, Result};

/// Largest HLIT-derived literal/length code count
pub const MAX_LITERAL_CODES: usize = 288;

/// Largest HDIST-derived distance code count
pub const MAX_DISTANCE_CODES: usize = 32;

const END_OF_BLOCK: u16 = 256;

const LITERAL_MAP: SymbolMap<'static> = SymbolMap {
    bias: 257,
    base: &LENGTH_BASE,
    extra: &LENGTH_EXTRA,
};

const DISTANCE_MAP: SymbolMap<'static> = SymbolMap {
    bias: 0,
    base: &DIST_BASE,
    extra: &DIST_EXTRA,
};

/// Reject dynamic block code counts larger than the alphabets
pub fn validate_counts(literal_codes: usize, distance_codes: usize) -> Result<()> {
    if literal_codes > MAX_LITERAL_CODES || distance_codes > MAX_DISTANCE_CODES {
        return Err(MsDecompError::LengthOverrun);
    }
    Ok(())
}

impl MszipState {
    /// Decode one MSZIP block of exactly `output_len` bytes from
    /// `input[..input_len]` into `output[..output_len]`
    pub fn decompress(
        &mut self,
        input: &[u8],
        input_len: usize,
        output: &mut [u8],
        output_len: usize,
    ) -> Result<()> {
        let input = checked_prefix(input, input_len)?;
        let output = checked_prefix_mut(output, output_len)?;
        if output_len > MSZIP_BLOCK_SIZE {
            return Err(MsDecompError::CorruptData(
                "MSZIP block larger than 32768 bytes",
            ));
        }
        if input.get(..2) != Some(&MSZIP_SIGNATURE[..]) {
            return Err(MsDecompError::InvalidSignature);
        }

        self.reset();
        let mut bits = LsbBitReader::new(&input[2..]);

        loop {
            let last = bits.read_bits(1) == 1;
            let block_type = bits.read_bits(2) as u8;
            log::trace!(
                "MSZIP deflate block: type {}, final {}, {} bytes so far",
                block_type,
                last,
                self.window.written()
            );

            match block_type {
                0 => stored_block(&mut bits, &mut self.window, output_len)?,
                1 => {
                    if self.fixed_tables.is_none() {
                        self.fixed_tables = Some(fixed_tables()?);
                    }
                    if let Some((literals, distances)) = &self.fixed_tables {
                        inflate_codes(
                            &mut bits,
                            &mut self.window,
                            literals,
                            distances,
                            output_len,
                        )?;
                    }
                }
                2 => {
                    let (literals, distances) = dynamic_tables(&mut bits)?;
                    inflate_codes(&mut bits, &mut self.window, &literals, &distances, output_len)?;
                }
                _ => return Err(MsDecompError::InvalidBlockType(block_type)),
            }

            if last {
                break;
            }
        }

        if self.window.written() != output_len as u64 {
            return Err(MsDecompError::CorruptData(
                "MSZIP block length does not match the expected size",
            ));
        }
        output.copy_from_slice(self.window.recent(output_len)?);

        self.bytes_consumed = 2 + bits.bytes_consumed();
        self.blocks_decoded += 1;
        Ok(())
    }
}

/// Uncompressed deflate block: LEN, NLEN, then LEN raw bytes
fn stored_block(
    bits: &mut LsbBitReader<'_>,
    window: &mut SlidingWindow,
    output_len: usize,
) -> Result<()> {
    bits.align_to_byte();
    let len = bits.read_bits(16) as u16;
    let nlen = bits.read_bits(16) as u16;
    if nlen != !len {
        return Err(MsDecompError::CorruptLength { len, nlen });
    }
    if window.written() + len as u64 > output_len as u64 {
        return Err(MsDecompError::CorruptData(
            "stored block overruns the output",
        ));
    }
    for _ in 0..len {
        window.push(bits.read_bits(8) as u8);
    }
    Ok(())
}

fn fixed_tables() -> Result<(HuffmanTable, HuffmanTable)> {
    let literals = HuffmanTable::build(&FIXED_LITERAL_LENGTHS, LITERAL_MAP, 7)?;
    let distances = HuffmanTable::build(&FIXED_DISTANCE_LENGTHS, DISTANCE_MAP, 5)?;
    Ok((literals, distances))
}

/// Read a dynamic block header and build its literal/length and distance tables
fn dynamic_tables(bits: &mut LsbBitReader<'_>) -> Result<(HuffmanTable, HuffmanTable)> {
    let literal_codes = bits.read_bits(5) as usize + 257;
    let distance_codes = bits.read_bits(5) as usize + 1;
    let length_codes = bits.read_bits(4) as usize + 4;
    validate_counts(literal_codes, distance_codes)?;

    let mut code_length_lengths = [0u8; 19];
    for &symbol in &CODE_LENGTH_ORDER[..length_codes] {
        code_length_lengths[symbol] = bits.read_bits(3) as u8;
    }
    let code_lengths = HuffmanTable::build(&code_length_lengths, SymbolMap::IDENTITY, 7)?;

    let total = literal_codes + distance_codes;
    let mut lengths = [0u8; MAX_LITERAL_CODES + MAX_DISTANCE_CODES];
    let mut index = 0;
    let mut previous = 0u8;
    while index < total {
        let symbol = match code_lengths.decode(bits)? {
            Leaf::Symbol(symbol) => symbol,
            Leaf::Range { .. } => return Err(MsDecompError::InvalidSymbol),
        };
        let (value, repeat) = match symbol {
            0..=15 => {
                previous = symbol as u8;
                lengths[index] = previous;
                index += 1;
                continue;
            }
            16 => (previous, 3 + bits.read_bits(2) as usize),
            17 => {
                previous = 0;
                (0, 3 + bits.read_bits(3) as usize)
            }
            18 => {
                previous = 0;
                (0, 11 + bits.read_bits(7) as usize)
            }
            _ => return Err(MsDecompError::InvalidSymbol),
        };
        if index + repeat > total {
            return Err(MsDecompError::LengthOverrun);
        }
        lengths[index..index + repeat].fill(value);
        index += repeat;
    }

    let literals = HuffmanTable::build(&lengths[..literal_codes], LITERAL_MAP, 9)?;
    let distances = HuffmanTable::build(&lengths[literal_codes..total], DISTANCE_MAP, 6)?;
    Ok((literals, distances))
}

/// Decode literal/length and distance symbols until end of block
fn inflate_codes(
    bits: &mut LsbBitReader<'_>,
    window: &mut SlidingWindow,
    literals: &HuffmanTable,
    distances: &HuffmanTable,
    output_len: usize,
) -> Result<()> {
    let limit = output_len as u64;
    loop {
        match literals.decode(bits)? {
            Leaf::Symbol(END_OF_BLOCK) => return Ok(()),
            Leaf::Symbol(literal) => {
                if window.written() >= limit {
                    return Err(MsDecompError::CorruptData("literal overruns the output"));
                }
                window.push(literal as u8);
            }
            Leaf::Range { base, extra } => {
                let length = base as usize + bits.read_bits(extra as u32) as usize;
                let distance = match distances.decode(bits)? {
                    Leaf::Range { base, extra } => {
                        base as usize + bits.read_bits(extra as u32) as usize
                    }
                    Leaf::Symbol(_) => return Err(MsDecompError::InvalidSymbol),
                };
                if window.written() + length as u64 > limit {
                    return Err(MsDecompError::CorruptData("match overruns the output"));
                }
                window.copy_match(distance, length)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8], output_len: usize) -> Result<(Vec<u8>, usize)> {
        let mut state = MszipState::new();
        let mut output = vec![0u8; output_len];
        state.decompress(input, input.len(), &mut output, output_len)?;
        Ok((output, state.bytes_consumed()))
    }

    #[test]
    fn test_stored_block() {
        let input = hex::decode("434b010400fbffdeadbeef").unwrap();
        let (output, consumed) = decode(&input, 4).unwrap();
        assert_eq!(output, [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(consumed, 11);
    }

    #[test]
    fn test_empty_stored_block() {
        let input = [0x43, 0x4B, 0x01, 0x00, 0x00, 0xFF, 0xFF, 0x99, 0x99];
        let (output, consumed) = decode(&input, 0).unwrap();
        assert!(output.is_empty());
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_bad_signature() {
        let input = [0x43, 0x4C, 0x01, 0x00, 0x00, 0xFF, 0xFF];
        assert!(matches!(
            decode(&input, 0),
            Err(MsDecompError::InvalidSignature)
        ));
        assert!(matches!(decode(&[0x43], 0), Err(MsDecompError::InvalidSignature)));
    }

    #[test]
    fn test_reserved_block_type() {
        // final=1, type=3
        let input = [0x43, 0x4B, 0x07];
        assert!(matches!(
            decode(&input, 0),
            Err(MsDecompError::InvalidBlockType(3))
        ));
    }

    #[test]
    fn test_corrupt_stored_length() {
        let input = [0x43, 0x4B, 0x01, 0x04, 0x00, 0xFF, 0xFF, 0, 0, 0, 0];
        assert!(matches!(
            decode(&input, 4),
            Err(MsDecompError::CorruptLength {
                len: 4,
                nlen: 0xFFFF
            })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let input = hex::decode("434b010400fbffdeadbeef").unwrap();
        assert!(matches!(decode(&input, 5), Err(MsDecompError::CorruptData(_))));
        assert!(matches!(decode(&input, 3), Err(MsDecompError::CorruptData(_))));
    }

    #[test]
    fn test_fixed_block_literals() {
        // Fixed block: 'a' 'b' end-of-block. Codes 8 bits 0x91, 0x92, then 7 zero bits.
        // Bits LSB-first: 1 (final), 1 0 (type 1), then codes MSB-first.
        let mut acc: u64 = 0;
        let mut n = 0;
        let mut push = |value: u32, count: u32, msb_first: bool| {
            for i in 0..count {
                let bit = if msb_first {
                    (value >> (count - 1 - i)) & 1
                } else {
                    (value >> i) & 1
                };
                acc |= (bit as u64) << n;
                n += 1;
            }
        };
        push(1, 1, false);
        push(1, 2, false);
        push(0x30 + b'a' as u32, 8, true);
        push(0x30 + b'b' as u32, 8, true);
        push(0, 7, true);
        let mut input = vec![0x43, 0x4B];
        input.extend_from_slice(&acc.to_le_bytes()[..4]);

        let (output, _) = decode(&input, 2).unwrap();
        assert_eq!(output, b"ab");
    }

    #[test]
    fn test_output_size_limit() {
        let input = [0x43, 0x4B, 0x01, 0x00, 0x00, 0xFF, 0xFF];
        let mut state = MszipState::new();
        let mut output = vec![0u8; MSZIP_BLOCK_SIZE + 1];
        assert!(matches!(
            state.decompress(&input, input.len(), &mut output, MSZIP_BLOCK_SIZE + 1),
            Err(MsDecompError::CorruptData(_))
        ));
    }

    #[test]
    fn test_buffer_too_small() {
        let input = [0x43, 0x4B, 0x01, 0x00, 0x00, 0xFF, 0xFF];
        let mut state = MszipState::new();
        let mut output = [0u8; 4];
        assert!(matches!(
            state.decompress(&input, 8, &mut output, 0),
            Err(MsDecompError::BufferTooSmall)
        ));
        assert!(matches!(
            state.decompress(&input, 7, &mut output, 5),
            Err(MsDecompError::BufferTooSmall)
        ));
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_counts(288, 32).is_ok());
        assert!(matches!(
            validate_counts(289, 1),
            Err(MsDecompError::LengthOverrun)
        ));
        assert!(matches!(
            validate_counts(257, 33),
            Err(MsDecompError::LengthOverrun)
        ));
    }
}
