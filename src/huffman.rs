//! Canonical Huffman decode tables for MSZIP
//!
//! Tables are two-level: a root table indexed by the first `root_bits` bits of
//! the stream, and subtables for codes longer than the root. All slots live in
//! one arena; a root slot links to its subtable by arena offset.

use crate::bit_reader::LsbBitReader;
use crate::{MsDecompError, Result};

/// Longest code length deflate allows
pub const MAX_CODE_LENGTH: usize = 15;

/// What a table slot resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// No code maps to this bit pattern
    Invalid,
    /// Symbol below the table's bias, returned as-is
    Symbol(u16),
    /// Symbol at or above the bias: base value plus `extra` raw bits
    Range {
        /// Base length or distance
        base: u16,
        /// Number of extra bits to read after the code
        extra: u8,
    },
    /// Subtable of `bits` index bits starting at arena `offset`
    Link {
        /// Arena index of the subtable's first slot
        offset: u32,
        /// Index width of the subtable
        bits: u8,
    },
}

/// One lookup slot: bits consumed at this level and the entry reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Bits to consume when this slot is taken
    pub bits: u8,
    /// Decoded value or subtable reference
    pub entry: Entry,
}

impl Slot {
    const INVALID: Slot = Slot {
        bits: 0,
        entry: Entry::Invalid,
    };
}

/// A decoded leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    /// Plain symbol (literal, end of block, code length code)
    Symbol(u16),
    /// Length or distance base with its extra bit count
    Range {
        /// Base value
        base: u16,
        /// Extra bits still to read
        extra: u8,
    },
}

/// Maps symbols at or above a bias through base/extra tables
#[derive(Debug, Clone, Copy)]
pub struct SymbolMap<'a> {
    /// First symbol that maps through `base`/`extra`
    pub bias: usize,
    /// Base values for symbols `bias..`
    pub base: &'a [u16],
    /// Extra bit counts for symbols `bias..`
    pub extra: &'a [u8],
}

impl SymbolMap<'static> {
    /// Every symbol is returned verbatim
    pub const IDENTITY: SymbolMap<'static> = SymbolMap {
        bias: usize::MAX,
        base: &[],
        extra: &[],
    };
}

impl SymbolMap<'_> {
    fn entry_for(&self, symbol: usize) -> Entry {
        if symbol < self.bias {
            return Entry::Symbol(symbol as u16);
        }
        let index = symbol - self.bias;
        match (self.base.get(index), self.extra.get(index)) {
            (Some(&base), Some(&extra)) => Entry::Range { base, extra },
            _ => Entry::Invalid,
        }
    }
}

/// Multi-level canonical Huffman decode table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    root_bits: u8,
    max_length: u8,
    slots: Vec<Slot>,
}

impl HuffmanTable {
    /// Build a table from per-symbol code lengths.
    ///
    /// All-zero lengths give an empty table that decodes nothing. An
    /// over-subscribed set fails, and so does an incomplete one unless it is a
    /// single one-bit code.
    pub fn build(lengths: &[u8], map: SymbolMap<'_>, root_bits: u8) -> Result<Self> {
        let mut count = [0u16; MAX_CODE_LENGTH + 1];
        for &length in lengths {
            if length as usize > MAX_CODE_LENGTH {
                return Err(MsDecompError::MalformedHuffmanCode);
            }
            count[length as usize] += 1;
        }

        if count[0] as usize == lengths.len() {
            log::debug!("Huffman table over {} symbols has no codes", lengths.len());
            return Ok(Self {
                root_bits: 0,
                max_length: 0,
                slots: Vec::new(),
            });
        }

        let max_length = (1..=MAX_CODE_LENGTH).rev().find(|&l| count[l] != 0).unwrap_or(1);
        let min_length = (1..=MAX_CODE_LENGTH).find(|&l| count[l] != 0).unwrap_or(1);
        let root = (root_bits as usize).clamp(min_length, max_length);

        let mut left: i32 = 1;
        for length in 1..=MAX_CODE_LENGTH {
            left <<= 1;
            left -= count[length] as i32;
            if left < 0 {
                return Err(MsDecompError::MalformedHuffmanCode);
            }
        }
        if left > 0 && max_length != 1 {
            return Err(MsDecompError::MalformedHuffmanCode);
        }

        // First canonical code of each length
        let mut next_code = [0u32; MAX_CODE_LENGTH + 2];
        let mut code = 0u32;
        for length in 1..=MAX_CODE_LENGTH {
            code = (code + count[length - 1] as u32 * (length > 1) as u32) << 1;
            next_code[length] = code;
        }

        // Symbols in canonical order: by length, then by symbol value
        let mut sorted: Vec<usize> = Vec::with_capacity(lengths.len());
        for length in 1..=MAX_CODE_LENGTH {
            sorted.extend(
                lengths
                    .iter()
                    .enumerate()
                    .filter(|&(_, &l)| l as usize == length)
                    .map(|(symbol, _)| symbol),
            );
        }

        let root_size = 1usize << root;
        let root_mask = (root_size - 1) as u32;
        let mut slots = vec![Slot::INVALID; root_size];
        let mut remaining = count;
        let mut current_prefix: Option<u32> = None;
        let mut sub_offset = 0usize;
        let mut sub_bits = 0usize;

        for symbol in sorted {
            let length = lengths[symbol] as usize;
            let code = next_code[length];
            next_code[length] += 1;
            let reversed = reverse_bits(code, length as u32);
            let entry = map.entry_for(symbol);

            if length <= root {
                let slot = Slot {
                    bits: length as u8,
                    entry,
                };
                let mut index = reversed as usize;
                while index < root_size {
                    slots[index] = slot;
                    index += 1 << length;
                }
            } else {
                let prefix = reversed & root_mask;
                if current_prefix != Some(prefix) {
                    // Size the subtable to hold exactly the codes sharing this prefix
                    let mut bits = length - root;
                    let mut room: i32 = 1 << bits;
                    while bits + root < max_length {
                        room -= remaining[bits + root] as i32;
                        if room <= 0 {
                            break;
                        }
                        bits += 1;
                        room <<= 1;
                    }
                    sub_bits = bits;
                    sub_offset = slots.len();
                    slots.resize(sub_offset + (1 << sub_bits), Slot::INVALID);
                    slots[prefix as usize] = Slot {
                        bits: root as u8,
                        entry: Entry::Link {
                            offset: sub_offset as u32,
                            bits: sub_bits as u8,
                        },
                    };
                    current_prefix = Some(prefix);
                }

                let drop = length - root;
                let slot = Slot {
                    bits: drop as u8,
                    entry,
                };
                let mut index = (reversed >> root) as usize;
                while index < 1 << sub_bits {
                    slots[sub_offset + index] = slot;
                    index += 1 << drop;
                }
            }
            remaining[length] -= 1;
        }

        log::debug!(
            "Built Huffman table: {} symbols, root {} bits, max length {}, {} slots",
            lengths.len(),
            root,
            max_length,
            slots.len()
        );

        Ok(Self {
            root_bits: root as u8,
            max_length: max_length as u8,
            slots,
        })
    }

    /// True if the code set had no codes at all
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index width of the root table
    pub fn root_bits(&self) -> u8 {
        self.root_bits
    }

    /// Longest code in the table
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Raw slot access, `None` past the arena
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    /// Decode one leaf, following subtable links
    pub fn decode(&self, bits: &mut LsbBitReader<'_>) -> Result<Leaf> {
        if self.slots.is_empty() {
            return Err(MsDecompError::InvalidSymbol);
        }
        let mut base = 0usize;
        let mut width = self.root_bits as u32;
        loop {
            let index = base + bits.peek_bits(width) as usize;
            let slot = self.slot(index).ok_or(MsDecompError::InvalidSymbol)?;
            match slot.entry {
                Entry::Invalid => return Err(MsDecompError::InvalidSymbol),
                Entry::Link { offset, bits: sub } => {
                    bits.consume(slot.bits as u32);
                    base = offset as usize;
                    width = sub as u32;
                }
                Entry::Symbol(symbol) => {
                    bits.consume(slot.bits as u32);
                    return Ok(Leaf::Symbol(symbol));
                }
                Entry::Range { base, extra } => {
                    bits.consume(slot.bits as u32);
                    return Ok(Leaf::Range { base, extra });
                }
            }
        }
    }
}

/// Reverse the low `length` bits of `code`; deflate sends codes MSB-first
/// inside an LSB-first bit stream
fn reverse_bits(code: u32, length: u32) -> u32 {
    code.reverse_bits() >> (32 - length)
}
