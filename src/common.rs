//! Common types and constants shared by the MSZIP, Quantum and SZDD decoders
//!
//! This module defines the error type, the CAB compression type word and the
//! format constants used across the crate.

use thiserror::Error;

/// Signature at the start of every MSZIP block ("CK")
pub const MSZIP_SIGNATURE: [u8; 2] = *b"CK";

/// Maximum uncompressed size of one MSZIP block
pub const MSZIP_BLOCK_SIZE: usize = 0x8000;

/// Smallest Quantum window exponent (1 KB)
pub const QUANTUM_MIN_WINDOW_BITS: u8 = 10;

/// Largest Quantum window exponent (2 MB)
pub const QUANTUM_MAX_WINDOW_BITS: u8 = 21;

/// SZDD file magic
pub const SZDD_SIGNATURE: [u8; 8] = *b"SZDD\x88\xF0\x27\x33";

/// Size of the SZDD file header
pub const SZDD_HEADER_SIZE: usize = 14;

/// Compression method stored in a CAB folder's `typeCompress` word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// Blocks are stored without compression
    None,
    /// MSZIP (deflate with a "CK" block prefix)
    Mszip,
    /// Quantum with the given window exponent and compression level
    Quantum {
        /// Window size as a power of two (10..=21)
        window_bits: u8,
        /// Compression level the archiver used (informational)
        level: u8,
    },
    /// LZX; recognised but not decoded by this crate
    Lzx {
        /// Window size as a power of two
        window_bits: u8,
    },
}

impl CompressionType {
    /// Decode a CAB folder compression word
    pub fn from_folder_type(value: u16) -> Result<Self> {
        match value & 0x000F {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Mszip),
            2 => Ok(CompressionType::Quantum {
                window_bits: ((value >> 8) & 0x1F) as u8,
                level: ((value >> 4) & 0x0F) as u8,
            }),
            3 => Ok(CompressionType::Lzx {
                window_bits: ((value >> 8) & 0x1F) as u8,
            }),
            _ => Err(MsDecompError::UnsupportedCompression(value)),
        }
    }
}

/// Error type for decoder operations
#[derive(Debug, Error)]
pub enum MsDecompError {
    /// Block or file signature did not match
    #[error("Invalid signature")]
    InvalidSignature,

    /// Deflate block header carried the reserved block type
    #[error("Invalid block type: {0}")]
    InvalidBlockType(u8),

    /// Code lengths describe an over-subscribed or unusable prefix code
    #[error("Malformed Huffman code")]
    MalformedHuffmanCode,

    /// A decoded code did not map to a symbol
    #[error("Invalid symbol")]
    InvalidSymbol,

    /// Code length run or table size exceeded the declared count
    #[error("Code length run exceeds table size")]
    LengthOverrun,

    /// Stored block length failed its one's-complement check
    #[error("Stored block length mismatch: LEN={len:04X}, NLEN={nlen:04X}")]
    CorruptLength {
        /// LEN field
        len: u16,
        /// NLEN field
        nlen: u16,
    },

    /// Back-reference or output size violates the stream's invariants
    #[error("Corrupt data: {0}")]
    CorruptData(&'static str),

    /// Input ended where the decoder still needed bits
    #[error("Unexpected end of input")]
    TruncatedInput,

    /// Quantum window exponent outside 10..=21
    #[error("Unsupported window size: 2^{0} (expected 2^10 to 2^21)")]
    UnsupportedWindowSize(u8),

    /// SZDD compression type other than 'A'
    #[error("Invalid compression type: {0:#04X}")]
    InvalidCompressionType(u8),

    /// CAB folder compression method this crate does not decode
    #[error("Unsupported compression method: {0:#06X}")]
    UnsupportedCompression(u16),

    /// Declared length is larger than the buffer passed in
    #[error("Buffer too small")]
    BufferTooSmall,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, MsDecompError>;

/// Borrow `buffer[..len]`, failing if `len` exceeds the buffer
pub(crate) fn checked_prefix(buffer: &[u8], len: usize) -> Result<&[u8]> {
    buffer.get(..len).ok_or(MsDecompError::BufferTooSmall)
}

/// Mutable counterpart of [`checked_prefix`]
pub(crate) fn checked_prefix_mut(buffer: &mut [u8], len: usize) -> Result<&mut [u8]> {
    buffer.get_mut(..len).ok_or(MsDecompError::BufferTooSmall)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_type_quantum() {
        // Quantum, level 4, 2^21 window: 0x1542
        let ctype = CompressionType::from_folder_type(0x1542).unwrap();
        assert_eq!(
            ctype,
            CompressionType::Quantum {
                window_bits: 21,
                level: 4
            }
        );
    }

    #[test]
    fn test_folder_type_simple() {
        assert_eq!(
            CompressionType::from_folder_type(0).unwrap(),
            CompressionType::None
        );
        assert_eq!(
            CompressionType::from_folder_type(1).unwrap(),
            CompressionType::Mszip
        );
        assert_eq!(
            CompressionType::from_folder_type(0x1003).unwrap(),
            CompressionType::Lzx { window_bits: 16 }
        );
        assert!(matches!(
            CompressionType::from_folder_type(0x000F),
            Err(MsDecompError::UnsupportedCompression(0x000F))
        ));
    }

    #[test]
    fn test_constants() {
        assert_eq!(MSZIP_SIGNATURE, [0x43, 0x4B]);
        assert_eq!(MSZIP_BLOCK_SIZE, 32768);
        assert_eq!(SZDD_SIGNATURE.len(), 8);
        assert_eq!(SZDD_HEADER_SIZE, 14);
    }

    #[test]
    fn test_checked_prefix() {
        let data = [1u8, 2, 3];
        assert_eq!(checked_prefix(&data, 2).unwrap(), &[1, 2]);
        assert!(matches!(
            checked_prefix(&data, 4),
            Err(MsDecompError::BufferTooSmall)
        ));
    }
}
