//! msdecomp - Decoders for Microsoft's cabinet and installer compression formats
//!
//! This crate provides pure Rust decoders for the compression methods found in
//! Microsoft CAB archives and old DOS/Windows installers:
//!
//! - **MSZIP** - deflate blocks behind a `"CK"` signature, one per CAB block
//! - **Quantum** - an adaptive range coder with an LZ77 window of 1 KB to 2 MB
//! - **SZDD** - the LZ77 format written by `COMPRESS.EXE` and read by `EXPAND.EXE`
//!
//! Each decoder keeps its state in a caller-owned value and exposes the same
//! entry point: decode exactly `output_len` bytes from an input buffer. The
//! decoders never perform I/O; [`SzddReader`] adds a `Read + Seek` interface
//! on top of SZDD files.
//!
//! # Example - MSZIP block
//!
//! ```
//! use msdecomp::mszip::MszipState;
//!
//! // "CK", then a final stored block holding four bytes
//! let block = [0x43, 0x4B, 0x01, 0x04, 0x00, 0xFB, 0xFF, 0xDE, 0xAD, 0xBE, 0xEF];
//! let mut state = MszipState::new();
//! let mut output = [0u8; 4];
//! state.decompress(&block, block.len(), &mut output, 4)?;
//! assert_eq!(output, [0xDE, 0xAD, 0xBE, 0xEF]);
//! # Ok::<(), msdecomp::MsDecompError>(())
//! ```
//!
//! # Example - SZDD file
//!
//! ```no_run
//! use msdecomp::{expand_bytes, get_expanded_name, SzddReader};
//! use std::io::Read;
//!
//! let compressed = std::fs::read("SETUP.EX_")?;
//! let expanded = expand_bytes(&compressed)?;
//!
//! // Or stream it
//! let mut reader = SzddReader::new(std::io::Cursor::new(compressed))?;
//! let name = get_expanded_name("SETUP.EX_", reader.header().missing_char);
//! println!("expanding to {}", name);
//! let mut output = Vec::new();
//! reader.read_to_end(&mut output)?;
//! assert_eq!(output, expanded);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Example - CAB folder
//!
//! ```
//! use msdecomp::FolderDecoder;
//!
//! // typeCompress 0x1242: Quantum, level 4, 2^18 byte window
//! let decoder = FolderDecoder::from_folder_type(0x1242)?;
//! # let _ = decoder;
//! # Ok::<(), msdecomp::MsDecompError>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod bit_reader;
pub mod common;
pub mod error;
pub mod folder;
pub mod huffman;
pub mod mszip;
pub mod quantum;
pub mod szdd;
pub mod tables;
pub mod window;

// Re-export commonly used types
pub use common::{
    CompressionType, MsDecompError, Result, MSZIP_BLOCK_SIZE, MSZIP_SIGNATURE,
    QUANTUM_MAX_WINDOW_BITS, QUANTUM_MIN_WINDOW_BITS, SZDD_HEADER_SIZE, SZDD_SIGNATURE,
};
pub use folder::FolderDecoder;
pub use mszip::MszipState;
pub use quantum::QuantumState;
pub use szdd::{get_expanded_name, LzState, SzddHeader, SzddReader};

// Convenience functions

/// Expand a complete SZDD file held in memory
///
/// # Arguments
/// * `data` - The SZDD file, header included
///
/// # Returns
/// A vector holding the `real_length` bytes the header announces
pub fn expand_bytes(data: &[u8]) -> Result<Vec<u8>> {
    szdd::expand_bytes(data)
}

/// Decode a single MSZIP block
///
/// # Arguments
/// * `data` - The block, starting with the `"CK"` signature
/// * `output_len` - The uncompressed size recorded for the block
pub fn decompress_mszip_block(data: &[u8], output_len: usize) -> Result<Vec<u8>> {
    mszip::decompress_block(data, output_len)
}
