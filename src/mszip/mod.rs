//! MSZIP decompression
//!
//! MSZIP is raw deflate with a two-byte `"CK"` prefix on every CAB data block.
//! Each block decodes to at most 32 KB and is independent of the blocks
//! before it.

mod decoder;
mod state;

pub use decoder::{validate_counts, MAX_DISTANCE_CODES, MAX_LITERAL_CODES};
pub use state::MszipState;

use crate::common::MSZIP_BLOCK_SIZE;
use crate::Result;

/// Size of the MSZIP history window (32 KB)
pub const WINDOW_SIZE: usize = MSZIP_BLOCK_SIZE;

/// Decode one MSZIP block; see [`MszipState::decompress`]
pub fn decompress(
    state: &mut MszipState,
    input: &[u8],
    input_len: usize,
    output: &mut [u8],
    output_len: usize,
) -> Result<()> {
    state.decompress(input, input_len, output, output_len)
}

/// Convenience function to decode a single block in memory
pub fn decompress_block(input: &[u8], output_len: usize) -> Result<Vec<u8>> {
    let mut state = MszipState::new();
    let mut output = vec![0u8; output_len];
    state.decompress(input, input.len(), &mut output, output_len)?;
    Ok(output)
}
