//! SZDD (LZEXPAND) decompression
//!
//! SZDD files are produced by Microsoft's `COMPRESS.EXE` and expanded by
//! `EXPAND.EXE`: a 14-byte header followed by a flag-byte LZ77 stream over a
//! 4 KB ring buffer.

mod header;
mod reader;
mod state;

pub use header::{get_expanded_name, SzddHeader, COMPRESSION_TYPE_A};
pub use reader::SzddReader;
pub use state::{LzState, MAX_MATCH, MIN_MATCH, TABLE_SIZE, TABLE_START};

use crate::common::SZDD_HEADER_SIZE;
use crate::Result;

const EXPAND_CHUNK: usize = 0x10000;

/// Decode the next `output_len` bytes of an SZDD payload; see
/// [`LzState::decompress`]
pub fn decompress(
    state: &mut LzState,
    input: &[u8],
    input_len: usize,
    output: &mut [u8],
    output_len: usize,
) -> Result<()> {
    state.decompress(input, input_len, output, output_len)
}

/// Convenience function to expand a complete SZDD file in memory
pub fn expand_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let header = SzddHeader::parse(data)?;
    let payload = &data[SZDD_HEADER_SIZE..];
    let total = header.real_length as usize;

    let mut state = LzState::new();
    let mut output = Vec::new();
    while output.len() < total {
        let start = output.len();
        let n = (total - start).min(EXPAND_CHUNK);
        output.resize(start + n, 0);
        state.decompress(payload, payload.len(), &mut output[start..], n)?;
    }
    Ok(output)
}
