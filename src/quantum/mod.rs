//! Quantum decompression
//!
//! Quantum is an adaptive range coder over seven model families with an LZ77
//! window of 1 KB to 2 MB. The state persists across every block of a CAB
//! folder; a backward seek must [`QuantumState::reset`] and replay from the
//! folder start.

mod decoder;
mod model;
mod state;

pub use model::{Model, FREQUENCY_STEP, RESCALE_THRESHOLD};
pub use state::{QuantumState, LENGTH_SYMBOLS, SELECTOR_SYMBOLS};

use crate::Result;

/// Zero bytes the range coder may read past the end of a frame's input
pub const INPUT_SLACK: usize = 4;

/// Decode one Quantum frame; see [`QuantumState::decompress`]
pub fn decompress(
    state: &mut QuantumState,
    input: &[u8],
    input_len: usize,
    output: &mut [u8],
    output_len: usize,
) -> Result<()> {
    state.decompress(input, input_len, output, output_len)
}
