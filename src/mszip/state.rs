//! MSZIP decoder state
//!
//! MSZIP carries no history from one CAB block to the next, so the state is
//! only the 32 KB window (reused to avoid reallocating per block), the fixed
//! Huffman tables once they have been built, and bookkeeping from the last
//! call.

use super::WINDOW_SIZE;
use crate::huffman::HuffmanTable;
use crate::window::SlidingWindow;

/// State for decoding a sequence of MSZIP blocks
#[derive(Debug, Clone)]
pub struct MszipState {
    /// Output history for back-references inside the current block
    pub(crate) window: SlidingWindow,
    /// Fixed literal/length and distance tables, built on first use
    pub(crate) fixed_tables: Option<(HuffmanTable, HuffmanTable)>,
    /// Input bytes consumed by the last successful call
    pub(crate) bytes_consumed: usize,
    /// Number of blocks decoded since creation
    pub(crate) blocks_decoded: u64,
}

impl MszipState {
    /// Create a fresh state
    pub fn new() -> Self {
        Self {
            window: SlidingWindow::new(WINDOW_SIZE),
            fixed_tables: None,
            bytes_consumed: 0,
            blocks_decoded: 0,
        }
    }

    /// Clear per-block bookkeeping
    pub fn reset(&mut self) {
        self.window.reset();
        self.bytes_consumed = 0;
    }

    /// Input bytes (signature included) the last call consumed
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Number of blocks successfully decoded with this state
    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }
}

impl Default for MszipState {
    fn default() -> Self {
        Self::new()
    }
}
