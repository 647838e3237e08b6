//! Quantum decoder state
//!
//! Everything in here lives for a whole CAB folder: the window, the adaptive
//! models and the range coder registers all carry over from one block to the
//! next.

use super::model::Model;
use crate::common::{QUANTUM_MAX_WINDOW_BITS, QUANTUM_MIN_WINDOW_BITS};
use crate::window::SlidingWindow;
use crate::{MsDecompError, Result};

/// Number of match-type selectors (four literal bands and three match kinds)
pub const SELECTOR_SYMBOLS: usize = 7;

/// Number of length slots for variable-length matches
pub const LENGTH_SYMBOLS: usize = 27;

/// Range coder registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RangeCoder {
    pub(crate) low: u16,
    pub(crate) high: u16,
    pub(crate) code: u16,
    pub(crate) primed: bool,
}

/// The full set of adaptive models a Quantum stream uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Models {
    /// Literal models for bytes 0x00, 0x40, 0x80 and 0xC0 onwards
    pub(crate) literals: [Model; 4],
    /// Position slots of fixed 3-byte matches
    pub(crate) match3_positions: Model,
    /// Position slots of fixed 4-byte matches
    pub(crate) match4_positions: Model,
    /// Length slots of variable-length matches
    pub(crate) lengths: Model,
    /// Position slots of variable-length matches
    pub(crate) positions: Model,
    /// Literal band or match kind
    pub(crate) selector: Model,
}

impl Models {
    pub(crate) fn new(window_bits: u8) -> Self {
        let position_slots = window_bits as usize * 2;
        Self {
            literals: [
                Model::new(0x00, 64),
                Model::new(0x40, 64),
                Model::new(0x80, 64),
                Model::new(0xC0, 64),
            ],
            match3_positions: Model::new(0, position_slots.min(24)),
            match4_positions: Model::new(0, position_slots.min(36)),
            lengths: Model::new(0, LENGTH_SYMBOLS),
            positions: Model::new(0, position_slots),
            selector: Model::new(0, SELECTOR_SYMBOLS),
        }
    }
}

/// State for decoding one Quantum stream (one CAB folder)
#[derive(Debug, Clone)]
pub struct QuantumState {
    window_bits: u8,
    level: u8,
    pub(crate) window: SlidingWindow,
    pub(crate) models: Models,
    pub(crate) coder: RangeCoder,
}

impl QuantumState {
    /// Create state for a `2^window_bits` byte window.
    ///
    /// `level` is the archiver's compression level; it is recorded only.
    pub fn new(window_bits: u8, level: u8) -> Result<Self> {
        if !(QUANTUM_MIN_WINDOW_BITS..=QUANTUM_MAX_WINDOW_BITS).contains(&window_bits) {
            return Err(MsDecompError::UnsupportedWindowSize(window_bits));
        }
        log::debug!(
            "Quantum state: window 2^{} bytes, level {}",
            window_bits,
            level
        );
        Ok(Self {
            window_bits,
            level,
            window: SlidingWindow::new(1 << window_bits),
            models: Models::new(window_bits),
            coder: RangeCoder::default(),
        })
    }

    /// Window exponent
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Recorded compression level
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Window size in bytes
    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    /// Total bytes decoded since creation or the last reset
    pub fn total_output(&self) -> u64 {
        self.window.written()
    }

    /// Return to the freshly constructed state, as needed before replaying a
    /// folder from its start
    pub fn reset(&mut self) {
        log::debug!("Quantum state reset");
        self.window.reset();
        self.models = Models::new(self.window_bits);
        self.coder = RangeCoder::default();
    }

    /// Re-prime the range coder from the next call's input while keeping the
    /// models and window
    pub fn restart_frame(&mut self) {
        self.coder.primed = false;
    }
}
