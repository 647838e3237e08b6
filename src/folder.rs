//! Per-folder block decoding for CAB archives
//!
//! A CAB folder names one compression method in its `typeCompress` word and
//! stores every block of the folder with it. [`FolderDecoder`] owns the state
//! that method needs and decodes the folder's blocks in order.

use crate::common::{checked_prefix, checked_prefix_mut, CompressionType};
use crate::mszip::MszipState;
use crate::quantum::QuantumState;
use crate::{MsDecompError, Result};

/// Decoder for the blocks of one CAB folder
#[derive(Debug, Clone)]
pub enum FolderDecoder {
    /// Blocks are stored verbatim
    Stored,
    /// MSZIP blocks
    Mszip(MszipState),
    /// One continuous Quantum stream
    Quantum(Box<QuantumState>),
}

impl FolderDecoder {
    /// Create the decoder a compression type calls for
    pub fn new(compression: CompressionType) -> Result<Self> {
        match compression {
            CompressionType::None => Ok(FolderDecoder::Stored),
            CompressionType::Mszip => Ok(FolderDecoder::Mszip(MszipState::new())),
            CompressionType::Quantum { window_bits, level } => Ok(FolderDecoder::Quantum(
                Box::new(QuantumState::new(window_bits, level)?),
            )),
            CompressionType::Lzx { window_bits } => {
                log::warn!("LZX folder (window 2^{}) is not supported", window_bits);
                Err(MsDecompError::UnsupportedCompression(
                    0x0003 | (window_bits as u16) << 8,
                ))
            }
        }
    }

    /// Create a decoder from a raw CAB `typeCompress` word
    pub fn from_folder_type(value: u16) -> Result<Self> {
        Self::new(CompressionType::from_folder_type(value)?)
    }

    /// Compression type this decoder handles
    pub fn compression_type(&self) -> CompressionType {
        match self {
            FolderDecoder::Stored => CompressionType::None,
            FolderDecoder::Mszip(_) => CompressionType::Mszip,
            FolderDecoder::Quantum(state) => CompressionType::Quantum {
                window_bits: state.window_bits(),
                level: state.level(),
            },
        }
    }

    /// Decode the folder's next block
    pub fn decompress(
        &mut self,
        input: &[u8],
        input_len: usize,
        output: &mut [u8],
        output_len: usize,
    ) -> Result<()> {
        match self {
            FolderDecoder::Stored => {
                let input = checked_prefix(input, input_len)?;
                let output = checked_prefix_mut(output, output_len)?;
                if input_len != output_len {
                    return Err(MsDecompError::CorruptData("stored block sizes disagree"));
                }
                output.copy_from_slice(input);
                Ok(())
            }
            FolderDecoder::Mszip(state) => state.decompress(input, input_len, output, output_len),
            FolderDecoder::Quantum(state) => state.decompress(input, input_len, output, output_len),
        }
    }

    /// Re-prime the Quantum range coder on the next block; a no-op for the
    /// other methods, which carry no coder state between blocks
    pub fn restart_frame(&mut self) {
        if let FolderDecoder::Quantum(state) = self {
            state.restart_frame();
        }
    }

    /// Rewind to the start of the folder
    pub fn reset(&mut self) {
        match self {
            FolderDecoder::Stored => {}
            FolderDecoder::Mszip(state) => state.reset(),
            FolderDecoder::Quantum(state) => state.reset(),
        }
    }
}
