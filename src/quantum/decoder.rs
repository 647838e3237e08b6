//! Range decoding and match expansion for Quantum

use super::model::Model;
use super::state::{QuantumState, RangeCoder};
use super::INPUT_SLACK;
use crate::bit_reader::MsbBitReader;
use crate::common::{checked_prefix, checked_prefix_mut};
use crate::tables::{QTM_LENGTH_BASE, QTM_LENGTH_EXTRA, QTM_POSITION_BASE, QTM_POSITION_EXTRA};
use crate::{MsDecompError, Result};

impl RangeCoder {
    /// Load `code` from the first 16 bits of a frame
    fn prime(&mut self, bits: &mut MsbBitReader<'_>) -> Result<()> {
        self.low = 0;
        self.high = 0xFFFF;
        self.code = bits.read_bits(16)? as u16;
        self.primed = true;
        Ok(())
    }

    /// Decode one symbol from `model`, update the model and renormalise
    pub(crate) fn decode(&mut self, model: &mut Model, bits: &mut MsbBitReader<'_>) -> Result<u16> {
        let low = self.low as u32;
        let high = self.high as u32;
        let range = (high.wrapping_sub(low) & 0xFFFF) + 1;
        let total = model.total_frequency() as u32;

        let target = (self.code as u32)
            .wrapping_sub(low)
            .wrapping_add(1)
            .wrapping_mul(total)
            .wrapping_sub(1)
            / range
            & 0xFFFF;
        let index = model.find(target);
        let symbol = model.symbol_at(index - 1);

        let upper = model.cumulative_frequency(index - 1) as u32 * range / total;
        let lower = model.cumulative_frequency(index) as u32 * range / total;
        self.high = low.wrapping_add(upper).wrapping_sub(1) as u16;
        self.low = low.wrapping_add(lower) as u16;

        model.update(index);

        loop {
            if (self.low ^ self.high) & 0x8000 != 0 {
                if self.low & 0x4000 != 0 && self.high & 0x4000 == 0 {
                    self.code ^= 0x4000;
                    self.low &= 0x3FFF;
                    self.high |= 0x4000;
                } else {
                    break;
                }
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | bits.read_bit()?;
        }

        Ok(symbol)
    }
}

impl QuantumState {
    /// Decode exactly `output_len` bytes from `input[..input_len]` into
    /// `output[..output_len]`, continuing the stream from the previous call
    pub fn decompress(
        &mut self,
        input: &[u8],
        input_len: usize,
        output: &mut [u8],
        output_len: usize,
    ) -> Result<()> {
        let input = checked_prefix(input, input_len)?;
        let output = checked_prefix_mut(output, output_len)?;
        if self.window.position() + output_len > self.window.capacity() {
            return Err(MsDecompError::CorruptData(
                "Quantum frame straddles the window end",
            ));
        }

        let mut bits = MsbBitReader::new(input, INPUT_SLACK);
        if !self.coder.primed {
            self.coder.prime(&mut bits)?;
        }
        log::trace!(
            "Quantum frame: {} bytes from {} input bytes at window position {}",
            output_len,
            input_len,
            self.window.position()
        );

        let window = &mut self.window;
        let models = &mut self.models;
        let coder = &mut self.coder;

        let mut togo = output_len;
        while togo > 0 {
            let selector = coder.decode(&mut models.selector, &mut bits)?;
            let (length, offset) = match selector {
                0..=3 => {
                    let literal = coder.decode(&mut models.literals[selector as usize], &mut bits)?;
                    window.push(literal as u8);
                    togo -= 1;
                    continue;
                }
                4 => {
                    let slot = coder.decode(&mut models.match3_positions, &mut bits)?;
                    (3, read_offset(slot, &mut bits)?)
                }
                5 => {
                    let slot = coder.decode(&mut models.match4_positions, &mut bits)?;
                    (4, read_offset(slot, &mut bits)?)
                }
                6 => {
                    let slot = coder.decode(&mut models.lengths, &mut bits)? as usize;
                    let extra = bits.read_many_bits(QTM_LENGTH_EXTRA[slot] as u32)? as usize;
                    let length = QTM_LENGTH_BASE[slot] as usize + extra + 5;
                    let slot = coder.decode(&mut models.positions, &mut bits)?;
                    (length, read_offset(slot, &mut bits)?)
                }
                _ => return Err(MsDecompError::InvalidSymbol),
            };

            if length > togo {
                return Err(MsDecompError::CorruptData("match overruns the frame"));
            }
            window.copy_match(offset, length)?;
            togo -= length;
        }

        if bits.overrun() > 0 {
            log::trace!("Quantum frame read {} padding bytes", bits.overrun());
        }
        output.copy_from_slice(self.window.recent(output_len)?);
        Ok(())
    }
}

/// Position slot plus its extra bits, as a back-reference distance
fn read_offset(slot: u16, bits: &mut MsbBitReader<'_>) -> Result<usize> {
    let slot = slot as usize;
    let extra = bits.read_many_bits(QTM_POSITION_EXTRA[slot] as u32)?;
    Ok((QTM_POSITION_BASE[slot] + extra) as usize + 1)
}
