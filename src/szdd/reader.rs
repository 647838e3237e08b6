//! SzddReader - Streaming expansion of SZDD files
//!
//! The payload is buffered in memory on construction. Reads decode on demand;
//! seeking backwards rewinds the LZ state and replays from the first byte, so
//! its cost grows with the target offset.

use super::header::SzddHeader;
use super::state::LzState;
use crate::common::SZDD_HEADER_SIZE;
use crate::{MsDecompError, Result};
use std::io::{self, Read, Seek, SeekFrom};

const SKIP_CHUNK: usize = 4096;

/// Reader over the expanded contents of an SZDD file
#[derive(Debug)]
pub struct SzddReader<R: Read> {
    inner: R,
    header: SzddHeader,
    payload: Vec<u8>,
    state: LzState,
    position: u64,
}

impl<R: Read> SzddReader<R> {
    /// Read and validate the header, then buffer the compressed payload
    pub fn new(mut inner: R) -> Result<Self> {
        let mut header = [0u8; SZDD_HEADER_SIZE];
        inner.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => MsDecompError::TruncatedInput,
            _ => MsDecompError::Io(e),
        })?;
        let header = SzddHeader::parse(&header)?;

        let mut payload = Vec::new();
        inner.read_to_end(&mut payload)?;
        log::debug!(
            "SZDD payload: {} compressed bytes, {} expanded",
            payload.len(),
            header.real_length
        );

        Ok(Self {
            inner,
            header,
            payload,
            state: LzState::new(),
            position: 0,
        })
    }

    /// The parsed file header
    pub fn header(&self) -> &SzddHeader {
        &self.header
    }

    /// Expanded size from the header
    pub fn len(&self) -> u64 {
        self.header.real_length as u64
    }

    /// True if the expanded file is empty
    pub fn is_empty(&self) -> bool {
        self.header.real_length == 0
    }

    /// Size of the buffered compressed payload
    pub fn compressed_len(&self) -> usize {
        self.payload.len()
    }

    /// Recover the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Decode and discard output until the decoder has produced `target` bytes
    fn decode_to(&mut self, target: u64) -> Result<()> {
        let mut scratch = [0u8; SKIP_CHUNK];
        while self.state.output_pos() < target {
            let n = (target - self.state.output_pos()).min(SKIP_CHUNK as u64) as usize;
            self.state
                .decompress(&self.payload, self.payload.len(), &mut scratch, n)?;
        }
        Ok(())
    }
}

impl<R: Read> Read for SzddReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len().saturating_sub(self.position);
        let n = (buf.len() as u64).min(remaining) as usize;
        if n == 0 {
            return Ok(0);
        }
        match self
            .state
            .decompress(&self.payload, self.payload.len(), buf, n)
        {
            Ok(()) => {
                self.position += n as u64;
                Ok(n)
            }
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

impl<R: Read> Seek for SzddReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        }
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )
        })?;

        if target < self.state.output_pos() {
            log::trace!(
                "SZDD backward seek {} -> {}, replaying",
                self.position,
                target
            );
            self.state.reset();
        }
        self.decode_to(target.min(self.len()))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.position = target;
        Ok(target)
    }
}
