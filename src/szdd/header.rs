//! SZDD file header and expanded-name reconstruction

use crate::common::{SZDD_HEADER_SIZE, SZDD_SIGNATURE};
use crate::{MsDecompError, Result};

/// The only compression type SZDD files use ('A')
pub const COMPRESSION_TYPE_A: u8 = b'A';

/// Parsed 14-byte SZDD header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SzddHeader {
    /// Compression type byte, always 'A'
    pub compression_type: u8,
    /// Character the compressed filename's trailing '_' replaced, or 0
    pub missing_char: u8,
    /// Size of the expanded file
    pub real_length: u32,
}

impl SzddHeader {
    /// Parse the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = data
            .get(..SZDD_HEADER_SIZE)
            .ok_or(MsDecompError::TruncatedInput)?;
        if header[..8] != SZDD_SIGNATURE {
            return Err(MsDecompError::InvalidSignature);
        }
        let compression_type = header[8];
        if compression_type != COMPRESSION_TYPE_A {
            return Err(MsDecompError::InvalidCompressionType(compression_type));
        }
        Ok(Self {
            compression_type,
            missing_char: header[9],
            real_length: u32::from_le_bytes([header[10], header[11], header[12], header[13]]),
        })
    }

    /// Serialise the header, as written by a compressor
    pub fn to_bytes(&self) -> [u8; SZDD_HEADER_SIZE] {
        let mut bytes = [0u8; SZDD_HEADER_SIZE];
        bytes[..8].copy_from_slice(&SZDD_SIGNATURE);
        bytes[8] = self.compression_type;
        bytes[9] = self.missing_char;
        bytes[10..].copy_from_slice(&self.real_length.to_le_bytes());
        bytes
    }

    /// Original filename for the compressed file `name`
    pub fn expanded_name(&self, name: &str) -> String {
        get_expanded_name(name, self.missing_char)
    }
}

/// Rebuild an original filename from its compressed name.
///
/// A trailing `_` in the extension is replaced by `missing_char`, cased to
/// match the first letter of the file's base name. Names without an
/// extension, or a `missing_char` of 0, are returned unchanged.
pub fn get_expanded_name(compressed_name: &str, missing_char: u8) -> String {
    let base_start = compressed_name
        .rfind(['/', '\\'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let base = &compressed_name[base_start..];

    if missing_char == 0 || !missing_char.is_ascii() {
        return compressed_name.to_string();
    }
    let dot = match base.rfind('.') {
        Some(dot) => dot,
        None => return compressed_name.to_string(),
    };
    if !base[dot + 1..].ends_with('_') {
        return compressed_name.to_string();
    }

    let lowercase = base
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.is_ascii_lowercase())
        .unwrap_or(true);
    let replacement = if lowercase {
        missing_char.to_ascii_lowercase()
    } else {
        missing_char.to_ascii_uppercase()
    } as char;

    let mut expanded = compressed_name[..compressed_name.len() - 1].to_string();
    expanded.push(replacement);
    expanded
}
