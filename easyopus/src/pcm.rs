//! Conversions between the byte view and the sample view of a buffer.
//!
//! Byte-packed PCM is never reinterpreted in place. Every conversion copies
//! and states its byte order.

use crate::error::CodecError;

/// Byte order of 16-bit samples in a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    fn read(self, pair: [u8; 2]) -> i16 {
        match self {
            Self::Little => i16::from_le_bytes(pair),
            Self::Big => i16::from_be_bytes(pair),
        }
    }

    fn write(self, sample: i16) -> [u8; 2] {
        match self {
            Self::Little => sample.to_le_bytes(),
            Self::Big => sample.to_be_bytes(),
        }
    }
}

/// Decodes byte-packed PCM into samples. The byte count must be even.
pub fn bytes_to_samples(bytes: &[u8], endian: Endian) -> Result<Vec<i16>, CodecError> {
    if bytes.len() % 2 != 0 {
        return Err(CodecError::InvalidArgument(format!(
            "odd pcm byte count {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| endian.read([pair[0], pair[1]]))
        .collect())
}

/// Encodes samples as byte-packed PCM.
pub fn samples_to_bytes(samples: &[i16], endian: Endian) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        data.extend_from_slice(&endian.write(*sample));
    }
    data
}

/// Packs arbitrary bytes two per `i16`. An odd trailing byte is zero-padded.
///
/// Used to carry encoded packets in 16-bit containers; the byte count
/// has to travel separately for `unpack_bytes`.
pub fn pack_bytes(bytes: &[u8], endian: Endian) -> Vec<i16> {
    bytes
        .chunks(2)
        .map(|chunk| endian.read([chunk[0], chunk.get(1).copied().unwrap_or(0)]))
        .collect()
}

/// Reverses `pack_bytes`, returning at most `len` bytes.
pub fn unpack_bytes(words: &[i16], len: usize, endian: Endian) -> Vec<u8> {
    let mut data = samples_to_bytes(words, endian);
    data.truncate(len);
    data
}
