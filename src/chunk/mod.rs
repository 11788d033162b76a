//! Chunk processors: compression codecs for the fixed-size windows that make
//! up a package's body.
//!
//! Each codec is registered under a symbolic name and a one-byte type code
//! (the same byte that appears in the package header). Lookups are total on
//! the known codes; an unknown code in a header is a fatal
//! [`PackageError::UnknownCompression`].

mod lz4;
mod lzf;
mod lzx;
mod uncompressed;

use std::io::{Read, Seek, Write};

use crate::errors::{PackageError, Result};

/// The raw (possibly compressed) underlying stream a codec reads from and
/// writes to. Packages are only ever opened for exclusive read or exclusive
/// write, but the reader's seek support means the raw handle still needs
/// `Seek` in both directions, so codecs are written against this combined
/// bound rather than plain `Read`/`Write`.
pub trait RawStream: Read + Write + Seek {}
impl<T: Read + Write + Seek + ?Sized> RawStream for T {}

/// The uncompressed size of a chunk window. Chunk 0's effective window is
/// `CHUNK_SIZE - 4` because the header occupies the first four bytes of its
/// virtual range.
pub const CHUNK_SIZE: u64 = 0x0200_0000;

/// Symbolic identity of a registered compression codec.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionType {
    Uncompressed,
    Lz4,
    Lzf,
    Lzx,
}

impl CompressionType {
    pub fn type_code(self) -> u8 {
        match self {
            CompressionType::Uncompressed => 0x00,
            CompressionType::Lz4 => 0x20,
            CompressionType::Lzf => 0x40,
            CompressionType::Lzx => 0x60,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionType::Uncompressed => "uncompressed",
            CompressionType::Lz4 => "lz4",
            CompressionType::Lzf => "lzf",
            CompressionType::Lzx => "lzx",
        }
    }

    pub fn from_type_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(CompressionType::Uncompressed),
            0x20 => Some(CompressionType::Lz4),
            0x40 => Some(CompressionType::Lzf),
            0x60 => Some(CompressionType::Lzx),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "uncompressed" => Some(CompressionType::Uncompressed),
            "lz4" => Some(CompressionType::Lz4),
            "lzf" => Some(CompressionType::Lzf),
            "lzx" => Some(CompressionType::Lzx),
            _ => None,
        }
    }
}

/// A chunk processor: reads, writes, or skips one chunk's worth of data
/// against the raw (compressed) stream.
pub trait ChunkCodec {
    /// Returns exactly `chunk_size` bytes of decompressed data.
    fn read_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<Vec<u8>>;

    /// Writes `chunk` to the raw stream, compressing if applicable.
    fn write_chunk(&self, raw: &mut dyn RawStream, chunk: &[u8]) -> Result<()>;

    /// Advances the raw stream past the next chunk without decompressing it.
    fn skip_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<()>;

    /// The canonical type code this codec is registered under, recorded in
    /// the package header.
    fn type_code(&self) -> u8;
}

/// Looks up a codec by its header type code. Fatal `UnknownCompression` if
/// the code isn't registered; `UnsupportedCompression` if registered but the
/// optional backend is unavailable (checked lazily by the codec itself, not
/// here).
pub fn by_code(code: u8) -> Result<Box<dyn ChunkCodec>> {
    match CompressionType::from_type_code(code) {
        Some(kind) => Ok(build(kind)),
        None => Err(PackageError::UnknownCompression(code)),
    }
}

/// Looks up a codec by its symbolic name, used when a writer is configured
/// programmatically rather than from a parsed header.
pub fn by_name(name: &str) -> Result<Box<dyn ChunkCodec>> {
    match CompressionType::from_name(name) {
        Some(kind) => Ok(build(kind)),
        None => Err(PackageError::UnknownCompression(0)),
    }
}

fn build(kind: CompressionType) -> Box<dyn ChunkCodec> {
    match kind {
        CompressionType::Uncompressed => Box::new(uncompressed::UncompressedCodec),
        CompressionType::Lz4 => Box::new(lz4::Lz4Codec),
        CompressionType::Lzf => Box::new(lzf::LzfCodec),
        CompressionType::Lzx => Box::new(lzx::LzxCodec),
    }
}

/// Shared machinery for the compressed-chunk frame: one flag byte (0 = raw
/// passthrough, non-zero = compressed follows), and when compressed, a
/// 4-byte big-endian signed length then that many bytes of codec payload.
pub(crate) mod frame {
    use std::io::SeekFrom;

    use super::RawStream;
    use crate::bytes::{ReadExt, WriteExt};
    use crate::errors::Result;

    pub fn read_chunk(
        raw: &mut dyn RawStream,
        chunk_size: usize,
        decompress: impl FnOnce(&[u8], usize) -> Result<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let flag = raw.read_u8_val()?;
        if flag == 0 {
            let mut buf = vec![0u8; chunk_size];
            raw.read_exact(&mut buf)?;
            Ok(buf)
        } else {
            let len = raw.read_i32_be()?;
            let mut compressed = vec![0u8; len as usize];
            raw.read_exact(&mut compressed)?;
            let mut decompressed = decompress(&compressed, chunk_size)?;
            decompressed.resize(chunk_size, 0);
            Ok(decompressed)
        }
    }

    pub fn write_chunk(
        raw: &mut dyn RawStream,
        chunk: &[u8],
        compress: impl FnOnce(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<()> {
        let compressed = compress(chunk)?;
        raw.write_u8_val(0x01)?;
        raw.write_i32_be(compressed.len() as i32)?;
        raw.write_all(&compressed)?;
        Ok(())
    }

    pub fn skip_chunk(raw: &mut dyn RawStream, chunk_size: usize) -> Result<()> {
        let flag = raw.read_u8_val()?;
        if flag == 0 {
            raw.seek(SeekFrom::Current(chunk_size as i64))?;
        } else {
            let len = raw.read_i32_be()?;
            raw.seek(SeekFrom::Current(len as i64))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn by_code_resolves_known_codes() {
        assert_eq!(by_code(0x00).unwrap().type_code(), 0x00);
        assert_eq!(by_code(0x20).unwrap().type_code(), 0x20);
        assert_eq!(by_code(0x40).unwrap().type_code(), 0x40);
        assert_eq!(by_code(0x60).unwrap().type_code(), 0x60);
    }

    #[test]
    fn by_code_rejects_unknown_codes() {
        assert!(matches!(
            by_code(0x99),
            Err(PackageError::UnknownCompression(0x99))
        ));
    }

    #[test]
    fn by_name_resolves_to_canonical_type_code() {
        assert_eq!(by_name("lz4").unwrap().type_code(), 0x20);
        assert_eq!(by_name("lzf").unwrap().type_code(), 0x40);
        assert_eq!(by_name("uncompressed").unwrap().type_code(), 0x00);
    }
}
