use super::{ChunkCodec, CompressionType, RawStream};
use crate::errors::{PackageError, Result};

/// Chunk processor for LZX-compressed data.
///
/// LZX isn't actually used to compress whole packages, only XNB payloads
/// inside texture entries, which this crate treats as opaque blobs. The
/// type code is reserved so a package header naming it is recognized rather
/// than rejected as unknown, but encoding/decoding raises [`NotImplemented`].
///
/// [`NotImplemented`]: crate::errors::PackageError::NotImplemented
pub(super) struct LzxCodec;

impl ChunkCodec for LzxCodec {
    fn read_chunk(&self, _raw: &mut dyn RawStream, _chunk_size: usize) -> Result<Vec<u8>> {
        Err(PackageError::NotImplemented(
            "LZX decompression is not implemented".to_string(),
        ))
    }

    fn write_chunk(&self, _raw: &mut dyn RawStream, _chunk: &[u8]) -> Result<()> {
        Err(PackageError::NotImplemented(
            "LZX compression is not implemented".to_string(),
        ))
    }

    fn skip_chunk(&self, _raw: &mut dyn RawStream, _chunk_size: usize) -> Result<()> {
        Err(PackageError::NotImplemented(
            "LZX is not implemented".to_string(),
        ))
    }

    fn type_code(&self) -> u8 {
        CompressionType::Lzx.type_code()
    }
}
