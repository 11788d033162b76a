use lz4::block::{compress, decompress, CompressionMode};

use super::{frame, ChunkCodec, CompressionType, RawStream};
use crate::errors::{PackageError, Result};

/// Chunk processor for LZ4-compressed packages. Hades' default compression.
///
/// Compression always uses LZ4's high-compression mode with no prepended
/// size header — the chunk size is already known from the container, so the
/// size belongs to the frame (see [`frame`]), not the block.
pub(super) struct Lz4Codec;

impl ChunkCodec for Lz4Codec {
    fn read_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<Vec<u8>> {
        frame::read_chunk(raw, chunk_size, |compressed, size| {
            decompress(compressed, Some(size as i32)).map_err(|e| {
                PackageError::MalformedInput(format!("lz4 decompression failed: {}", e))
            })
        })
    }

    fn write_chunk(&self, raw: &mut dyn RawStream, chunk: &[u8]) -> Result<()> {
        frame::write_chunk(raw, chunk, |data| {
            compress(data, Some(CompressionMode::HighCompression(9)), false)
                .map_err(|e| PackageError::EncodingError(format!("lz4 compression failed: {}", e)))
        })
    }

    fn skip_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<()> {
        frame::skip_chunk(raw, chunk_size)
    }

    fn type_code(&self) -> u8 {
        CompressionType::Lz4.type_code()
    }
}
