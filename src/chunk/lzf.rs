use super::{frame, ChunkCodec, CompressionType, RawStream};
use crate::errors::{PackageError, Result};

/// Chunk processor for LZF-compressed packages. Transistor's default
/// compression. Uses the `lzf` crate's defaults; liblzf exposes no tunable
/// compression level.
pub(super) struct LzfCodec;

impl ChunkCodec for LzfCodec {
    fn read_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<Vec<u8>> {
        frame::read_chunk(raw, chunk_size, |compressed, size| {
            lzf::decompress(compressed, size).map_err(|e| {
                PackageError::MalformedInput(format!("lzf decompression failed: {:?}", e))
            })
        })
    }

    fn write_chunk(&self, raw: &mut dyn RawStream, chunk: &[u8]) -> Result<()> {
        frame::write_chunk(raw, chunk, |data| {
            lzf::compress(data)
                .map_err(|e| PackageError::EncodingError(format!("lzf compression failed: {:?}", e)))
        })
    }

    fn skip_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<()> {
        frame::skip_chunk(raw, chunk_size)
    }

    fn type_code(&self) -> u8 {
        CompressionType::Lzf.type_code()
    }
}
