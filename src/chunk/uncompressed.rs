use std::io::Read;

use super::{ChunkCodec, RawStream};
use crate::errors::Result;

/// Chunk processor for uncompressed packages. Passes chunk bytes through
/// unmodified; `skip_chunk` just seeks past them.
pub(super) struct UncompressedCodec;

impl ChunkCodec for UncompressedCodec {
    fn read_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<Vec<u8>> {
        // The final chunk of an uncompressed package is truncated to the
        // bytes actually written, so this may return fewer than
        // `chunk_size` bytes rather than erroring at EOF.
        let mut buf = Vec::with_capacity(chunk_size);
        raw.take(chunk_size as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn write_chunk(&self, raw: &mut dyn RawStream, chunk: &[u8]) -> Result<()> {
        raw.write_all(chunk)?;
        Ok(())
    }

    fn skip_chunk(&self, raw: &mut dyn RawStream, chunk_size: usize) -> Result<()> {
        raw.seek(std::io::SeekFrom::Current(chunk_size as i64))?;
        Ok(())
    }

    fn type_code(&self) -> u8 {
        0x00
    }
}
