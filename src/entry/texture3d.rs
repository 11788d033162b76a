use std::io::{Read, Write};

use crate::bytes::{ReadExt, WriteExt};
use crate::errors::Result;

/// A volumetric texture. Wire layout is identical to [`TextureEntry`]'s —
/// name, size-prefixed XNB blob — the game distinguishes the two only by
/// their containing entry type code.
#[derive(Debug, Clone)]
pub struct Texture3DEntry {
    pub name: String,
    pub size: i32,
    pub data: Vec<u8>,
}

impl Texture3DEntry {
    pub(super) fn read_from<R: Read>(source: &mut R, _version: i32) -> Result<Self> {
        let name = source.read_string()?;
        let size = source.read_i32_be()?;
        let mut data = vec![0u8; size.max(0) as usize];
        source.read_exact(&mut data)?;
        Ok(Self { name, size, data })
    }

    pub(super) fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_string(&self.name)?;
        sink.write_i32_be(self.size)?;
        sink.write_all(&self.data)?;
        Ok(())
    }
}
