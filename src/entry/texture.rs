use std::io::{Read, Write};

use crate::bytes::{ReadExt, WriteExt};
use crate::errors::Result;

/// A single 2D texture. The pixel data is an opaque XNB-encoded blob —
/// decoding the image codec inside it is out of scope for this crate, which
/// only needs to preserve the bytes across read/write/patch.
#[derive(Debug, Clone)]
pub struct TextureEntry {
    pub name: String,
    pub size: i32,
    pub data: Vec<u8>,
}

impl TextureEntry {
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

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_texture() {
        let entry = TextureEntry {
            name: "Hero_Diffuse".to_string(),
            size: 64,
            data: vec![0xAA; 64],
        };
        let mut buf = Vec::new();
        entry.write_to(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let back = TextureEntry::read_from(&mut cursor, 7).unwrap();
        assert_eq!(back.name, entry.name);
        assert_eq!(back.data, entry.data);
    }
}
