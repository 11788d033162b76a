use std::io::{Read, Write};

use crate::bytes::{ReadExt, WriteExt};
use crate::errors::Result;

/// A Spine skeleton: JSON/binary atlas and skeleton data, each a
/// 4-byte-length-prefixed blob.
#[derive(Debug, Clone)]
pub struct SpineEntry {
    pub version: u8,
    pub name: String,
    pub spine_atlas: String,
    pub spine_data: String,
}

impl SpineEntry {
    pub(super) fn read_from<R: Read>(source: &mut R, _version: i32) -> Result<Self> {
        let version = source.read_u8_val()?;
        let name = source.read_string()?;
        let spine_atlas = source.read_big_string()?;
        let spine_data = source.read_big_string()?;
        Ok(Self {
            version,
            name,
            spine_atlas,
            spine_data,
        })
    }

    pub(super) fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_u8_val(self.version)?;
        sink.write_string(&self.name)?;
        sink.write_big_string(&self.spine_atlas)?;
        sink.write_big_string(&self.spine_data)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_skeleton() {
        let entry = SpineEntry {
            version: 1,
            name: "Hero_Skeleton".to_string(),
            spine_atlas: "hero.atlas contents".to_string(),
            spine_data: "{\"skeleton\":{}}".to_string(),
        };
        let mut buf = Vec::new();
        entry.write_to(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let back = SpineEntry::read_from(&mut cursor, 7).unwrap();
        assert_eq!(back.version, entry.version);
        assert_eq!(back.spine_atlas, entry.spine_atlas);
        assert_eq!(back.spine_data, entry.spine_data);
    }
}
