use std::io::{Read, Write};

use crate::bytes::{ReadExt, WriteExt};
use crate::errors::Result;

/// A Bink video clip reference. The flag byte doubles as an alpha marker
/// (`0x01`) and as a sentinel (`0xFF`) introducing an optional scaling
/// factor; every other value leaves `scaling` unset.
#[derive(Debug, Clone)]
pub struct BinkEntry {
    pub name: String,
    pub flag: u8,
    pub scaling: Option<f32>,
}

impl BinkEntry {
    pub fn is_alpha(&self) -> bool {
        self.flag == 0x01
    }

    pub(super) fn read_from<R: Read>(source: &mut R, _version: i32) -> Result<Self> {
        let flag = source.read_u8_val()?;
        let mut scaling = None;
        if flag == 0xFF {
            let count = source.read_i32_be()?;
            source.read_u8_val()?;
            if count > 0 {
                scaling = Some(source.read_f32_be()?);
            }
        }
        let name = source.read_string()?;
        Ok(Self { name, flag, scaling })
    }

    pub(super) fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_u8_val(self.flag)?;
        if self.flag == 0xFF {
            sink.write_i32_be(if self.scaling.is_some() { 1 } else { 0 })?;
            sink.write_u8_val(0)?;
            if let Some(scaling) = self.scaling {
                sink.write_f32_be(scaling)?;
            }
        }
        sink.write_string(&self.name)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_plain_clip() {
        let entry = BinkEntry {
            name: "Intro".to_string(),
            flag: 0x01,
            scaling: None,
        };
        let mut buf = Vec::new();
        entry.write_to(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let back = BinkEntry::read_from(&mut cursor, 7).unwrap();
        assert!(back.is_alpha());
        assert_eq!(back.name, entry.name);
        assert_eq!(back.scaling, None);
    }

    #[test]
    fn round_trips_a_scaled_clip() {
        let entry = BinkEntry {
            name: "Outro".to_string(),
            flag: 0xFF,
            scaling: Some(0.5),
        };
        let mut buf = Vec::new();
        entry.write_to(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let back = BinkEntry::read_from(&mut cursor, 7).unwrap();
        assert_eq!(back.flag, 0xFF);
        assert_eq!(back.scaling, Some(0.5));
    }
}
