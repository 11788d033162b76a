use std::io::{Read, Write};

use crate::bytes::{ReadExt, WriteExt};
use crate::errors::{PackageError, Result};

/// A Bink video sized for the atlas it's packed alongside, the video-entry
/// counterpart to [`super::AtlasEntry`]. `original_size` and `scaling` are
/// only present from format version 2 and 3 onward respectively.
#[derive(Debug, Clone)]
pub struct BinkAtlasEntry {
    pub name: String,
    pub size: i32,
    pub version: i32,
    pub width: i32,
    pub height: i32,
    pub original_size: Option<(i32, i32)>,
    pub scaling: Option<f32>,
}

impl BinkAtlasEntry {
    pub(super) fn read_from<R: Read>(source: &mut R, _version: i32) -> Result<Self> {
        let size = source.read_i32_be()?;
        let version = source.read_i32_be()?;
        if version < 1 {
            return Err(PackageError::UnsupportedVersion(version));
        }
        let name = source.read_string()?;
        let width = source.read_i32_be()?;
        let height = source.read_i32_be()?;

        let mut original_size = None;
        let mut scaling = None;
        if version > 1 {
            original_size = Some((source.read_i32_be()?, source.read_i32_be()?));
            if version > 2 {
                scaling = Some(source.read_f32_be()?);
            }
        }

        Ok(Self {
            name,
            size,
            version,
            width,
            height,
            original_size,
            scaling,
        })
    }

    pub(super) fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_i32_be(self.size)?;
        sink.write_i32_be(self.version)?;
        sink.write_string(&self.name)?;
        sink.write_i32_be(self.width)?;
        sink.write_i32_be(self.height)?;
        if self.version > 1 {
            let (x, y) = self.original_size.unwrap_or((0, 0));
            sink.write_i32_be(x)?;
            sink.write_i32_be(y)?;
            if self.version > 2 {
                sink.write_f32_be(self.scaling.unwrap_or(0.0))?;
            }
        }
        Ok(())
    }
}
