//! Entry codec: the typed, polymorphic records stored inside a package body.
//!
//! Every entry starts with a one-byte type code (already consumed by the
//! container's entry loop by the time [`Entry::read_body`] runs) and
//! dispatches to one of seven concrete layouts. `Entry::write_body` is the
//! inverse, re-prefixing the type code itself.

use std::io::{Read, Write};

use crate::bytes::WriteExt;
use crate::errors::{PackageError, Result};

mod atlas;
mod bink;
mod bink_atlas;
mod include;
mod spine;
mod texture;
mod texture3d;

pub use atlas::{AtlasEntry, AtlasTexture, Point, Rect, SubAtlas, ATLAS_SENTINEL};
pub use bink::BinkEntry;
pub use bink_atlas::BinkAtlasEntry;
pub use include::IncludeEntry;
pub use spine::SpineEntry;
pub use texture::TextureEntry;
pub use texture3d::Texture3DEntry;

pub const TEXTURE_CODE: u8 = 0xAD;
pub const TEXTURE3D_CODE: u8 = 0xAA;
pub const BINK_CODE: u8 = 0xBB;
pub const ATLAS_CODE: u8 = 0xDE;
pub const BINK_ATLAS_CODE: u8 = 0xEE;
pub const INCLUDE_CODE: u8 = 0xCC;
pub const SPINE_CODE: u8 = 0xF0;

/// One record from a package body, tagged by its leading type byte.
#[derive(Debug, Clone)]
pub enum Entry {
    Texture(TextureEntry),
    Texture3D(Texture3DEntry),
    Bink(BinkEntry),
    Atlas(AtlasEntry),
    BinkAtlas(BinkAtlasEntry),
    Include(IncludeEntry),
    Spine(SpineEntry),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Texture(e) => &e.name,
            Entry::Texture3D(e) => &e.name,
            Entry::Bink(e) => &e.name,
            Entry::Atlas(e) => &e.name,
            Entry::BinkAtlas(e) => &e.name,
            Entry::Include(e) => &e.name,
            Entry::Spine(e) => &e.name,
        }
    }

    pub fn type_code(&self) -> u8 {
        match self {
            Entry::Texture(_) => TEXTURE_CODE,
            Entry::Texture3D(_) => TEXTURE3D_CODE,
            Entry::Bink(_) => BINK_CODE,
            Entry::Atlas(_) => ATLAS_CODE,
            Entry::BinkAtlas(_) => BINK_ATLAS_CODE,
            Entry::Include(_) => INCLUDE_CODE,
            Entry::Spine(_) => SPINE_CODE,
        }
    }

    /// The conventional extension used when extracting this entry to a
    /// loose file on disk. The XNB blob inside a texture round-trips
    /// natively as `.xnb`; an atlas's sub-atlas table round-trips as JSON.
    /// Everything else (the bink/spine video and animation codecs this
    /// crate can't natively decode) round-trips as an opaque `.entry` blob.
    pub fn export_extension(&self) -> &'static str {
        match self {
            Entry::Texture(_) | Entry::Texture3D(_) => "xnb",
            Entry::Bink(_) => "entry",
            Entry::Atlas(_) => "atlas.json",
            Entry::BinkAtlas(_) => "entry",
            Entry::Include(_) => "entry",
            Entry::Spine(_) => "entry",
        }
    }

    /// Dispatches on an already-consumed type byte and reads the body that
    /// follows it. `is_manifest` forces atlas entries to treat their
    /// trailing texture reference as a bare name rather than an inline
    /// texture record, which is how manifest-sidecar atlases are always
    /// written regardless of what the marker byte says.
    pub fn read_body<R: Read>(
        type_code: u8,
        source: &mut R,
        version: i32,
        is_manifest: bool,
    ) -> Result<Entry> {
        Ok(match type_code {
            TEXTURE_CODE => Entry::Texture(TextureEntry::read_from(source, version)?),
            TEXTURE3D_CODE => Entry::Texture3D(Texture3DEntry::read_from(source, version)?),
            BINK_CODE => Entry::Bink(BinkEntry::read_from(source, version)?),
            ATLAS_CODE => Entry::Atlas(AtlasEntry::read_from(source, version, is_manifest)?),
            BINK_ATLAS_CODE => Entry::BinkAtlas(BinkAtlasEntry::read_from(source, version)?),
            INCLUDE_CODE => Entry::Include(IncludeEntry::read_from(source, version)?),
            SPINE_CODE => Entry::Spine(SpineEntry::read_from(source, version)?),
            other => {
                return Err(PackageError::MalformedInput(format!(
                    "unknown entry type code: 0x{:02X}",
                    other
                )))
            }
        })
    }

    /// Writes the type byte followed by the entry's body.
    pub fn write_body<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_u8_val(self.type_code())?;
        match self {
            Entry::Texture(e) => e.write_to(sink),
            Entry::Texture3D(e) => e.write_to(sink),
            Entry::Bink(e) => e.write_to(sink),
            Entry::Atlas(e) => e.write_to(sink),
            Entry::BinkAtlas(e) => e.write_to(sink),
            Entry::Include(e) => e.write_to(sink),
            Entry::Spine(e) => e.write_to(sink),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn unknown_type_code_is_malformed() {
        let mut src = Cursor::new(Vec::<u8>::new());
        assert!(matches!(
            Entry::read_body(0x01, &mut src, 7, false),
            Err(PackageError::MalformedInput(_))
        ));
    }

    #[test]
    fn include_entry_round_trips_through_dispatch() {
        let entry = Entry::Include(IncludeEntry {
            name: "Packages\\Menus".to_string(),
        });
        let mut buf = Vec::new();
        entry.write_body(&mut buf).unwrap();

        assert_eq!(buf[0], INCLUDE_CODE);
        let mut cursor = Cursor::new(&buf[1..]);
        let read_back = Entry::read_body(INCLUDE_CODE, &mut cursor, 7, false).unwrap();
        assert_eq!(read_back.name(), "Packages\\Menus");
    }
}
