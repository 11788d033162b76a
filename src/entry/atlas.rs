use std::io::{Read, Write};

use super::texture::TextureEntry;
use crate::bytes::{ReadExt, WriteExt};
use crate::errors::Result;

/// Marks that a versioned `(version, count)` pair follows rather than the
/// sub-atlas count standing in alone (with version implied to be 0).
pub const ATLAS_SENTINEL: i32 = 2_142_336_875;

/// Trailing byte meaning the atlas's texture is stored by reference, by
/// name, rather than inline.
const REFERENCE_MARKER: u8 = 221;

/// A rectangle, used for both a sub-atlas's packed position and its
/// original, unpacked size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A 2D integer point, used for offsets and hull vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One named sub-rectangle within an atlas's packed sheet. Most fields
/// beyond `rect` are gated on the atlas's format version: `top_left` and
/// friends are always present once a version is recorded at all, the flag
/// bits require version > 1 (> 3 for `is_alpha8`), and the hull requires
/// version > 2.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAtlas {
    pub name: String,
    pub rect: Rect,
    pub top_left: Point,
    pub original_size: Point,
    pub scale_ratio: (f32, f32),
    pub is_multi: bool,
    pub is_mip: bool,
    pub is_alpha8: bool,
    pub hull: Vec<Point>,
}

/// The texture a sub-atlas set maps onto: either a bare name (the usual
/// case in a manifest) or an inline [`TextureEntry`] body with no type byte
/// of its own.
#[derive(Debug, Clone)]
pub enum AtlasTexture {
    Reference(String),
    Inline(Box<TextureEntry>),
}

/// A texture atlas: a packed image plus the named sub-rectangles within it.
/// Found in manifests, paired by name with the 2D texture it describes.
#[derive(Debug, Clone)]
pub struct AtlasEntry {
    pub name: String,
    pub version: i32,
    pub sub_atlases: Vec<SubAtlas>,
    pub texture: AtlasTexture,
}

impl AtlasEntry {
    pub(super) fn read_from<R: Read>(source: &mut R, version: i32, is_manifest: bool) -> Result<Self> {
        source.read_i32_be()?; // size, ignored on read

        let mut atlas_version = 0;
        let mut count = source.read_i32_be()?;
        if count == ATLAS_SENTINEL {
            atlas_version = source.read_i32_be()?;
            count = source.read_i32_be()?;
        }
        let count = count.max(0);

        let mut sub_atlases = Vec::with_capacity(count as usize);
        for _ in 0..count {
            sub_atlases.push(read_sub_atlas(source, atlas_version)?);
        }

        let is_reference = source.read_u8_val()? == REFERENCE_MARKER || is_manifest;
        let texture = if is_reference {
            AtlasTexture::Reference(source.read_string()?)
        } else {
            AtlasTexture::Inline(Box::new(TextureEntry::read_from(source, version)?))
        };
        let name = match &texture {
            AtlasTexture::Reference(n) => n.clone(),
            AtlasTexture::Inline(t) => t.name.clone(),
        };

        Ok(Self {
            name,
            version: atlas_version,
            sub_atlases,
            texture,
        })
    }

    pub(super) fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        let mut body = Vec::new();
        body.write_i32_be(ATLAS_SENTINEL)?;
        body.write_i32_be(self.version)?;
        body.write_i32_be(self.sub_atlases.len() as i32)?;
        for sub_atlas in &self.sub_atlases {
            write_sub_atlas(&mut body, sub_atlas, self.version)?;
        }

        match &self.texture {
            AtlasTexture::Reference(name) => {
                body.write_u8_val(REFERENCE_MARKER)?;
                body.write_string(name)?;
            }
            AtlasTexture::Inline(texture) => {
                body.write_u8_val(0)?;
                texture.write_to(&mut body)?;
            }
        }

        // The size field here is off by a fixed amount in the original
        // tooling too, and nothing downstream reads it back.
        sink.write_i32_be(body.len() as i32 - 35)?;
        sink.write_all(&body)?;
        Ok(())
    }
}

fn read_sub_atlas<R: Read>(source: &mut R, version: i32) -> Result<SubAtlas> {
    let name = source.read_string()?;
    let rect = Rect {
        x: source.read_i32_be()?,
        y: source.read_i32_be()?,
        width: source.read_i32_be()?,
        height: source.read_i32_be()?,
    };
    let top_left = Point {
        x: source.read_i32_be()?,
        y: source.read_i32_be()?,
    };
    let original_size = Point {
        x: source.read_i32_be()?,
        y: source.read_i32_be()?,
    };
    let scale_ratio = (source.read_f32_be()?, source.read_f32_be()?);

    let mut is_multi = false;
    let mut is_mip = false;
    let mut is_alpha8 = false;
    if version > 0 {
        let flags = source.read_u8_val()?;
        if version > 1 {
            is_multi = flags & 1 != 0;
            is_mip = flags & 2 != 0;
            if version > 3 {
                is_alpha8 = flags & 4 != 0;
            }
        }
    }

    let mut hull = Vec::new();
    if version > 2 {
        let hull_count = source.read_i32_be()?.max(0);
        for _ in 0..hull_count {
            hull.push(Point {
                x: source.read_i32_be()?,
                y: source.read_i32_be()?,
            });
        }
    }

    Ok(SubAtlas {
        name,
        rect,
        top_left,
        original_size,
        scale_ratio,
        is_multi,
        is_mip,
        is_alpha8,
        hull,
    })
}

fn write_sub_atlas<W: Write>(sink: &mut W, sub_atlas: &SubAtlas, version: i32) -> Result<()> {
    sink.write_string(&sub_atlas.name)?;
    sink.write_i32_be(sub_atlas.rect.x)?;
    sink.write_i32_be(sub_atlas.rect.y)?;
    sink.write_i32_be(sub_atlas.rect.width)?;
    sink.write_i32_be(sub_atlas.rect.height)?;
    sink.write_i32_be(sub_atlas.top_left.x)?;
    sink.write_i32_be(sub_atlas.top_left.y)?;
    sink.write_i32_be(sub_atlas.original_size.x)?;
    sink.write_i32_be(sub_atlas.original_size.y)?;
    sink.write_f32_be(sub_atlas.scale_ratio.0)?;
    sink.write_f32_be(sub_atlas.scale_ratio.1)?;

    if version > 0 {
        let mut flags = 0u8;
        if sub_atlas.is_multi {
            flags |= 1;
        }
        if sub_atlas.is_mip {
            flags |= 2;
        }
        if sub_atlas.is_alpha8 {
            flags |= 4;
        }
        sink.write_u8_val(flags)?;
    }

    if version > 2 {
        sink.write_i32_be(sub_atlas.hull.len() as i32)?;
        for point in &sub_atlas.hull {
            sink.write_i32_be(point.x)?;
            sink.write_i32_be(point.y)?;
        }
    }
    Ok(())
}
