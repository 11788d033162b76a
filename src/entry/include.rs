use std::io::{Read, Write};

use crate::bytes::{ReadExt, WriteExt};
use crate::errors::Result;

/// A reference to an external file, stored by name only. `Package::extract`
/// has no bytes to write for these beyond the name itself; `Package::import`
/// refuses to rebuild one from a loose file (there's no encoding to invert).
#[derive(Debug, Clone)]
pub struct IncludeEntry {
    pub name: String,
}

impl IncludeEntry {
    pub(super) fn read_from<R: Read>(source: &mut R, _version: i32) -> Result<Self> {
        let name = source.read_string()?;
        Ok(Self { name })
    }

    pub(super) fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_string(&self.name)
    }
}
