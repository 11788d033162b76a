//! Manifest-coupled package reading and writing.
//!
//! Alongside a primary package file `Foo.pkg`, the game sometimes ships a
//! sidecar `Foo.pkg_manifest` holding supplementary per-entry metadata. This
//! module pairs the two by entry name, with later manifest entries of the
//! same name overriding earlier ones — last-occurrence-wins, like a map
//! built by repeated insertion.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use crate::chunk::CompressionType;
use crate::container::{PackageReader, PackageWriter};
use crate::entry::Entry;
use crate::errors::Result;

/// An entry paired with its manifest-sidecar counterpart, if any.
#[derive(Debug, Clone)]
pub struct ManifestedEntry {
    pub entry: Entry,
    pub manifest: Option<Entry>,
}

/// Derives the conventional sidecar path `<path>_manifest` for a primary
/// package path.
pub fn manifest_path(primary: &Path) -> PathBuf {
    let mut name = primary.as_os_str().to_owned();
    name.push("_manifest");
    PathBuf::from(name)
}

/// Reads a primary package together with its optional manifest sidecar.
pub struct PackageWithManifestReader<R, M = R> {
    primary: PackageReader<R>,
    manifest: Option<PackageReader<M>>,
}

impl PackageWithManifestReader<File, File> {
    /// Opens `path` for reading, along with `<path>_manifest` if it exists.
    pub fn open(path: &Path) -> Result<Self> {
        let primary = PackageReader::new(File::open(path)?, false)?;
        let manifest = match File::open(manifest_path(path)) {
            Ok(f) => Some(PackageReader::new(f, true)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self { primary, manifest })
    }
}

impl<R: Read + Write + Seek, M: Read + Write + Seek> PackageWithManifestReader<R, M> {
    pub fn new(primary: PackageReader<R>, manifest: Option<PackageReader<M>>) -> Self {
        Self { primary, manifest }
    }

    pub fn compression(&self) -> CompressionType {
        self.primary.compression()
    }

    pub fn version(&self) -> i32 {
        self.primary.version()
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest.is_some()
    }

    /// Reads every entry from the primary package, paired with a manifest
    /// entry of the same name when one is present.
    pub fn read_all(&mut self) -> Result<Vec<ManifestedEntry>> {
        let manifest_map = self.read_manifest_map()?;
        let version = self.primary.version();

        let is_manifest = self.primary.is_manifest();
        let mut out = Vec::new();
        while let Some(code) = self.primary.next_entry_code()? {
            let entry = Entry::read_body(code, &mut self.primary, version, is_manifest)?;
            let manifest = manifest_map.get(entry.name()).cloned();
            out.push(ManifestedEntry { entry, manifest });
        }
        Ok(out)
    }

    fn read_manifest_map(&mut self) -> Result<HashMap<String, Entry>> {
        let mut map = HashMap::new();
        if let Some(manifest) = &mut self.manifest {
            let version = manifest.version();
            let is_manifest = manifest.is_manifest();
            while let Some(code) = manifest.next_entry_code()? {
                let entry = Entry::read_body(code, manifest, version, is_manifest)?;
                map.insert(entry.name().to_string(), entry);
            }
        }
        Ok(map)
    }
}

/// Writes a primary package together with an optional manifest sidecar.
pub struct PackageWithManifestWriter<W, M = W> {
    primary: PackageWriter<W>,
    manifest: Option<PackageWriter<M>>,
}

impl PackageWithManifestWriter<File, File> {
    /// Creates `path` exclusively, along with `<path>_manifest` if any
    /// written entry carries manifest data.
    pub fn create(
        path: &Path,
        compression: CompressionType,
        version: i32,
    ) -> Result<PendingManifestWriter> {
        let primary = PackageWriter::new(
            OpenOptions::new().write(true).create_new(true).open(path)?,
            compression,
            version,
        )?;
        Ok(PendingManifestWriter {
            primary,
            manifest_path: manifest_path(path),
            compression,
            version,
        })
    }
}

/// A primary writer opened but not yet paired with a manifest writer — the
/// manifest sidecar is only created lazily, the first time an entry with
/// manifest data is written, so that packages with no manifest entries
/// don't leave behind an empty sidecar file.
pub struct PendingManifestWriter {
    primary: PackageWriter<File>,
    manifest_path: PathBuf,
    compression: CompressionType,
    version: i32,
}

impl PendingManifestWriter {
    pub fn write_all(mut self, entries: &[ManifestedEntry]) -> Result<()> {
        let mut manifest: Option<PackageWriter<File>> = None;
        for item in entries {
            item.entry.write_body(&mut self.primary)?;
            if let Some(manifest_entry) = &item.manifest {
                if manifest.is_none() {
                    manifest = Some(PackageWriter::new(
                        OpenOptions::new()
                            .write(true)
                            .create_new(true)
                            .open(&self.manifest_path)?,
                        self.compression,
                        self.version,
                    )?);
                }
                manifest_entry.write_body(manifest.as_mut().unwrap())?;
            }
        }
        self.primary.close()?;
        if let Some(mut m) = manifest {
            m.close()?;
        }
        Ok(())
    }
}
