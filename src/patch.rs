//! The patch engine: replaces and appends entries in a package from one or
//! more patch packages, in place.
//!
//! The base package is renamed aside, entries from the patch packages are
//! collected into an overlay keyed by name, and the base package's entries
//! are streamed back out — substituting the overlay's version of any entry
//! it names, and appending whatever the overlay didn't match at the end.
//! The renamed-aside original is deleted once the new file is complete.
//!
//! A patch package with no manifest sidecar of its own doesn't block
//! patching — its entries are applied using only the primary package.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::package::{manifest_path, ManifestedEntry, PackageWithManifestReader, PackageWithManifestWriter};
use crate::errors::Result;

fn aside_path(base: &Path) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(".old");
    PathBuf::from(name)
}

/// Applies `patches`, in order, to the package at `base_path`.
///
/// Later patches win over earlier ones when they name the same entry; both
/// win over entries already present in the base package.
pub fn patch(base_path: &Path, patches: &[PathBuf], log: &dyn Fn(&str)) -> Result<()> {
    let mut overlay: HashMap<String, ManifestedEntry> = HashMap::new();
    for patch_path in patches {
        log(&format!("reading patch package {}", patch_path.display()));
        let mut reader = PackageWithManifestReader::open(patch_path)?;
        for item in reader.read_all()? {
            overlay.insert(item.entry.name().to_string(), item);
        }
    }

    let old_base = aside_path(base_path);
    std::fs::rename(base_path, &old_base)?;
    let old_manifest_src = manifest_path(base_path);
    let old_manifest_dst = manifest_path(&old_base);
    let had_old_manifest = old_manifest_src.exists();
    if had_old_manifest {
        std::fs::rename(&old_manifest_src, &old_manifest_dst)?;
    }

    let result = apply(base_path, &old_base, overlay, log);

    std::fs::remove_file(&old_base)?;
    if had_old_manifest {
        std::fs::remove_file(&old_manifest_dst)?;
    }

    result
}

fn apply(
    base_path: &Path,
    old_base: &Path,
    mut overlay: HashMap<String, ManifestedEntry>,
    log: &dyn Fn(&str),
) -> Result<()> {
    let mut old_reader = PackageWithManifestReader::open(old_base)?;
    let compression = old_reader.compression();
    let version = old_reader.version();

    let mut out_entries = Vec::new();
    for item in old_reader.read_all()? {
        let name = item.entry.name().to_string();
        match overlay.remove(&name) {
            Some(replacement) => {
                log(&format!("replacing entry {}", name));
                out_entries.push(replacement);
            }
            None => out_entries.push(item),
        }
    }
    for (name, item) in overlay {
        log(&format!("appending new entry {}", name));
        out_entries.push(item);
    }

    let writer = PackageWithManifestWriter::create(base_path, compression, version)?;
    writer.write_all(&out_entries)
}
